//! Terraform-style version constraints.
//!
//! Terraform's constraint grammar (`=`, `!=`, `>`, `>=`, `<`, `<=`, `~>`,
//! partial versions like `1.2`) is not semver's, so the operators are
//! implemented here on top of `semver::Version` values.

use std::fmt;

use anyhow::{bail, Context, Result};
use semver::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Pessimistic,
}

impl Op {
    fn parse(raw: &str) -> Option<(Op, &str)> {
        for (token, op) in [
            ("~>", Op::Pessimistic),
            (">=", Op::Ge),
            ("<=", Op::Le),
            ("!=", Op::Ne),
            (">", Op::Gt),
            ("<", Op::Lt),
            ("=", Op::Eq),
        ] {
            if let Some(rest) = raw.strip_prefix(token) {
                return Some((op, rest));
            }
        }
        None
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Pessimistic => "~>",
        };
        f.write_str(token)
    }
}

/// One parsed constraint, e.g. `>= 1.6.0` or `~> 5.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    op: Op,
    version: Version,
    /// Number of version segments the user wrote; `~>` pivots on it.
    segments: usize,
}

impl Constraint {
    pub fn check(&self, candidate: &Version) -> bool {
        match self.op {
            Op::Eq => candidate == &self.version,
            Op::Ne => candidate != &self.version,
            Op::Gt => candidate > &self.version,
            Op::Ge => candidate >= &self.version,
            Op::Lt => candidate < &self.version,
            Op::Le => candidate <= &self.version,
            Op::Pessimistic => {
                if candidate < &self.version {
                    return false;
                }
                candidate < &self.pessimistic_upper_bound()
            }
        }
    }

    fn pessimistic_upper_bound(&self) -> Version {
        // `~> 1.2.3` allows patch movement, `~> 1.2` allows minor movement.
        if self.segments >= 3 {
            Version::new(self.version.major, self.version.minor + 1, 0)
        } else {
            Version::new(self.version.major + 1, 0, 0)
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// Parse a comma-separated constraint string such as `>= 1.6.0, < 1.9.0`.
pub fn parse_constraint_set(raw: &str) -> Result<Vec<Constraint>> {
    let mut constraints = Vec::new();
    for chunk in raw.split(',') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        constraints.push(parse_constraint(chunk)?);
    }
    if constraints.is_empty() {
        bail!("empty version constraint {raw:?}");
    }
    Ok(constraints)
}

fn parse_constraint(raw: &str) -> Result<Constraint> {
    let (op, rest) = Op::parse(raw).unwrap_or((Op::Eq, raw));
    let (version, segments) = parse_partial_version(rest.trim())
        .with_context(|| format!("invalid version constraint {raw:?}"))?;
    Ok(Constraint { op, version, segments })
}

/// Parse a full or partial version (`1`, `1.2`, `1.2.3`, `1.2.3-beta1`),
/// padding missing segments with zeroes.
pub fn parse_lenient_version(raw: &str) -> Result<Version> {
    let (version, _) = parse_partial_version(raw.trim())?;
    Ok(version)
}

fn parse_partial_version(raw: &str) -> Result<(Version, usize)> {
    let raw = raw.trim().trim_start_matches('v');
    if raw.is_empty() {
        bail!("empty version");
    }

    let (core, pre) = match raw.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (raw, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        bail!("malformed version {raw:?}");
    }

    let mut numbers = [0u64; 3];
    for (i, part) in parts.iter().enumerate() {
        numbers[i] = part
            .parse::<u64>()
            .with_context(|| format!("malformed version segment {part:?} in {raw:?}"))?;
    }

    let mut version = Version::new(numbers[0], numbers[1], numbers[2]);
    if let Some(pre) = pre {
        version.pre = semver::Prerelease::new(pre)
            .with_context(|| format!("malformed prerelease {pre:?} in {raw:?}"))?;
    }
    Ok((version, parts.len()))
}

/// Check a version against the union of every supplied constraint string.
/// Duplicate strings are collapsed; an unparseable constraint is an error.
pub fn is_version_compatible(candidate: &Version, constraint_strings: &[String]) -> Result<bool> {
    let mut seen = std::collections::BTreeSet::new();
    for raw in constraint_strings {
        let raw = raw.trim();
        if raw.is_empty() || !seen.insert(raw.to_string()) {
            continue;
        }
        for constraint in parse_constraint_set(raw)? {
            if !constraint.check(candidate) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(raw: &str) -> Version {
        parse_lenient_version(raw).unwrap()
    }

    #[test]
    fn test_parse_constraint_set() {
        let set = parse_constraint_set(">= 1.6.0, < 1.9.0").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].to_string(), ">= 1.6.0");
        assert_eq!(set[1].to_string(), "< 1.9.0");

        assert!(parse_constraint_set("").is_err());
        assert!(parse_constraint_set(">= not.a.version").is_err());
    }

    #[test]
    fn test_range_constraints() {
        let set = parse_constraint_set(">= 1.6.0, < 1.9.0").unwrap();
        let ok = |v: &str| set.iter().all(|c| c.check(&version(v)));

        assert!(ok("1.6.0"));
        assert!(ok("1.7.5"));
        assert!(ok("1.8.9"));
        assert!(!ok("1.5.9"));
        assert!(!ok("1.9.0"));
        assert!(!ok("1.9.1"));
    }

    #[test]
    fn test_pessimistic_two_segments() {
        let set = parse_constraint_set("~> 5.0").unwrap();
        assert!(set[0].check(&version("5.0.0")));
        assert!(set[0].check(&version("5.9.3")));
        assert!(!set[0].check(&version("6.0.0")));
        assert!(!set[0].check(&version("4.9.9")));
    }

    #[test]
    fn test_pessimistic_three_segments() {
        let set = parse_constraint_set("~> 1.2.3").unwrap();
        assert!(set[0].check(&version("1.2.3")));
        assert!(set[0].check(&version("1.2.9")));
        assert!(!set[0].check(&version("1.3.0")));
        assert!(!set[0].check(&version("1.2.2")));
    }

    #[test]
    fn test_exact_and_not_equal() {
        let eq = parse_constraint_set("1.7.5").unwrap();
        assert!(eq[0].check(&version("1.7.5")));
        assert!(!eq[0].check(&version("1.7.6")));

        let ne = parse_constraint_set("!= 1.7.5").unwrap();
        assert!(!ne[0].check(&version("1.7.5")));
        assert!(ne[0].check(&version("1.7.6")));
    }

    #[test]
    fn test_is_version_compatible_unions_constraints() {
        // Stack a pins a range, stack b carries the default.
        let constraints = vec![">= 1.6.0, < 1.9.0".to_string(), ">= 1.0.0".to_string()];

        assert!(is_version_compatible(&version("1.7.5"), &constraints).unwrap());
        assert!(!is_version_compatible(&version("1.9.1"), &constraints).unwrap());
        assert!(!is_version_compatible(&version("0.13.7"), &constraints).unwrap());
    }

    #[test]
    fn test_lenient_version_parsing() {
        assert_eq!(version("1.6"), Version::new(1, 6, 0));
        assert_eq!(version("v1.7.5"), Version::new(1, 7, 5));
        assert!(parse_lenient_version("one.two").is_err());
        assert!(parse_lenient_version("").is_err());

        let pre = version("1.9.0-beta1");
        assert!(pre < Version::new(1, 9, 0));
    }
}
