//! Variable value collection for the merged workspace.
//!
//! Values are gathered from the repo globals file, the environment file,
//! then every stack-local file in topological order. A redefinition is
//! overridden by the later source with a warning; expression tokens are
//! carried verbatim so non-literal values survive.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use hcl_edit::structure::Body;

use crate::paths;
use crate::ui;

use super::providers::expr_text;

/// A collected variable value and the source file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableValue {
    pub expr: String,
    pub source: String,
}

/// Collect variable values from every tfvars source in precedence order.
/// Returns the merged values and the number of non-empty sources used.
pub fn collect_variable_values(
    root: &Path,
    environment: &str,
    stacks: &[PathBuf],
) -> Result<(BTreeMap<String, VariableValue>, usize)> {
    let mut sources: Vec<(PathBuf, String)> = vec![
        (root.join("globals.tfvars"), "globals.tfvars".to_string()),
        (
            root.join("environment").join(format!("{environment}.tfvars")),
            format!("environment/{environment}.tfvars"),
        ),
    ];

    for stack_dir in stacks {
        let rel = paths::rel_slash(root, stack_dir);
        sources.push((
            stack_dir.join("tfvars").join(format!("{environment}.tfvars")),
            format!("{rel}/tfvars/{environment}.tfvars"),
        ));
    }

    let mut result = BTreeMap::new();
    let mut sources_used = 0;
    for (path, description) in sources {
        let values = load_tfvars_file(&path)
            .with_context(|| format!("read tfvars {}", path.display()))?;
        if values.is_empty() {
            continue;
        }
        sources_used += 1;
        merge_variable_values(&mut result, values, &description);
    }

    Ok((result, sources_used))
}

/// Parse a tfvars file into name → verbatim expression text. Missing files
/// yield an empty map.
pub fn load_tfvars_file(path: &Path) -> Result<BTreeMap<String, String>> {
    if !paths::file_exists(path) {
        return Ok(BTreeMap::new());
    }

    let src = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let body: Body = src
        .parse()
        .map_err(|err| anyhow!("parse {}: {err}", path.display()))?;

    let mut values = BTreeMap::new();
    for attr in body.iter().filter_map(|s| s.as_attribute()) {
        values.insert(attr.key.as_str().to_string(), expr_text(&attr.value));
    }
    Ok(values)
}

fn merge_variable_values(
    dest: &mut BTreeMap<String, VariableValue>,
    incoming: BTreeMap<String, String>,
    source: &str,
) {
    for (name, expr) in incoming {
        if let Some(current) = dest.get(&name) {
            if current.expr == expr {
                continue;
            }
            ui::warn(&format!(
                "variable {name:?} from {source} overrides value from {}",
                current.source
            ));
        }
        dest.insert(
            name,
            VariableValue {
                expr,
                source: source.to_string(),
            },
        );
    }
}

/// Write merged values as `variables.auto.tfvars` content, sorted by name,
/// validating the result parses before it lands on disk.
pub fn write_tfvars_file(path: &Path, values: &BTreeMap<String, VariableValue>) -> Result<()> {
    let mut out = String::new();
    for (name, value) in values {
        out.push_str(&format!("{name} = {}\n", value.expr));
    }

    out.parse::<Body>()
        .map_err(|err| anyhow!("generated tfvars failed to parse: {err}"))?;
    fs::write(path, out).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_later_sources_override() {
        let root = TempDir::new().unwrap();
        let stack = root.path().join("app");
        fs::create_dir_all(stack.join("tfvars")).unwrap();
        fs::create_dir_all(root.path().join("environment")).unwrap();

        fs::write(
            root.path().join("globals.tfvars"),
            "region = \"eu-west-2\"\nowner = \"platform\"\n",
        )
        .unwrap();
        fs::write(
            root.path().join("environment/dev.tfvars"),
            "owner = \"dev-team\"\n",
        )
        .unwrap();
        fs::write(
            stack.join("tfvars/dev.tfvars"),
            "instances = var.base_count + 1\n",
        )
        .unwrap();

        let (values, sources) =
            collect_variable_values(root.path(), "dev", &[stack]).unwrap();
        assert_eq!(sources, 3);
        assert_eq!(values["region"].expr, "\"eu-west-2\"");
        assert_eq!(values["owner"].expr, "\"dev-team\"");
        assert_eq!(values["owner"].source, "environment/dev.tfvars");
        // Expressions survive verbatim.
        assert_eq!(values["instances"].expr, "var.base_count + 1");
    }

    #[test]
    fn test_missing_sources_are_skipped() {
        let root = TempDir::new().unwrap();
        let (values, sources) =
            collect_variable_values(root.path(), "dev", &[root.path().join("x")]).unwrap();
        assert!(values.is_empty());
        assert_eq!(sources, 0);
    }

    #[test]
    fn test_identical_redefinition_keeps_first_source() {
        let mut dest = BTreeMap::new();
        let mut first = BTreeMap::new();
        first.insert("region".to_string(), "\"eu-west-2\"".to_string());
        merge_variable_values(&mut dest, first, "globals.tfvars");

        let mut second = BTreeMap::new();
        second.insert("region".to_string(), "\"eu-west-2\"".to_string());
        merge_variable_values(&mut dest, second, "environment/dev.tfvars");

        assert_eq!(dest["region"].source, "globals.tfvars");
    }

    #[test]
    fn test_write_tfvars_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("variables.auto.tfvars");

        let mut values = BTreeMap::new();
        values.insert(
            "region".to_string(),
            VariableValue {
                expr: "\"eu-west-2\"".to_string(),
                source: "globals.tfvars".to_string(),
            },
        );
        values.insert(
            "count".to_string(),
            VariableValue {
                expr: "var.base + 1".to_string(),
                source: "x".to_string(),
            },
        );

        write_tfvars_file(&path, &values).unwrap();
        let reread = load_tfvars_file(&path).unwrap();
        assert_eq!(reread["region"], "\"eu-west-2\"");
        assert_eq!(reread["count"], "var.base + 1");
    }

    #[test]
    fn test_load_rejects_unparseable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.tfvars");
        fs::write(&path, "this is {{ not hcl").unwrap();
        assert!(load_tfvars_file(&path).is_err());
    }
}
