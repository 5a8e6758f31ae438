//! Merged `required_providers` requirements.
//!
//! Every stack's `required_providers` entries are harvested into one table
//! before the synthetic `terraform {}` block is emitted. Sources prefer the
//! canonical hashicorp namespace on conflict; constraints and configuration
//! aliases union; unrecognized attributes keep the first value seen.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use hcl_edit::expr::{Expression, ObjectKey};
use hcl_edit::structure::Body;

use crate::ui;

/// One provider's merged requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRequirement {
    pub source: Option<String>,
    pub constraints: BTreeSet<String>,
    pub aliases: BTreeSet<String>,
    pub other_attrs: BTreeMap<String, String>,
}

/// Requirements keyed by provider local name.
pub type ProviderRequirements = BTreeMap<String, ProviderRequirement>;

impl ProviderRequirement {
    pub fn merge(&mut self, name: &str, incoming: &ProviderRequirement) {
        if let Some(source) = &incoming.source {
            self.merge_source(name, source);
        }
        self.constraints.extend(incoming.constraints.iter().cloned());
        self.aliases.extend(incoming.aliases.iter().cloned());

        for (key, expr) in &incoming.other_attrs {
            match self.other_attrs.get(key) {
                Some(existing) if existing != expr.trim() => {
                    ui::warn(&format!(
                        "conflicting {key} for provider {name:?}; keeping first definition"
                    ));
                }
                Some(_) => {}
                None => {
                    self.other_attrs.insert(key.clone(), expr.trim().to_string());
                }
            }
        }
    }

    fn merge_source(&mut self, name: &str, incoming: &str) {
        let Some(existing) = self.source.clone().filter(|s| !s.is_empty()) else {
            if !incoming.is_empty() {
                self.source = Some(incoming.to_string());
            }
            return;
        };
        if incoming.is_empty() || incoming == existing {
            return;
        }

        if is_hashicorp_source(incoming) && !is_hashicorp_source(&existing) {
            ui::warn(&format!(
                "conflicting source for provider {name:?}; preferring {incoming:?} over {existing:?}"
            ));
            self.source = Some(incoming.to_string());
        } else {
            ui::warn(&format!(
                "conflicting source for provider {name:?} ({existing:?} vs {incoming:?}); keeping {existing:?}"
            ));
        }
    }

    /// Sorted, comma-joined constraint string, empty when unconstrained.
    pub fn version_string(&self) -> String {
        self.constraints.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Render the `{ source = ... }` requirement object as HCL.
    pub fn render(&self) -> String {
        let mut out = String::from("{\n");

        if let Some(source) = self.source.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&format!("      source = \"{source}\"\n"));
        }
        let version = self.version_string();
        if !version.is_empty() {
            out.push_str(&format!("      version = \"{version}\"\n"));
        }
        if !self.aliases.is_empty() {
            let aliases: Vec<&str> = self.aliases.iter().map(String::as_str).collect();
            out.push_str(&format!(
                "      configuration_aliases = [{}]\n",
                aliases.join(", ")
            ));
        }
        for (name, expr) in &self.other_attrs {
            if !expr.is_empty() {
                out.push_str(&format!("      {name} = {expr}\n"));
            }
        }

        out.push_str("    }");
        out
    }
}

fn is_hashicorp_source(source: &str) -> bool {
    source.contains("hashicorp/")
}

/// Parse one `required_providers` entry expression and merge it into the
/// table under `name`.
pub fn merge_entry(
    requirements: &mut ProviderRequirements,
    name: &str,
    expr: &Expression,
) -> Result<()> {
    let parsed = parse_requirement(expr)?;
    match requirements.get_mut(name) {
        Some(existing) => existing.merge(name, &parsed),
        None => {
            requirements.insert(name.to_string(), parsed);
        }
    }
    Ok(())
}

/// Merge a whole per-stack table into the global one.
pub fn merge_tables(global: &mut ProviderRequirements, stack: ProviderRequirements) {
    for (name, requirement) in stack {
        match global.get_mut(&name) {
            Some(existing) => existing.merge(&name, &requirement),
            None => {
                global.insert(name, requirement);
            }
        }
    }
}

fn parse_requirement(expr: &Expression) -> Result<ProviderRequirement> {
    let Expression::Object(object) = expr else {
        bail!("expected object expression for provider requirement");
    };

    let mut requirement = ProviderRequirement::default();
    for (key, value) in object.iter() {
        let key = object_key_string(key);
        let value = value.expr();

        match key.as_str() {
            "source" => {
                let source = string_literal(value)
                    .ok_or_else(|| anyhow::anyhow!("provider source must be a string literal"))?;
                if !source.is_empty() {
                    requirement.source = Some(source);
                }
            }
            "version" => {
                let version = string_literal(value)
                    .ok_or_else(|| anyhow::anyhow!("provider version must be a string literal"))?;
                for constraint in split_constraints(&version) {
                    requirement.constraints.insert(constraint);
                }
            }
            "configuration_aliases" => {
                let Expression::Array(aliases) = value else {
                    bail!("expected list expression for configuration_aliases");
                };
                for alias in aliases.iter() {
                    let rendered = expr_text(alias);
                    if !rendered.is_empty() {
                        requirement.aliases.insert(rendered);
                    }
                }
            }
            other => {
                requirement
                    .other_attrs
                    .insert(other.to_string(), expr_text(value));
            }
        }
    }

    Ok(requirement)
}

fn object_key_string(key: &ObjectKey) -> String {
    match key {
        ObjectKey::Ident(ident) => ident.as_str().to_string(),
        ObjectKey::Expression(Expression::String(value)) => value.as_str().to_string(),
        ObjectKey::Expression(expr) => expr_text(expr),
    }
}

fn string_literal(expr: &Expression) -> Option<String> {
    match expr {
        Expression::String(value) => Some(value.as_str().to_string()),
        _ => None,
    }
}

/// Render an expression as trimmed source text.
pub fn expr_text(expr: &Expression) -> String {
    expr.to_string().trim().to_string()
}

/// Split a `version = "..."` constraint string on commas.
pub fn split_constraints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse helper used by tests and callers holding raw HCL text.
pub fn requirement_from_hcl(entry: &str) -> Result<ProviderRequirement> {
    let body: Body = format!("value = {entry}")
        .parse()
        .map_err(|err| anyhow::anyhow!("parse required_providers entry: {err}"))?;
    let attr = body
        .iter()
        .filter_map(|s| s.as_attribute())
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing value attribute"))?;
    parse_requirement(&attr.value)
}
