//! Attribution of the unified plan's changes back to originating stacks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The subset of `terraform show -json` the summary needs.
#[derive(Debug, Default, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub terraform_version: String,
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceChange {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub change: Option<Change>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackChangeSummary {
    pub stack: String,
    pub prefix: String,
    pub has_changes: bool,
    pub adds: usize,
    pub changes: usize,
    pub destroys: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub dependencies: Vec<String>,
    pub dependent_stacks: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTotals {
    pub adds: usize,
    pub changes: usize,
    pub destroys: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuperplanSummary {
    pub generated_at: DateTime<Utc>,
    pub environment: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub account_id: String,
    pub terraform_version: String,
    pub total_stacks: usize,
    pub stacks_with_changes: usize,
    pub resource_totals: ResourceTotals,
    /// Keyed by forward-slash relative stack path.
    pub stacks: BTreeMap<String, StackChangeSummary>,
}

/// Static inputs for summary construction.
pub struct SummaryContext {
    /// rel path → sanitized prefix.
    pub prefixes_by_rel: BTreeMap<String, String>,
    pub dependencies_by_rel: BTreeMap<String, Vec<String>>,
    pub dependents_by_rel: BTreeMap<String, Vec<String>>,
    /// prefix → rel path, for address attribution.
    pub prefix_to_stack: BTreeMap<String, String>,
    pub environment: String,
    pub account_id: String,
    pub terraform_version: String,
    pub generated_at: DateTime<Utc>,
}

pub fn build_summary(plan: &PlanDocument, ctx: &SummaryContext) -> SuperplanSummary {
    let mut stacks: BTreeMap<String, StackChangeSummary> = ctx
        .prefixes_by_rel
        .iter()
        .map(|(rel, prefix)| {
            (
                rel.clone(),
                StackChangeSummary {
                    stack: rel.clone(),
                    prefix: prefix.clone(),
                    dependencies: unique_sorted(
                        ctx.dependencies_by_rel.get(rel).cloned().unwrap_or_default(),
                    ),
                    dependent_stacks: unique_sorted(
                        ctx.dependents_by_rel.get(rel).cloned().unwrap_or_default(),
                    ),
                    ..StackChangeSummary::default()
                },
            )
        })
        .collect();

    let mut totals = ResourceTotals::default();
    for change in &plan.resource_changes {
        let Some(actions) = change.change.as_ref() else {
            continue;
        };
        let Some(rel) = identify_stack_from_address(&change.address, &ctx.prefix_to_stack) else {
            continue;
        };
        let Some(summary) = stacks.get_mut(&rel) else {
            continue;
        };

        for action in &actions.actions {
            match action.as_str() {
                "create" => {
                    summary.adds += 1;
                    totals.adds += 1;
                }
                "update" => {
                    summary.changes += 1;
                    totals.changes += 1;
                }
                "delete" => {
                    summary.destroys += 1;
                    totals.destroys += 1;
                }
                _ => {}
            }
        }
        if summary.adds + summary.changes + summary.destroys > 0 {
            summary.has_changes = true;
            summary.reason = Some("direct".to_string());
        }
    }

    // A quiet stack downstream of a changed dependency is tagged so the
    // operator knows why it might still be affected.
    let changed: Vec<String> = stacks
        .iter()
        .filter(|(_, s)| s.has_changes)
        .map(|(rel, _)| rel.clone())
        .collect();
    for summary in stacks.values_mut() {
        if summary.has_changes {
            continue;
        }
        if summary.dependencies.iter().any(|dep| changed.contains(dep)) {
            summary.reason = Some("dependency".to_string());
        }
    }

    let stacks_with_changes = stacks.values().filter(|s| s.has_changes).count();

    SuperplanSummary {
        generated_at: ctx.generated_at,
        environment: ctx.environment.clone(),
        account_id: ctx.account_id.clone(),
        terraform_version: derive_terraform_version(&ctx.terraform_version, plan),
        total_stacks: stacks.len(),
        stacks_with_changes,
        resource_totals: totals,
        stacks,
    }
}

/// Attribute a resource address to a stack: the first dot-separated token
/// equal to a known prefix, or carrying `<prefix>_`, wins.
pub fn identify_stack_from_address(
    address: &str,
    prefix_to_stack: &BTreeMap<String, String>,
) -> Option<String> {
    if address.is_empty() {
        return None;
    }
    for token in split_address_tokens(address) {
        for (prefix, stack) in prefix_to_stack {
            if token == *prefix || token.starts_with(&format!("{prefix}_")) {
                return Some(stack.clone());
            }
        }
    }
    None
}

/// Address tokens split on `.`, `[`, `]` and quotes, so indexed instances
/// like `aws_s3_bucket.state_main["a"]` tokenize cleanly.
pub fn split_address_tokens(address: &str) -> Vec<String> {
    address
        .split(|c| matches!(c, '.' | '[' | ']' | '"'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn derive_terraform_version(explicit: &str, plan: &PlanDocument) -> String {
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    if !plan.terraform_version.is_empty() {
        return plan.terraform_version.clone();
    }
    "unknown".to_string()
}

fn unique_sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items.dedup();
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SummaryContext {
        let mut prefixes_by_rel = BTreeMap::new();
        prefixes_by_rel.insert("state".to_string(), "state".to_string());
        prefixes_by_rel.insert("network/vpc".to_string(), "vpc".to_string());
        prefixes_by_rel.insert("app".to_string(), "app".to_string());

        let mut prefix_to_stack = BTreeMap::new();
        prefix_to_stack.insert("state".to_string(), "state".to_string());
        prefix_to_stack.insert("vpc".to_string(), "network/vpc".to_string());
        prefix_to_stack.insert("app".to_string(), "app".to_string());

        let mut dependencies_by_rel = BTreeMap::new();
        dependencies_by_rel.insert("app".to_string(), vec!["network/vpc".to_string()]);
        let mut dependents_by_rel = BTreeMap::new();
        dependents_by_rel.insert("network/vpc".to_string(), vec!["app".to_string()]);

        SummaryContext {
            prefixes_by_rel,
            dependencies_by_rel,
            dependents_by_rel,
            prefix_to_stack,
            environment: "dev".to_string(),
            account_id: "123456789012".to_string(),
            terraform_version: "1.7.5".to_string(),
            generated_at: Utc::now(),
        }
    }

    fn change(address: &str, actions: &[&str]) -> ResourceChange {
        ResourceChange {
            address: address.to_string(),
            change: Some(Change {
                actions: actions.iter().map(|a| a.to_string()).collect(),
            }),
        }
    }

    #[test]
    fn test_build_summary_attributes_changes() {
        let plan = PlanDocument {
            terraform_version: "1.7.5".to_string(),
            resource_changes: vec![
                change("aws_vpc.vpc_main", &["create"]),
                change("aws_subnet.vpc_private", &["update"]),
                change("module.state_backend.aws_s3_bucket.b", &["delete"]),
                change("aws_thing.unattributed", &["create"]),
                change("aws_instance.app_web", &["no-op"]),
            ],
        };

        let summary = build_summary(&plan, &context());

        assert_eq!(summary.total_stacks, 3);
        assert_eq!(summary.stacks_with_changes, 2);
        assert_eq!(summary.resource_totals.adds, 1);
        assert_eq!(summary.resource_totals.changes, 1);
        assert_eq!(summary.resource_totals.destroys, 1);

        let vpc = &summary.stacks["network/vpc"];
        assert!(vpc.has_changes);
        assert_eq!(vpc.adds, 1);
        assert_eq!(vpc.changes, 1);
        assert_eq!(vpc.reason.as_deref(), Some("direct"));

        let state = &summary.stacks["state"];
        assert_eq!(state.destroys, 1);

        // app saw only a no-op, but depends on the changed vpc stack.
        let app = &summary.stacks["app"];
        assert!(!app.has_changes);
        assert_eq!(app.reason.as_deref(), Some("dependency"));
        assert_eq!(app.dependencies, vec!["network/vpc".to_string()]);
    }

    #[test]
    fn test_attributed_prefix_matches_address_token() {
        let ctx = context();
        let plan = PlanDocument {
            terraform_version: String::new(),
            resource_changes: vec![
                change("aws_vpc.vpc_main", &["create"]),
                change("module.app_backend.aws_s3_bucket.b", &["update"]),
            ],
        };
        let summary = build_summary(&plan, &ctx);

        for change in &plan.resource_changes {
            let Some(stack) = identify_stack_from_address(&change.address, &ctx.prefix_to_stack)
            else {
                continue;
            };
            let prefix = &summary.stacks[&stack].prefix;
            let tokens = split_address_tokens(&change.address);
            assert!(
                tokens
                    .iter()
                    .any(|t| t == prefix || t.starts_with(&format!("{prefix}_"))),
                "prefix {prefix} not present in {tokens:?}"
            );
        }
    }

    #[test]
    fn test_identify_stack_handles_indexed_addresses() {
        let ctx = context();
        assert_eq!(
            identify_stack_from_address("aws_s3_bucket.state_main[\"a\"]", &ctx.prefix_to_stack),
            Some("state".to_string())
        );
        assert_eq!(
            identify_stack_from_address("aws_thing.unknown", &ctx.prefix_to_stack),
            None
        );
        assert_eq!(identify_stack_from_address("", &ctx.prefix_to_stack), None);
    }

    #[test]
    fn test_derive_terraform_version_fallbacks() {
        let plan = PlanDocument {
            terraform_version: "1.8.0".to_string(),
            resource_changes: Vec::new(),
        };
        assert_eq!(derive_terraform_version("1.7.5", &plan), "1.7.5");
        assert_eq!(derive_terraform_version("", &plan), "1.8.0");
        assert_eq!(
            derive_terraform_version("", &PlanDocument::default()),
            "unknown"
        );
    }

    #[test]
    fn test_summary_serializes_with_stable_keys() {
        let summary = build_summary(&PlanDocument::default(), &context());
        let json = serde_json::to_string_pretty(&summary).unwrap();
        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"network/vpc\""));
        assert!(json.contains("\"resource_totals\""));
        // Quiet stacks have no reason field at all.
        assert!(!json.contains("\"reason\": null"));
    }
}
