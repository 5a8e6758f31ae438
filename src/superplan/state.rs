//! Snapshot rewriting for the merged workspace.
//!
//! Snapshots are unknown-shape JSON: rewriting pattern-matches on the
//! documented fields and leaves everything else untouched. Identifier
//! prefixing is idempotent — a segment that already carries the prefix is
//! never prefixed again.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde_json::{Map, Value};

use crate::ui;

/// Sanitize a directory basename into an identifier prefix: every rune
/// outside `[A-Za-z0-9_]` becomes `_`, and a leading digit gets a `_`
/// prepended.
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let mut result: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if result.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        result.insert(0, '_');
    }
    result
}

/// Prefix a single name segment unless it is already prefixed.
pub fn prefix_segment(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        return segment.to_string();
    }
    let with_underscore = format!("{prefix}_");
    if segment.starts_with(&with_underscore) {
        return segment.to_string();
    }
    format!("{with_underscore}{segment}")
}

/// Rewrite a resource address. If the address contains `module.<x>`
/// segments, only the first module name is prefixed; otherwise the leaf
/// resource name is, skipping an initial `data` segment.
pub fn rewrite_address(prefix: &str, address: &str) -> String {
    if prefix.is_empty() || address.is_empty() {
        return address.to_string();
    }

    let mut parts: Vec<String> = address.split('.').map(str::to_string).collect();
    let mut module_prefixed = false;

    let mut i = 0;
    while i < parts.len() {
        if parts[i] == "module" && i + 1 < parts.len() {
            if !module_prefixed {
                parts[i + 1] = prefix_segment(prefix, &parts[i + 1]);
                module_prefixed = true;
            }
            i += 1;
        }
        i += 1;
    }

    if module_prefixed {
        return parts.join(".");
    }

    let mut type_idx = 0;
    if parts.get(type_idx).map(String::as_str) == Some("data") {
        type_idx += 1;
    }
    let name_idx = type_idx + 1;
    if name_idx < parts.len() {
        parts[name_idx] = prefix_segment(prefix, &parts[name_idx]);
    }
    parts.join(".")
}

/// Rewrite a `module` field: prefix the first `module.<x>` name only.
pub fn rewrite_module_address(prefix: &str, address: &str) -> String {
    if prefix.is_empty() || address.is_empty() {
        return address.to_string();
    }

    let mut parts: Vec<String> = address.split('.').map(str::to_string).collect();
    let mut module_prefixed = false;

    let mut i = 0;
    while i < parts.len() {
        if parts[i] == "module" && i + 1 < parts.len() && !module_prefixed {
            parts[i + 1] = prefix_segment(prefix, &parts[i + 1]);
            module_prefixed = true;
            i += 1;
        }
        i += 1;
    }
    parts.join(".")
}

fn rewrite_dependency_list(deps: &mut Vec<Value>, prefix: &str) {
    for dep in deps.iter_mut() {
        if let Value::String(addr) = dep {
            *dep = Value::String(rewrite_address(prefix, addr));
        }
    }
}

/// Prefix resource names, addresses, module paths and dependency lists in
/// a pulled snapshot. Returns the number of resources touched.
pub fn prefix_resources(state: &mut Value, prefix: &str) -> Result<usize> {
    let Some(resources) = state.get_mut("resources") else {
        return Ok(0);
    };
    let Value::Array(resources) = resources else {
        bail!("unexpected resources structure in snapshot");
    };

    for (index, resource) in resources.iter_mut().enumerate() {
        let Value::Object(resource) = resource else {
            bail!("resource {index} has unexpected structure");
        };

        let module_path = resource
            .get("module")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let name = resource.get("name").and_then(Value::as_str).map(str::to_string);
        if let Some(name) = name {
            if module_path.is_empty() {
                resource.insert(
                    "name".to_string(),
                    Value::String(prefix_segment(prefix, &name)),
                );
            }
        }

        let address = resource
            .get("address")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(address) = address {
            resource.insert(
                "address".to_string(),
                Value::String(rewrite_address(prefix, &address)),
            );
        }

        if !module_path.is_empty() {
            resource.insert(
                "module".to_string(),
                Value::String(rewrite_module_address(prefix, &module_path)),
            );
        }

        if let Some(Value::Array(deps)) = resource.get_mut("depends_on") {
            rewrite_dependency_list(deps, prefix);
        }

        if let Some(Value::Array(instances)) = resource.get_mut("instances") {
            for instance in instances.iter_mut() {
                let Value::Object(instance) = instance else {
                    continue;
                };
                if let Some(Value::Array(deps)) = instance.get_mut("dependencies") {
                    rewrite_dependency_list(deps, prefix);
                }
                if let Some(Value::Array(deposed)) = instance.get_mut("deposed") {
                    rewrite_dependency_list(deposed, prefix);
                }
            }
        }
    }

    Ok(resources.len())
}

/// Prefix output keys and rewrite their `depends_on` lists. Returns the
/// number of outputs.
pub fn prefix_outputs(state: &mut Value, prefix: &str) -> usize {
    let Some(Value::Object(outputs)) = state.get_mut("outputs") else {
        return 0;
    };

    let mut renamed = Map::new();
    for (name, mut value) in std::mem::take(outputs) {
        if let Some(Value::Array(deps)) = value.get_mut("depends_on") {
            rewrite_dependency_list(deps, prefix);
        }
        renamed.insert(prefix_segment(prefix, &name), value);
    }
    *outputs = renamed;
    outputs.len()
}

/// Pull provider local names and sources out of the snapshot's resource
/// provider addresses. The first source seen for a name wins; a different
/// source later is a warning.
pub fn collect_providers(state: &Value, providers: &mut BTreeMap<String, String>) {
    let Some(Value::Array(resources)) = state.get("resources") else {
        return;
    };

    for resource in resources {
        let Some(address) = resource.get("provider").and_then(Value::as_str) else {
            continue;
        };
        let Some((name, source)) = parse_provider_address(address) else {
            continue;
        };
        match providers.get(&name) {
            Some(existing) if existing != &source => {
                ui::warn(&format!(
                    "provider name {name:?} seen with multiple sources ({existing} vs {source})"
                ));
            }
            Some(_) => {}
            None => {
                providers.insert(name, source);
            }
        }
    }
}

/// Parse `provider["registry.terraform.io/hashicorp/aws"]` into the local
/// name (`aws`) and the full source string.
pub fn parse_provider_address(address: &str) -> Option<(String, String)> {
    let inner = address
        .strip_prefix("provider[\"")?
        .strip_suffix("\"]")?;

    let source = inner.split("\",\"").next()?;
    if source.is_empty() {
        return None;
    }

    let name = source.rsplit('/').next()?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), source.to_string()))
}

const TAG_KEYS: [&str; 3] = ["tags", "tags_all", "default_tags"];

/// Blank out tag-related state everywhere so provider tag propagation
/// cannot leak into the aggregate diff.
pub fn strip_tag_attributes(state: &mut Value) {
    let Some(Value::Array(resources)) = state.get_mut("resources") else {
        return;
    };
    for resource in resources.iter_mut() {
        if let Value::Object(resource) = resource {
            strip_tags_from_resource(resource);
        }
    }
}

fn strip_tags_from_resource(resource: &mut Map<String, Value>) {
    for key in ["attributes", "values"] {
        if let Some(Value::Object(target)) = resource.get_mut(key) {
            empty_tag_keys(target);
        }
    }

    if let Some(Value::Array(instances)) = resource.get_mut("instances") {
        for instance in instances.iter_mut() {
            if let Value::Object(instance) = instance {
                strip_tags_from_instance(instance);
            }
        }
    }
}

fn strip_tags_from_instance(instance: &mut Map<String, Value>) {
    for key in ["attributes", "values", "before_sensitive", "after_sensitive"] {
        if let Some(Value::Object(target)) = instance.get_mut(key) {
            empty_tag_keys(target);
        }
    }

    // Unknown-value markers are deleted outright, not emptied.
    if let Some(Value::Object(unknown)) = instance.get_mut("after_unknown") {
        for key in TAG_KEYS {
            unknown.remove(key);
        }
    }

    if let Some(Value::Array(deposed)) = instance.get_mut("deposed") {
        for item in deposed.iter_mut() {
            if let Value::Object(nested) = item {
                strip_tags_from_instance(nested);
            }
        }
    }
}

fn empty_tag_keys(target: &mut Map<String, Value>) {
    for key in TAG_KEYS {
        if target.contains_key(key) {
            target.insert(key.to_string(), Value::Object(Map::new()));
        }
    }
}

/// Append resources and union outputs into the merged document. A
/// duplicate output key means the rewrite invariant was violated.
pub fn merge_state(
    resources: Vec<Value>,
    outputs: Map<String, Value>,
    merged_resources: &mut Vec<Value>,
    merged_outputs: &mut Map<String, Value>,
) -> Result<()> {
    merged_resources.extend(resources);

    for (key, value) in outputs {
        if merged_outputs.contains_key(&key) {
            bail!("duplicate output detected: {key}");
        }
        merged_outputs.insert(key, value);
    }
    Ok(())
}

pub fn extract_resources(state: &Value) -> Vec<Value> {
    match state.get("resources") {
        Some(Value::Array(resources)) => resources.clone(),
        _ => Vec::new(),
    }
}

pub fn extract_outputs(state: &Value) -> Map<String, Value> {
    match state.get("outputs") {
        Some(Value::Object(outputs)) => outputs.clone(),
        _ => Map::new(),
    }
}

pub fn extract_int(state: &Value, key: &str) -> i64 {
    state.get(key).and_then(Value::as_i64).unwrap_or(0)
}

pub fn extract_str(state: &Value, key: &str) -> String {
    state
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("network-vpc"), "network_vpc");
        assert_eq!(sanitize_identifier("01-base"), "_01_base");
        assert_eq!(sanitize_identifier("state"), "state");
        assert_eq!(sanitize_identifier(""), "");
    }

    #[test]
    fn test_rewrite_address_plain_resource() {
        assert_eq!(
            rewrite_address("state", "aws_s3_bucket.state"),
            "aws_s3_bucket.state_state"
        );
        assert_eq!(
            rewrite_address("state", "data.aws_caller_identity.current"),
            "data.aws_caller_identity.state_current"
        );
    }

    #[test]
    fn test_rewrite_address_module_prefixes_first_module_only() {
        assert_eq!(
            rewrite_address("state", "module.child.aws_s3_bucket.child"),
            "module.state_child.aws_s3_bucket.child"
        );
        assert_eq!(
            rewrite_address("state", "module.outer.module.inner.aws_s3_bucket.b"),
            "module.state_outer.module.inner.aws_s3_bucket.b"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite_address("state", "aws_s3_bucket.main");
        let twice = rewrite_address("state", &once);
        assert_eq!(once, twice);

        assert_eq!(prefix_segment("state", "state_main"), "state_main");
    }

    #[test]
    fn test_prefix_resources_and_outputs() {
        let mut state = json!({
            "resources": [
                {
                    "mode": "managed",
                    "type": "aws_s3_bucket",
                    "name": "main",
                    "address": "aws_s3_bucket.main",
                    "depends_on": ["aws_kms_key.key"],
                    "instances": [
                        {"dependencies": ["aws_kms_key.key"]}
                    ]
                },
                {
                    "module": "module.child",
                    "type": "aws_s3_bucket",
                    "name": "nested",
                    "address": "module.child.aws_s3_bucket.nested"
                }
            ],
            "outputs": {
                "bucket_arn": {"value": "arn", "depends_on": ["aws_s3_bucket.main"]}
            }
        });

        let count = prefix_resources(&mut state, "state").unwrap();
        assert_eq!(count, 2);

        let resources = state["resources"].as_array().unwrap();
        assert_eq!(resources[0]["name"], "state_main");
        assert_eq!(resources[0]["address"], "aws_s3_bucket.state_main");
        assert_eq!(resources[0]["depends_on"][0], "aws_kms_key.state_key");
        assert_eq!(
            resources[0]["instances"][0]["dependencies"][0],
            "aws_kms_key.state_key"
        );

        // Resources inside modules keep their local name; the module path
        // carries the prefix instead.
        assert_eq!(resources[1]["name"], "nested");
        assert_eq!(resources[1]["module"], "module.state_child");
        assert_eq!(
            resources[1]["address"],
            "module.state_child.aws_s3_bucket.nested"
        );

        let outputs = prefix_outputs(&mut state, "state");
        assert_eq!(outputs, 1);
        let value = &state["outputs"]["state_bucket_arn"];
        assert_eq!(value["depends_on"][0], "aws_s3_bucket.state_main");
    }

    #[test]
    fn test_prefix_resources_rejects_malformed_snapshot() {
        let mut state = json!({"resources": {"not": "a list"}});
        assert!(prefix_resources(&mut state, "p").is_err());

        let mut state = json!({"resources": ["not-an-object"]});
        assert!(prefix_resources(&mut state, "p").is_err());
    }

    #[test]
    fn test_collect_providers() {
        let state = json!({
            "resources": [
                {"provider": "provider[\"registry.terraform.io/hashicorp/aws\"]"},
                {"provider": "provider[\"registry.terraform.io/hashicorp/random\"]"},
                {"provider": "provider[\"registry.terraform.io/hashicorp/aws\"]"},
                {"provider": "not-a-provider"}
            ]
        });

        let mut providers = BTreeMap::new();
        collect_providers(&state, &mut providers);

        assert_eq!(providers.len(), 2);
        assert_eq!(
            providers.get("aws").map(String::as_str),
            Some("registry.terraform.io/hashicorp/aws")
        );
        assert_eq!(
            providers.get("random").map(String::as_str),
            Some("registry.terraform.io/hashicorp/random")
        );
    }

    #[test]
    fn test_strip_tag_attributes() {
        let mut state = json!({
            "resources": [{
                "instances": [{
                    "attributes": {
                        "tags": {"Team": "infra"},
                        "tags_all": {"Team": "infra"},
                        "bucket": "keep-me"
                    },
                    "after_unknown": {"tags_all": true, "arn": true},
                    "before_sensitive": {"tags": {"secret": true}},
                    "deposed": [{
                        "attributes": {"tags": {"Team": "infra"}}
                    }]
                }]
            }]
        });

        strip_tag_attributes(&mut state);

        let instance = &state["resources"][0]["instances"][0];
        assert_eq!(instance["attributes"]["tags"], json!({}));
        assert_eq!(instance["attributes"]["tags_all"], json!({}));
        assert_eq!(instance["attributes"]["bucket"], "keep-me");
        assert!(instance["after_unknown"].get("tags_all").is_none());
        assert_eq!(instance["after_unknown"]["arn"], true);
        assert_eq!(instance["before_sensitive"]["tags"], json!({}));
        assert_eq!(instance["deposed"][0]["attributes"]["tags"], json!({}));
    }

    #[test]
    fn test_merge_state_rejects_duplicate_outputs() {
        let mut resources = Vec::new();
        let mut outputs = Map::new();

        let mut first = Map::new();
        first.insert("state_arn".to_string(), json!({"value": 1}));
        merge_state(vec![json!({"name": "a"})], first, &mut resources, &mut outputs).unwrap();

        let mut second = Map::new();
        second.insert("state_arn".to_string(), json!({"value": 2}));
        let err =
            merge_state(Vec::new(), second, &mut resources, &mut outputs).unwrap_err();
        assert!(err.to_string().contains("duplicate output"));
        assert_eq!(resources.len(), 1);
    }

    #[test]
    fn test_parse_provider_address() {
        assert_eq!(
            parse_provider_address("provider[\"registry.terraform.io/hashicorp/aws\"]"),
            Some((
                "aws".to_string(),
                "registry.terraform.io/hashicorp/aws".to_string()
            ))
        );
        assert_eq!(
            parse_provider_address("provider[\"registry.terraform.io/hashicorp/aws\"].us_east_1"),
            None
        );
        assert_eq!(parse_provider_address("aws_s3_bucket.main"), None);
    }
}
