//! Lifecycle surgery: force `ignore_changes = [tags, tags_all]` onto AWS
//! resources so tag propagation cannot show up in the aggregate diff.
//!
//! Types in the tagless deny-list have no tag attributes and must be left
//! alone; adding the lifecycle there would make terraform reject the
//! configuration.

use anyhow::{anyhow, Result};
use hcl_edit::expr::Expression;
use hcl_edit::structure::{Block, Body};

use crate::ui;

use super::providers::expr_text;
use super::tagless;

const IGNORED_ATTRS: [&str; 2] = ["tags", "tags_all"];

/// Ensure a `resource` block carries the tag-ignoring lifecycle. Non-AWS
/// types and deny-listed types are untouched.
pub fn ensure_lifecycle_ignores_tags(block: &mut Block) -> Result<()> {
    if block.ident.as_str() != "resource" {
        return Ok(());
    }
    let Some(resource_type) = block.labels.first().map(|label| label.as_str().to_string()) else {
        return Ok(());
    };
    if !resource_type.starts_with("aws_") || tagless::is_tagless(&resource_type) {
        return Ok(());
    }

    let body = &mut block.body;
    let has_lifecycle = body
        .iter()
        .filter_map(|s| s.as_block())
        .any(|b| b.ident.as_str() == "lifecycle");

    if !has_lifecycle {
        let snippet: Body = "lifecycle {\n    ignore_changes = [tags, tags_all]\n  }\n"
            .parse()
            .map_err(|err| anyhow!("build lifecycle block: {err}"))?;
        for structure in snippet {
            body.push(structure);
        }
        return Ok(());
    }

    for mut structure in body.iter_mut() {
        let Some(lifecycle) = structure.as_block_mut() else {
            continue;
        };
        if lifecycle.ident.as_str() != "lifecycle" {
            continue;
        }
        ensure_ignore_attribute(&mut lifecycle.body)?;
        break;
    }
    Ok(())
}

fn ensure_ignore_attribute(lifecycle_body: &mut Body) -> Result<()> {
    let current = lifecycle_body
        .iter()
        .filter_map(|s| s.as_attribute())
        .find(|attr| attr.key.as_str() == "ignore_changes")
        .map(|attr| expr_text(&attr.value));

    let is_missing = current
        .as_deref()
        .map(|c| c.trim().is_empty())
        .unwrap_or(true);
    if is_missing {
        let snippet: Body = "ignore_changes = [tags, tags_all]\n"
            .parse()
            .map_err(|err| anyhow!("build ignore_changes attribute: {err}"))?;
        for structure in snippet {
            lifecycle_body.push(structure);
        }
        return Ok(());
    }
    let current = current.unwrap_or_default();

    let mut updated = current.clone();
    for attr in IGNORED_ATTRS {
        updated = extend_ignore_changes(&updated, attr);
    }
    if updated == current {
        return Ok(());
    }

    let expr: Expression = match updated.parse() {
        Ok(expr) => expr,
        Err(err) => {
            ui::warn(&format!(
                "failed to parse ignore_changes expression, overriding: {err}"
            ));
            "[tags, tags_all]"
                .parse()
                .map_err(|err| anyhow!("build ignore_changes fallback: {err}"))?
        }
    };

    for mut structure in lifecycle_body.iter_mut() {
        if let Some(mut attr) = structure.as_attribute_mut() {
            if attr.key.as_str() == "ignore_changes" {
                *attr.value_mut() = expr;
                break;
            }
        }
    }
    Ok(())
}

/// Extend an `ignore_changes` expression with one more identifier. Tuple
/// literals are unioned in place; anything else is wrapped in `concat`.
pub fn extend_ignore_changes(current: &str, attr: &str) -> String {
    let current = current.trim();
    if current.is_empty() {
        return format!("[{attr}]");
    }
    if contains_ignore_attr(current, attr) {
        return current.to_string();
    }

    if let Ok(Expression::Array(array)) = current.parse::<Expression>() {
        let mut values: Vec<String> = array
            .iter()
            .map(expr_text)
            .filter(|value| !value.is_empty())
            .collect();
        if values.iter().any(|value| value == attr) {
            return current.to_string();
        }
        values.push(attr.to_string());
        return format!("[{}]", values.join(", "));
    }

    format!("concat({current}, [{attr}])")
}

/// Token-wise membership check over an ignore_changes expression.
pub fn contains_ignore_attr(expr: &str, attr: &str) -> bool {
    expr.split(|c: char| matches!(c, '[' | ']' | ',' | '(' | ')') || c.is_whitespace())
        .any(|field| field == attr)
}

/// Apply the lifecycle rewrite to every resource block in a body,
/// recursively; used for initialized module sources.
pub fn ensure_lifecycle_in_body(body: &mut Body) -> Result<()> {
    for mut structure in body.iter_mut() {
        let Some(block) = structure.as_block_mut() else {
            continue;
        };
        if block.ident.as_str() == "resource" {
            ensure_lifecycle_ignores_tags(block)?;
        }
        ensure_lifecycle_in_body(&mut block.body)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(source: &str) -> String {
        let mut body: Body = source.parse().unwrap();
        ensure_lifecycle_in_body(&mut body).unwrap();
        body.to_string()
    }

    #[test]
    fn test_injects_lifecycle_into_empty_resource() {
        let out = rewrite("resource \"aws_kms_key\" \"single\" {\n}\n");
        assert!(out.contains("lifecycle"));
        assert!(out.contains("ignore_changes = [tags, tags_all]"));

        // Round-trip through the parser to prove the output stays valid.
        let reparsed: Result<Body, _> = out.parse();
        assert!(reparsed.is_ok());
    }

    #[test]
    fn test_deny_listed_type_is_left_alone() {
        let source = "resource \"aws_iam_role_policy_attachment\" \"skip\" {\n  role = \"r\"\n}\n";
        let out = rewrite(source);
        assert!(!out.contains("lifecycle"));
    }

    #[test]
    fn test_non_aws_resources_untouched() {
        let source = "resource \"random_pet\" \"name\" {\n}\n";
        assert!(!rewrite(source).contains("lifecycle"));
    }

    #[test]
    fn test_existing_tuple_is_unioned() {
        let source = "resource \"aws_s3_bucket\" \"b\" {\n  lifecycle {\n    ignore_changes = [acl, tags]\n  }\n}\n";
        let out = rewrite(source);
        assert!(out.contains("ignore_changes = [acl, tags, tags_all]"));
    }

    #[test]
    fn test_existing_lifecycle_without_ignore_changes() {
        let source = "resource \"aws_s3_bucket\" \"b\" {\n  lifecycle {\n    prevent_destroy = true\n  }\n}\n";
        let out = rewrite(source);
        assert!(out.contains("prevent_destroy = true"));
        assert!(out.contains("ignore_changes = [tags, tags_all]"));
    }

    #[test]
    fn test_non_literal_expression_is_wrapped_in_concat() {
        let source = "resource \"aws_s3_bucket\" \"b\" {\n  lifecycle {\n    ignore_changes = local.ignored\n  }\n}\n";
        let out = rewrite(source);
        assert!(out.contains("concat(concat(local.ignored, [tags]), [tags_all])"));
    }

    #[test]
    fn test_already_complete_tuple_is_unchanged() {
        let source = "resource \"aws_s3_bucket\" \"b\" {\n  lifecycle {\n    ignore_changes = [tags, tags_all]\n  }\n}\n";
        let out = rewrite(source);
        assert_eq!(out.matches("tags_all").count(), 1);
    }

    #[test]
    fn test_extend_ignore_changes() {
        assert_eq!(extend_ignore_changes("", "tags"), "[tags]");
        assert_eq!(extend_ignore_changes("[tags]", "tags"), "[tags]");
        assert_eq!(extend_ignore_changes("[acl]", "tags"), "[acl, tags]");
        assert_eq!(
            extend_ignore_changes("var.ignored", "tags"),
            "concat(var.ignored, [tags])"
        );
    }

    #[test]
    fn test_contains_ignore_attr() {
        assert!(contains_ignore_attr("[tags, tags_all]", "tags"));
        assert!(contains_ignore_attr("concat(x, [tags])", "tags"));
        assert!(!contains_ignore_attr("[tags_all]", "tags"));
    }
}
