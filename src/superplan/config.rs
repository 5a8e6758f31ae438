//! Synthetic configuration assembly.
//!
//! Every stack's `.tf` files are parsed into concrete-syntax trees,
//! renamed with the stack prefix, scrubbed of `terraform` blocks and
//! duplicate provider/variable declarations, forced to ignore tag drift,
//! and concatenated into one `super.tf`. Mutations go through the CST so
//! unaffected regions survive byte-identical.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use hcl_edit::expr::{Expression, Traversal, TraversalOperator};
use hcl_edit::structure::{Attribute, Block, BlockLabel, Body, Structure};
use hcl_edit::visit_mut::{visit_traversal_mut, VisitMut};
use hcl_edit::Ident;

use crate::paths;
use crate::ui;

use super::lifecycle::ensure_lifecycle_ignores_tags;
use super::providers::{self, expr_text, ProviderRequirement, ProviderRequirements};
use super::state::prefix_segment;

/// A reference-rewrite rule: a dotted address prefix and its replacement.
/// `search` and `replacement` always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    pub search: Vec<String>,
    pub replacement: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RenameContext {
    pub rules: Vec<RenameRule>,
    seen: HashSet<String>,
}

impl RenameContext {
    pub fn add_rule(&mut self, search: &[String], replacement: &[String]) {
        if search.is_empty() || search.len() != replacement.len() {
            return;
        }
        let key = format!("{}->{}", search.join("\u{0}"), replacement.join("\u{0}"));
        if self.seen.insert(key) {
            self.rules.push(RenameRule {
                search: search.to_vec(),
                replacement: replacement.to_vec(),
            });
        }
    }
}

/// Every `.tf` file under a stack, sorted, skipping `.terraform`.
pub fn load_terraform_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = walkdir::WalkDir::new(dir).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir() && entry.file_name() == ".terraform")
    });
    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) == Some("tf") {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn set_block_label(label: &mut BlockLabel, value: &str) -> Result<()> {
    match label {
        BlockLabel::String(current) => {
            **current = value.to_string();
        }
        BlockLabel::Ident(current) => {
            **current = Ident::try_new(value).map_err(|err| anyhow!("rename label: {err}"))?;
        }
    }
    Ok(())
}

/// First pass: rename resource/data/module/output/locals declarations at
/// the top level of a stack (module subtrees are named but not descended
/// into for declarations) and record the reference-rewrite rules the
/// second pass applies.
pub fn collect_rename_rules(
    body: &mut Body,
    prefix: &str,
    ctx: &mut RenameContext,
    inside_module: bool,
) -> Result<()> {
    for mut structure in body.iter_mut() {
        let Some(block) = structure.as_block_mut() else {
            continue;
        };
        let block_type = block.ident.as_str().to_string();

        if !inside_module {
            match block_type.as_str() {
                "resource" | "data" if block.labels.len() >= 2 => {
                    let kind = block.labels[0].as_str().to_string();
                    let old_name = block.labels[1].as_str().to_string();
                    let new_name = prefix_segment(prefix, &old_name);
                    if new_name != old_name {
                        set_block_label(&mut block.labels[1], &new_name)?;
                        if block_type == "resource" {
                            ctx.add_rule(
                                &[kind.clone(), old_name.clone()],
                                &[kind.clone(), new_name.clone()],
                            );
                            ctx.add_rule(
                                &["resource".to_string(), kind.clone(), old_name.clone()],
                                &["resource".to_string(), kind.clone(), new_name.clone()],
                            );
                        } else {
                            ctx.add_rule(
                                &["data".to_string(), kind.clone(), old_name],
                                &["data".to_string(), kind, new_name],
                            );
                        }
                    }
                }
                "module" if !block.labels.is_empty() => {
                    let old_name = block.labels[0].as_str().to_string();
                    let new_name = prefix_segment(prefix, &old_name);
                    if new_name != old_name {
                        set_block_label(&mut block.labels[0], &new_name)?;
                        ctx.add_rule(
                            &["module".to_string(), old_name],
                            &["module".to_string(), new_name],
                        );
                    }
                }
                "output" if !block.labels.is_empty() => {
                    let old_name = block.labels[0].as_str().to_string();
                    let new_name = prefix_segment(prefix, &old_name);
                    if new_name != old_name {
                        set_block_label(&mut block.labels[0], &new_name)?;
                    }
                }
                "locals" => {
                    rename_local_attributes(&mut block.body, prefix, ctx)?;
                }
                _ => {}
            }
        }

        let next_inside = inside_module || block_type == "module";
        collect_rename_rules(&mut block.body, prefix, ctx, next_inside)?;
    }
    Ok(())
}

fn rename_local_attributes(body: &mut Body, prefix: &str, ctx: &mut RenameContext) -> Result<()> {
    let mut names: Vec<String> = body
        .iter()
        .filter_map(|s| s.as_attribute())
        .map(|attr| attr.key.as_str().to_string())
        .collect();
    names.sort();

    for name in names {
        let new_name = prefix_segment(prefix, &name);
        if new_name == name {
            continue;
        }
        for index in 0..body.len() {
            let Some(attr) = body.get_mut(index).and_then(|s| s.as_attribute_mut()) else {
                continue;
            };
            if attr.key.as_str() == name {
                *attr.key =
                    Ident::try_new(&new_name).map_err(|err| anyhow!("rename local: {err}"))?;
                break;
            }
        }
        ctx.add_rule(
            &["local".to_string(), name],
            &["local".to_string(), new_name],
        );
    }
    Ok(())
}

struct RewriteRefs<'a> {
    rules: &'a [RenameRule],
}

impl VisitMut for RewriteRefs<'_> {
    fn visit_traversal_mut(&mut self, node: &mut Traversal) {
        apply_rules_to_traversal(node, self.rules);
        visit_traversal_mut(self, node);
    }
}

fn apply_rules_to_traversal(traversal: &mut Traversal, rules: &[RenameRule]) {
    let root = match &traversal.expr {
        Expression::Variable(variable) => variable.as_str().to_string(),
        _ => return,
    };

    for rule in rules {
        if rule.search.len() < 2 || rule.search[0] != root {
            continue;
        }
        let needed = rule.search.len() - 1;

        let mut chain = Vec::with_capacity(needed);
        for operator in traversal.operators.iter().take(needed) {
            match &**operator {
                TraversalOperator::GetAttr(ident) => chain.push(ident.as_str().to_string()),
                _ => break,
            }
        }
        if chain.len() < needed || chain[..] != rule.search[1..] {
            continue;
        }

        if let Expression::Variable(variable) = &mut traversal.expr {
            if let Ok(ident) = Ident::try_new(&rule.replacement[0]) {
                **variable = ident;
            }
        }
        for (index, operator) in traversal.operators.iter_mut().take(needed).enumerate() {
            if let TraversalOperator::GetAttr(ident) = &mut **operator {
                if let Ok(new_ident) = Ident::try_new(&rule.replacement[index + 1]) {
                    **ident = new_ident;
                }
            }
        }
        return;
    }
}

/// Second pass: apply the collected rules to every attribute expression.
pub fn rewrite_body_references(body: &mut Body, rules: &[RenameRule]) {
    if rules.is_empty() {
        return;
    }
    let mut visitor = RewriteRefs { rules };
    for mut structure in body.iter_mut() {
        if let Some(mut attr) = structure.as_attribute_mut() {
            visitor.visit_expr_mut(attr.value_mut());
        } else if let Some(block) = structure.as_block_mut() {
            rewrite_body_references(&mut block.body, rules);
        }
    }
}

/// Third pass: harvest and drop `terraform` blocks, enforce the tag
/// lifecycle on resources, and deduplicate provider blocks across stacks.
pub fn cleanup_terraform_blocks(
    body: &mut Body,
    requirements: &mut ProviderRequirements,
    seen_providers: &mut HashSet<String>,
) -> Result<()> {
    let structures: Vec<Structure> = std::mem::replace(body, Body::new()).into_iter().collect();

    for mut structure in structures {
        if let Some(block) = structure.as_block_mut() {
            match block.ident.as_str() {
                "terraform" => {
                    consume_terraform_block(block, requirements)?;
                    continue;
                }
                "resource" => ensure_lifecycle_ignores_tags(block)?,
                "provider" => {
                    if !register_provider_block(block, seen_providers) {
                        continue;
                    }
                    remove_provider_tag_defaults(block);
                }
                _ => {}
            }
            cleanup_terraform_blocks(&mut block.body, requirements, seen_providers)?;
        }
        body.push(structure);
    }
    Ok(())
}

fn consume_terraform_block(
    block: &mut Block,
    requirements: &mut ProviderRequirements,
) -> Result<()> {
    for nested in block.body.iter().filter_map(|s| s.as_block()) {
        if nested.ident.as_str() != "required_providers" {
            continue;
        }
        let mut entries: Vec<&Attribute> =
            nested.body.iter().filter_map(|s| s.as_attribute()).collect();
        entries.sort_by_key(|attr| attr.key.as_str().to_string());
        for attr in entries {
            providers::merge_entry(requirements, attr.key.as_str(), &attr.value)
                .with_context(|| format!("merge required provider {:?}", attr.key.as_str()))?;
        }
    }
    Ok(())
}

/// Keep only the first provider block per `(type, alias, region)` key.
fn register_provider_block(block: &Block, seen: &mut HashSet<String>) -> bool {
    let Some(provider_type) = block.labels.first().map(|label| label.as_str().to_string())
    else {
        return true;
    };

    let alias = attribute_expr_text(&block.body, "alias");
    let region = attribute_expr_text(&block.body, "region");
    let key = format!("{provider_type}|{alias}|{region}");

    if seen.contains(&key) {
        ui::info(&format!(
            "Skipping duplicate provider {provider_type:?} (alias={alias}, region={region})"
        ));
        return false;
    }
    seen.insert(key);
    true
}

fn attribute_expr_text(body: &Body, key: &str) -> String {
    body.iter()
        .filter_map(|s| s.as_attribute())
        .find(|attr| attr.key.as_str() == key)
        .map(|attr| expr_text(&attr.value))
        .unwrap_or_default()
}

fn remove_provider_tag_defaults(block: &mut Block) {
    let structures: Vec<Structure> =
        std::mem::replace(&mut block.body, Body::new()).into_iter().collect();

    for structure in structures {
        if let Some(attr) = structure.as_attribute() {
            if matches!(attr.key.as_str(), "default_tags" | "tags" | "tags_all") {
                continue;
            }
        }
        if let Some(nested) = structure.as_block() {
            if nested.ident.as_str() == "default_tags" {
                continue;
            }
        }
        block.body.push(structure);
    }
}

/// Drop `variable` blocks whose name has already been declared by an
/// earlier stack (first declaration wins).
pub fn remove_duplicate_variables(body: &mut Body, seen: &mut HashSet<String>) {
    let structures: Vec<Structure> = std::mem::replace(body, Body::new()).into_iter().collect();

    for structure in structures {
        if let Some(block) = structure.as_block() {
            if block.ident.as_str() == "variable" {
                if let Some(name) = block.labels.first().map(|label| label.as_str().to_string()) {
                    if !seen.insert(name) {
                        continue;
                    }
                }
            }
        }
        body.push(structure);
    }
}

/// Rewrite one stack's configuration, returning the surviving body text
/// and its harvested provider requirements.
pub fn render_stack_configuration(
    stack_dir: &Path,
    prefix: &str,
    seen_variables: &mut HashSet<String>,
    seen_providers: &mut HashSet<String>,
) -> Result<(String, ProviderRequirements)> {
    let files = load_terraform_files(stack_dir)?;
    if files.is_empty() {
        return Ok((String::new(), ProviderRequirements::new()));
    }

    let mut parsed = Vec::with_capacity(files.len());
    let mut ctx = RenameContext::default();
    for path in &files {
        let src = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let mut body: Body = src
            .parse()
            .map_err(|err| anyhow!("parse {}: {err}", path.display()))?;
        collect_rename_rules(&mut body, prefix, &mut ctx, false)?;
        parsed.push(body);
    }

    let mut stack_providers = ProviderRequirements::new();
    for body in &mut parsed {
        rewrite_body_references(body, &ctx.rules);
        cleanup_terraform_blocks(body, &mut stack_providers, seen_providers)?;
        remove_duplicate_variables(body, seen_variables);
    }

    let rendered: Vec<String> = parsed
        .iter()
        .map(|body| body.to_string().trim().to_string())
        .filter(|content| !content.is_empty())
        .collect();

    let mut out = String::new();
    for (index, content) in rendered.iter().enumerate() {
        out.push_str(content);
        out.push('\n');
        if index != rendered.len() - 1 {
            out.push('\n');
        }
    }

    Ok((out, stack_providers))
}

/// Concatenate every stack's rewritten configuration into
/// `<merged>/super.tf` with per-stack header comments, and return the
/// merged provider-requirement table.
pub fn write_combined_configuration(
    order: &[PathBuf],
    prefixes: &std::collections::BTreeMap<PathBuf, String>,
    root_abs: &Path,
    merged_dir: &Path,
) -> Result<ProviderRequirements> {
    if order.is_empty() {
        bail!("no stacks to render");
    }

    let mut seen_variables = HashSet::new();
    let mut seen_providers = HashSet::new();
    let mut requirements = ProviderRequirements::new();
    let mut out = String::new();

    for stack_dir in order {
        let prefix = prefixes
            .get(stack_dir)
            .cloned()
            .unwrap_or_else(|| super::state::sanitize_identifier(
                &stack_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            ));

        let rel = paths::rel_slash(root_abs, stack_dir);
        let (body, stack_providers) =
            render_stack_configuration(stack_dir, &prefix, &mut seen_variables, &mut seen_providers)
                .with_context(|| format!("rendering stack {rel}"))?;

        providers::merge_tables(&mut requirements, stack_providers);

        if body.trim().is_empty() {
            continue;
        }

        out.push_str(&format!("# --- Stack {prefix} ({rel}) ---\n"));
        out.push_str(&body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }

    if out.is_empty() {
        bail!("no Terraform configuration generated");
    }

    let config_path = merged_dir.join("super.tf");
    fs::write(&config_path, &out).with_context(|| format!("write {}", config_path.display()))?;
    ui::success(&format!("Wrote combined configuration to {}", config_path.display()));
    Ok(requirements)
}

/// Emit the synthetic `terraform {}` block: a local backend plus the union
/// of configured requirements and snapshot-discovered providers.
pub fn ensure_local_backend(
    merged_dir: &Path,
    state_providers: &std::collections::BTreeMap<String, String>,
    config_providers: &ProviderRequirements,
) -> Result<()> {
    let mut names: Vec<&String> = config_providers
        .keys()
        .chain(state_providers.keys())
        .collect();
    names.sort();
    names.dedup();

    let mut out = String::from("terraform {\n  backend \"local\" {\n  }\n");
    if !names.is_empty() {
        out.push_str("  required_providers {\n");
        for name in names {
            if let Some(requirement) = config_providers.get(name) {
                out.push_str(&format!("    {name} = {}\n", requirement.render()));
            } else if let Some(source) = state_providers.get(name) {
                let fallback = ProviderRequirement {
                    source: Some(source.clone()),
                    ..ProviderRequirement::default()
                };
                out.push_str(&format!("    {name} = {}\n", fallback.render()));
            }
        }
        out.push_str("  }\n");
    }
    out.push_str("}\n");

    out.parse::<Body>()
        .map_err(|err| anyhow!("generated terraform block failed to parse: {err}"))?;

    let main_path = merged_dir.join("main.tf");
    fs::write(&main_path, out).with_context(|| format!("write {}", main_path.display()))
}

/// After init, the external-module cache under `.terraform/modules` holds
/// plain source files; apply the same tag-lifecycle rewrite there.
pub fn patch_module_resource_lifecycle(merged_dir: &Path) -> Result<usize> {
    let modules_dir = merged_dir.join(".terraform").join("modules");
    if !modules_dir.is_dir() {
        return Ok(0);
    }

    let mut updated = 0;
    for entry in walkdir::WalkDir::new(&modules_dir) {
        let entry = entry.with_context(|| format!("walk {}", modules_dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("tf") {
            continue;
        }

        let src = fs::read_to_string(entry.path())
            .with_context(|| format!("read {}", entry.path().display()))?;
        let mut body: Body = src
            .parse()
            .map_err(|err| anyhow!("parse module config {}: {err}", entry.path().display()))?;

        super::lifecycle::ensure_lifecycle_in_body(&mut body)?;

        let rewritten = body.to_string();
        if rewritten != src {
            fs::write(entry.path(), rewritten)
                .with_context(|| format!("write module config {}", entry.path().display()))?;
            updated += 1;
        }
    }

    if updated > 0 {
        ui::info(&format!("Applied lifecycle tag ignore to {updated} module files"));
    }
    Ok(updated)
}
