//! Stack discovery and the dependency graph.
//!
//! A stack is any directory containing a `dependencies.json` manifest.
//! Referenced-but-undeclared dependency paths are entered as bare stacks so
//! the graph invariant holds: every dependency path is also a key.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::paths;

/// A configuration root discovered during the graph walk. Immutable after
/// the build.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    pub path: PathBuf,
    pub dependencies: Vec<PathBuf>,
    pub skip_destroy: bool,
}

/// Mapping from absolute stack directory to stack. Ordered so independent
/// nodes keep a stable iteration order.
pub type StackGraph = BTreeMap<PathBuf, Stack>;

#[derive(Debug, Default, Deserialize)]
struct FileDependencies {
    #[serde(default)]
    dependencies: DependencyPaths,
    #[serde(default)]
    skip_when_destroying: bool,
}

#[derive(Debug, Default, Deserialize)]
struct DependencyPaths {
    #[serde(default)]
    paths: Vec<String>,
}

/// Walk `root` and build the graph from every `dependencies.json` found.
pub fn build(root: &Path) -> Result<StackGraph> {
    let root_abs = paths::absolutize(root)?;
    let mut graph = StackGraph::new();

    for entry in WalkDir::new(&root_abs) {
        let entry = entry.with_context(|| format!("walk {}", root_abs.display()))?;
        if entry.file_type().is_dir() || entry.file_name() != "dependencies.json" {
            continue;
        }

        let manifest_path = entry.path();
        let data = fs::read(manifest_path)
            .with_context(|| format!("read {}", manifest_path.display()))?;
        let deps: FileDependencies = serde_json::from_slice(&data)
            .with_context(|| format!("invalid JSON in {}", manifest_path.display()))?;

        let stack_dir = paths::clean(
            manifest_path
                .parent()
                .with_context(|| format!("stack directory of {}", manifest_path.display()))?,
        );

        let mut dependencies = Vec::new();
        for dep in &deps.dependencies.paths {
            let dep_path = Path::new(dep);
            let dep_abs = if dep_path.is_absolute() {
                paths::clean(dep_path)
            } else {
                paths::clean(&root_abs.join(dep_path))
            };
            dependencies.push(dep_abs.clone());
            ensure_stack(&mut graph, &dep_abs);
        }

        let stack = ensure_stack(&mut graph, &stack_dir);
        stack.skip_destroy = deps.skip_when_destroying;
        stack.dependencies.extend(dependencies);
    }

    Ok(graph)
}

fn ensure_stack<'g>(graph: &'g mut StackGraph, path: &Path) -> &'g mut Stack {
    graph.entry(path.to_path_buf()).or_insert_with(|| Stack {
        path: path.to_path_buf(),
        ..Stack::default()
    })
}

/// Depth-first topological sort with a temporary-mark cycle detector.
/// Dependencies precede dependents; on a cycle the error names one node on it.
pub fn topo_sort(graph: &StackGraph) -> Result<Vec<PathBuf>> {
    let mut visited = BTreeSet::new();
    let mut temp_mark = BTreeSet::new();
    let mut order = Vec::with_capacity(graph.len());

    fn visit(
        graph: &StackGraph,
        node: &Path,
        visited: &mut BTreeSet<PathBuf>,
        temp_mark: &mut BTreeSet<PathBuf>,
        order: &mut Vec<PathBuf>,
    ) -> Result<()> {
        if temp_mark.contains(node) {
            bail!("cycle detected involving {}", node.display());
        }
        if visited.contains(node) {
            return Ok(());
        }

        temp_mark.insert(node.to_path_buf());
        if let Some(stack) = graph.get(node) {
            for dep in &stack.dependencies {
                visit(graph, dep, visited, temp_mark, order)?;
            }
        }
        temp_mark.remove(node);
        visited.insert(node.to_path_buf());
        order.push(node.to_path_buf());
        Ok(())
    }

    for node in graph.keys() {
        if !visited.contains(node.as_path()) {
            visit(graph, node, &mut visited, &mut temp_mark, &mut order)?;
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("dependencies.json"), contents).unwrap();
    }

    #[test]
    fn test_build_graph_and_topo_sort() {
        let root = TempDir::new().unwrap();
        let root_path = paths::clean(root.path());

        write_manifest(
            &root_path.join("a"),
            r#"{"dependencies": {"paths": []}}"#,
        );
        write_manifest(
            &root_path.join("b"),
            r#"{"dependencies": {"paths": ["a"]}}"#,
        );
        write_manifest(
            &root_path.join("c"),
            r#"{"dependencies": {"paths": ["b"]}, "skip_when_destroying": true}"#,
        );

        let graph = build(&root_path).unwrap();
        assert_eq!(graph.len(), 3);
        assert!(graph[&root_path.join("c")].skip_destroy);
        assert_eq!(
            graph[&root_path.join("b")].dependencies,
            vec![root_path.join("a")]
        );

        let order = topo_sort(&graph).unwrap();
        let index: BTreeMap<_, _> = order.iter().enumerate().map(|(i, p)| (p.clone(), i)).collect();
        assert!(index[&root_path.join("a")] < index[&root_path.join("b")]);
        assert!(index[&root_path.join("b")] < index[&root_path.join("c")]);
    }

    #[test]
    fn test_build_enters_undeclared_dependencies_as_stubs() {
        let root = TempDir::new().unwrap();
        let root_path = paths::clean(root.path());

        write_manifest(
            &root_path.join("app"),
            r#"{"dependencies": {"paths": ["network/vpc"]}}"#,
        );

        let graph = build(&root_path).unwrap();
        assert_eq!(graph.len(), 2);

        let stub = &graph[&root_path.join("network/vpc")];
        assert!(stub.dependencies.is_empty());
        assert!(!stub.skip_destroy);
    }

    #[test]
    fn test_build_rejects_invalid_json() {
        let root = TempDir::new().unwrap();
        let root_path = paths::clean(root.path());
        write_manifest(&root_path.join("bad"), "{not json");

        let err = build(&root_path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_topo_sort_detects_cycle() {
        let root = TempDir::new().unwrap();
        let root_path = paths::clean(root.path());

        write_manifest(
            &root_path.join("a"),
            r#"{"dependencies": {"paths": ["c"]}}"#,
        );
        write_manifest(
            &root_path.join("b"),
            r#"{"dependencies": {"paths": ["a"]}}"#,
        );
        write_manifest(
            &root_path.join("c"),
            r#"{"dependencies": {"paths": ["b"]}}"#,
        );

        let graph = build(&root_path).unwrap();
        let err = topo_sort(&graph).unwrap_err();
        assert!(err.to_string().contains("cycle detected"));
    }

    #[test]
    fn test_topo_sort_stable_order_for_independent_nodes() {
        let mut graph = StackGraph::new();
        for name in ["alpha", "beta", "gamma"] {
            let path = PathBuf::from(format!("/stacks/{name}"));
            graph.insert(
                path.clone(),
                Stack {
                    path,
                    ..Stack::default()
                },
            );
        }

        let order = topo_sort(&graph).unwrap();
        assert_eq!(
            order,
            vec![
                PathBuf::from("/stacks/alpha"),
                PathBuf::from("/stacks/beta"),
                PathBuf::from("/stacks/gamma"),
            ]
        );
    }
}
