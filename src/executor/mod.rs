//! Layered parallel executor.
//!
//! Scheduling model: at each step every stack whose unprocessed-dependency
//! count is zero forms the next layer; the layer runs on a bounded worker
//! pool, and only when it has fully completed does the next layer start.
//! The first worker error trips a shared cancellation token so siblings
//! stop at their next invocation boundary and no new workers launch.

mod plan;
mod summary;

pub use summary::Summary;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::graph::{Stack, StackGraph};
use crate::paths;
use crate::progress::Manager;
use crate::runner::{Runner, RunnerOptions, StackRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Plan,
    Apply,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Executed,
    Cached,
    Skipped,
}

/// Options for a single command invocation, passed by value.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub root_dir: PathBuf,
    pub environment: String,
    pub account_id: String,
    pub region: String,
    pub terraform_path: PathBuf,
    pub terraform_version: String,
    pub parallelism: usize,
    pub use_cache: bool,
    pub force_stacks: HashSet<String>,
    pub disable_refresh: bool,
}

impl Options {
    pub fn defaults(&mut self) {
        if self.root_dir.as_os_str().is_empty() {
            self.root_dir = PathBuf::from(".");
        }
        if self.environment.is_empty() {
            self.environment = "dev".to_string();
        }
        if self.region.is_empty() {
            self.region = "eu-west-2".to_string();
        }
        if self.parallelism == 0 {
            self.parallelism = 4;
        }
    }

    pub fn is_forced(&self, stack_rel: &str) -> bool {
        self.force_stacks.contains(stack_rel)
    }

    fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            root_dir: self.root_dir.clone(),
            environment: self.environment.clone(),
            account_id: self.account_id.clone(),
            region: self.region.clone(),
            terraform_path: self.terraform_path.clone(),
            disable_refresh: self.disable_refresh,
        }
    }
}

/// Builds a fresh runner per job, so tests can substitute a fake.
pub type RunnerFactory =
    Arc<dyn Fn(CancelToken, RunnerOptions) -> Result<Box<dyn StackRunner>> + Send + Sync>;

fn default_factory() -> RunnerFactory {
    Arc::new(|cancel, opts| {
        let runner = Runner::new(cancel, opts)?;
        Ok(Box::new(runner) as Box<dyn StackRunner>)
    })
}

pub fn init_all(graph: &StackGraph, mut opts: Options) -> Result<Summary> {
    opts.use_cache = false;
    run_all(graph, opts, Operation::Init)
}

pub fn plan_all(graph: &StackGraph, opts: Options) -> Result<Summary> {
    run_all(graph, opts, Operation::Plan)
}

pub fn apply_all(graph: &StackGraph, mut opts: Options) -> Result<Summary> {
    opts.use_cache = false;
    run_all(graph, opts, Operation::Apply)
}

pub fn destroy_all(graph: &StackGraph, mut opts: Options) -> Result<Summary> {
    opts.use_cache = false;
    run_all(graph, opts, Operation::Destroy)
}

pub fn run_all(graph: &StackGraph, opts: Options, op: Operation) -> Result<Summary> {
    run_all_with(graph, opts, op, default_factory())
}

pub fn init_stack(stack: &Stack, opts: Options) -> Result<Summary> {
    run_single(stack, opts, Operation::Init, default_factory())
}

pub fn plan_stack(stack: &Stack, opts: Options) -> Result<Summary> {
    plan::plan_stack_with(stack, opts, default_factory())
}

pub fn apply_stack(stack: &Stack, opts: Options) -> Result<Summary> {
    run_single(stack, opts, Operation::Apply, default_factory())
}

pub fn destroy_stack(stack: &Stack, opts: Options) -> Result<Summary> {
    run_single(stack, opts, Operation::Destroy, default_factory())
}

fn run_all_with(
    graph: &StackGraph,
    mut opts: Options,
    op: Operation,
    factory: RunnerFactory,
) -> Result<Summary> {
    opts.defaults();
    if opts.terraform_path.as_os_str().is_empty() {
        bail!("terraform binary path not provided");
    }

    let executor = Executor::new(graph, opts, factory)?;
    executor.run(op)
}

struct Executor<'g> {
    options: Options,
    graph: &'g StackGraph,
    rel_names: BTreeMap<PathBuf, String>,
    dependents: BTreeMap<PathBuf, Vec<PathBuf>>,
    progress: Manager,
    plan_hashes: Mutex<HashMap<PathBuf, Vec<u8>>>,
    factory: RunnerFactory,
}

impl<'g> Executor<'g> {
    fn new(graph: &'g StackGraph, options: Options, factory: RunnerFactory) -> Result<Self> {
        let root_abs = paths::absolutize(&options.root_dir)?;

        let mut rel_names = BTreeMap::new();
        let mut dependents: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        let progress = Manager::new();

        for (path, stack) in graph {
            let rel = paths::rel_slash(&root_abs, path);
            progress.register(&rel);
            rel_names.insert(path.clone(), rel);
            for dep in &stack.dependencies {
                dependents.entry(dep.clone()).or_default().push(path.clone());
            }
        }

        Ok(Self {
            options,
            graph,
            rel_names,
            dependents,
            progress,
            plan_hashes: Mutex::new(HashMap::new()),
            factory,
        })
    }

    fn run(&self, op: Operation) -> Result<Summary> {
        let mut summary = Summary::default();
        let mut processed: BTreeSet<PathBuf> = BTreeSet::new();
        let mut indegree: BTreeMap<PathBuf, usize> = self
            .graph
            .iter()
            .map(|(path, stack)| (path.clone(), stack.dependencies.len()))
            .collect();
        let mut waiting_notified: HashSet<PathBuf> = HashSet::new();
        let mut layer_index = 1;

        while processed.len() < self.graph.len() {
            self.notify_waiting(&indegree, &processed, &mut waiting_notified);

            let layer: Vec<PathBuf> = indegree
                .iter()
                .filter(|(path, degree)| !processed.contains(*path) && **degree == 0)
                .map(|(path, _)| path.clone())
                .collect();
            if layer.is_empty() {
                // Cannot happen after a successful topo sort.
                bail!("dependency cycle detected");
            }

            println!("[layer {layer_index}] running: {}", self.layer_names(&layer));
            let layer_summary = self.run_layer(&layer, op)?;
            let layer_failed = !layer_summary.is_success();
            summary.merge(layer_summary);
            if layer_failed {
                return Ok(summary);
            }

            for node in &layer {
                processed.insert(node.clone());
                if let Some(children) = self.dependents.get(node) {
                    for child in children {
                        if let Some(degree) = indegree.get_mut(child) {
                            *degree = degree.saturating_sub(1);
                        }
                    }
                }
            }
            layer_index += 1;
        }

        Ok(summary)
    }

    fn layer_names(&self, layer: &[PathBuf]) -> String {
        layer
            .iter()
            .map(|path| self.rel_name(path))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn rel_name(&self, path: &Path) -> String {
        self.rel_names
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }

    fn notify_waiting(
        &self,
        indegree: &BTreeMap<PathBuf, usize>,
        processed: &BTreeSet<PathBuf>,
        notified: &mut HashSet<PathBuf>,
    ) {
        for (path, degree) in indegree {
            if processed.contains(path) || *degree == 0 || notified.contains(path) {
                continue;
            }
            let Some(stack) = self.graph.get(path) else {
                continue;
            };
            let waiting_on: Vec<String> = stack
                .dependencies
                .iter()
                .filter(|dep| !processed.contains(*dep))
                .map(|dep| self.rel_name(dep))
                .collect();
            if waiting_on.is_empty() {
                continue;
            }
            notified.insert(path.clone());
            let rel = self.rel_name(path);
            self.progress
                .waiting(&rel, &format!("waiting for {}", waiting_on.join(", ")));
        }
    }

    fn run_layer(&self, layer: &[PathBuf], op: Operation) -> Result<Summary> {
        let cancel = CancelToken::new();
        let outcome = Mutex::new(Summary::default());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.parallelism)
            .build()
            .context("build executor thread pool")?;

        pool.install(|| {
            layer.par_iter().for_each(|stack_path| {
                if cancel.is_cancelled() {
                    return;
                }
                let Some(stack) = self.graph.get(stack_path) else {
                    return;
                };
                let rel = self.rel_name(stack_path);

                self.progress.start(&rel);
                let result = self.execute_stack(&cancel, stack, &rel, op);

                let mut summary = outcome.lock().expect("executor summary poisoned");
                match result {
                    Err(err) => {
                        let message = format!("{err:#}");
                        self.progress.fail(&rel, &message);
                        summary.failed.insert(rel, message);
                        cancel.cancel();
                    }
                    Ok(Status::Cached) => {
                        self.progress.skip(&rel, "cache hit");
                        summary.cached += 1;
                    }
                    Ok(Status::Skipped) => {
                        self.progress.skip(&rel, "skip_when_destroying");
                        summary.skipped += 1;
                    }
                    Ok(Status::Executed) => {
                        self.progress.succeed(&rel);
                        summary.executed += 1;
                    }
                }
            });
        });

        Ok(outcome.into_inner().expect("executor summary poisoned"))
    }

    fn execute_stack(
        &self,
        cancel: &CancelToken,
        stack: &Stack,
        rel: &str,
        op: Operation,
    ) -> Result<Status> {
        if op == Operation::Destroy && stack.skip_destroy {
            return Ok(Status::Skipped);
        }

        let runner = (self.factory)(cancel.clone(), self.options.runner_options())?;
        match op {
            Operation::Plan => plan::plan_stack_cached(
                runner.as_ref(),
                stack,
                rel,
                &self.options,
                &self.plan_hashes,
            ),
            Operation::Apply => runner.apply(&stack.path).map(|_| Status::Executed),
            Operation::Destroy => runner.destroy(&stack.path).map(|_| Status::Executed),
            Operation::Init => runner.init_only(&stack.path, true).map(|_| Status::Executed),
        }
    }
}

fn run_single(
    stack: &Stack,
    mut opts: Options,
    op: Operation,
    factory: RunnerFactory,
) -> Result<Summary> {
    opts.defaults();
    if opts.terraform_path.as_os_str().is_empty() {
        bail!("terraform binary path not provided");
    }

    let root_abs = paths::absolutize(&opts.root_dir)?;
    let rel = paths::rel_slash(&root_abs, &stack.path);

    let progress = Manager::new();
    progress.register(&rel);
    progress.start(&rel);

    let cancel = CancelToken::new();
    let runner = (factory)(cancel, opts.runner_options())?;

    let result = match op {
        Operation::Apply => runner.apply(&stack.path),
        Operation::Destroy => runner.destroy(&stack.path),
        Operation::Init => runner.init_only(&stack.path, true),
        Operation::Plan => bail!("plan must go through plan_stack"),
    };

    match result {
        Err(err) => {
            let message = format!("{err:#}");
            progress.fail(&rel, &message);
            let mut summary = Summary::default();
            summary.failed.insert(rel, message);
            Ok(summary)
        }
        Ok(()) => {
            progress.succeed(&rel);
            Ok(Summary {
                executed: 1,
                ..Summary::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::cache;

    #[derive(Default)]
    struct FakeState {
        records: Mutex<Vec<String>>,
        failures: Mutex<HashMap<String, String>>,
    }

    struct FakeRunner {
        root: PathBuf,
        state: Arc<FakeState>,
    }

    impl FakeRunner {
        fn rel(&self, stack_dir: &Path) -> String {
            paths::rel_slash(&self.root, stack_dir)
        }

        fn record(&self, op: &str, stack_dir: &Path) -> Result<()> {
            let rel = self.rel(stack_dir);
            if let Some(message) = self.state.failures.lock().unwrap().get(&rel) {
                bail!("{message}");
            }
            self.state
                .records
                .lock()
                .unwrap()
                .push(format!("{op}:{rel}"));
            Ok(())
        }
    }

    impl StackRunner for FakeRunner {
        fn init_only(&self, stack_dir: &Path, _upgrade: bool) -> Result<()> {
            self.record("init", stack_dir)
        }

        fn plan_with_output(&self, stack_dir: &Path, plan_path: &Path) -> Result<()> {
            self.record("plan", stack_dir)?;
            if let Some(dir) = plan_path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(plan_path, b"plan")?;
            Ok(())
        }

        fn apply(&self, stack_dir: &Path) -> Result<()> {
            self.record("apply", stack_dir)
        }

        fn destroy(&self, stack_dir: &Path) -> Result<()> {
            self.record("destroy", stack_dir)
        }

        fn var_files_for(&self, _stack_dir: &Path) -> Vec<PathBuf> {
            Vec::new()
        }
    }

    fn fake_factory(root: &Path, state: Arc<FakeState>) -> RunnerFactory {
        let root = root.to_path_buf();
        Arc::new(move |_cancel, _opts| {
            Ok(Box::new(FakeRunner {
                root: root.clone(),
                state: state.clone(),
            }) as Box<dyn StackRunner>)
        })
    }

    fn options(root: &Path) -> Options {
        Options {
            root_dir: root.to_path_buf(),
            environment: "dev".to_string(),
            account_id: "123456789012".to_string(),
            region: "eu-west-2".to_string(),
            terraform_path: PathBuf::from("/usr/local/bin/terraform"),
            parallelism: 2,
            use_cache: false,
            ..Options::default()
        }
    }

    fn stack(path: PathBuf, dependencies: Vec<PathBuf>) -> Stack {
        Stack {
            path,
            dependencies,
            skip_destroy: false,
        }
    }

    #[test]
    fn test_run_all_apply_respects_dependencies() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        let c = root.path().join("c");
        for dir in [&a, &b, &c] {
            fs::create_dir_all(dir).unwrap();
        }

        let mut graph = StackGraph::new();
        graph.insert(a.clone(), stack(a.clone(), vec![]));
        graph.insert(b.clone(), stack(b.clone(), vec![a.clone()]));
        graph.insert(c.clone(), stack(c.clone(), vec![b.clone()]));

        let state = Arc::new(FakeState::default());
        let factory = fake_factory(root.path(), state.clone());

        let summary =
            run_all_with(&graph, options(root.path()), Operation::Apply, factory).unwrap();
        assert_eq!(summary.executed, 3);
        assert!(summary.is_success());

        let records = state.records.lock().unwrap().clone();
        let index: HashMap<_, _> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.clone(), i))
            .collect();
        assert!(index["apply:a"] < index["apply:b"]);
        assert!(index["apply:b"] < index["apply:c"]);
    }

    #[test]
    fn test_run_all_stops_on_error() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        let c = root.path().join("c");
        for dir in [&a, &b, &c] {
            fs::create_dir_all(dir).unwrap();
        }

        let mut graph = StackGraph::new();
        graph.insert(a.clone(), stack(a.clone(), vec![]));
        graph.insert(b.clone(), stack(b.clone(), vec![a.clone()]));
        graph.insert(c.clone(), stack(c.clone(), vec![b.clone()]));

        let state = Arc::new(FakeState::default());
        state
            .failures
            .lock()
            .unwrap()
            .insert("b".to_string(), "boom".to_string());
        let factory = fake_factory(root.path(), state.clone());

        let summary =
            run_all_with(&graph, options(root.path()), Operation::Apply, factory).unwrap();
        assert!(!summary.is_success());
        assert!(summary.failed.contains_key("b"));
        assert_eq!(summary.executed, 1);

        // The failing layer stops the run before c is scheduled.
        let records = state.records.lock().unwrap().clone();
        assert!(!records.iter().any(|r| r == "apply:c"));
    }

    #[test]
    fn test_destroy_all_honors_skip_flag() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        for dir in [&a, &b] {
            fs::create_dir_all(dir).unwrap();
        }

        let mut graph = StackGraph::new();
        graph.insert(a.clone(), stack(a.clone(), vec![]));
        graph.insert(
            b.clone(),
            Stack {
                path: b.clone(),
                dependencies: vec![],
                skip_destroy: true,
            },
        );

        let state = Arc::new(FakeState::default());
        let factory = fake_factory(root.path(), state.clone());

        let summary =
            run_all_with(&graph, options(root.path()), Operation::Destroy, factory).unwrap();
        assert_eq!(summary.executed, 1);
        assert_eq!(summary.skipped, 1);

        let records = state.records.lock().unwrap().clone();
        assert_eq!(records, vec!["destroy:a".to_string()]);
    }

    #[test]
    fn test_plan_all_composes_dependency_fingerprints() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        for dir in [&a, &b] {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(a.join("main.tf"), "terraform {}").unwrap();
        fs::write(b.join("main.tf"), "terraform {}").unwrap();

        let mut graph = StackGraph::new();
        graph.insert(a.clone(), stack(a.clone(), vec![]));
        graph.insert(b.clone(), stack(b.clone(), vec![a.clone()]));

        let state = Arc::new(FakeState::default());
        let factory = fake_factory(root.path(), state.clone());

        let mut opts = options(root.path());
        opts.use_cache = true;

        let summary =
            run_all_with(&graph, opts.clone(), Operation::Plan, factory.clone()).unwrap();
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.cached, 0);

        // Unchanged inputs: both stacks come from the cache.
        let summary = run_all_with(&graph, opts.clone(), Operation::Plan, factory.clone()).unwrap();
        assert_eq!(summary.cached, 2);
        assert_eq!(summary.executed, 0);

        // Touching the dependency invalidates the dependent as well.
        fs::write(a.join("main.tf"), "terraform {} # changed").unwrap();
        let summary = run_all_with(&graph, opts, Operation::Plan, factory).unwrap();
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.cached, 0);
    }

    #[test]
    fn test_plan_stack_uses_cache() {
        let root = TempDir::new().unwrap();
        let stack_dir = root.path().join("stack");
        fs::create_dir_all(&stack_dir).unwrap();
        fs::write(stack_dir.join("main.tf"), "terraform {}").unwrap();

        let target = stack(stack_dir.clone(), vec![]);
        let state = Arc::new(FakeState::default());
        let factory = fake_factory(root.path(), state.clone());

        let mut opts = options(root.path());
        opts.use_cache = true;

        let summary = plan::plan_stack_with(&target, opts.clone(), factory.clone()).unwrap();
        assert_eq!(summary.executed, 1);
        assert_eq!(summary.cached, 0);
        assert!(state.records.lock().unwrap().contains(&"plan:stack".to_string()));

        let (plan_path, hash_path) = cache::plan_files(root.path(), "dev", "stack");
        assert!(plan_path.is_file());
        assert!(hash_path.is_file());

        state.records.lock().unwrap().clear();
        let summary = plan::plan_stack_with(&target, opts.clone(), factory.clone()).unwrap();
        assert_eq!(summary.cached, 1);
        assert_eq!(summary.executed, 0);
        assert!(state.records.lock().unwrap().is_empty());

        // Touching the stack invalidates the entry.
        fs::write(stack_dir.join("main.tf"), "terraform {} # touched").unwrap();
        let summary = plan::plan_stack_with(&target, opts, factory).unwrap();
        assert_eq!(summary.executed, 1);
        assert_eq!(summary.cached, 0);
    }

    #[test]
    fn test_forced_stack_bypasses_cache() {
        let root = TempDir::new().unwrap();
        let stack_dir = root.path().join("stack");
        fs::create_dir_all(&stack_dir).unwrap();
        fs::write(stack_dir.join("main.tf"), "terraform {}").unwrap();

        let target = stack(stack_dir.clone(), vec![]);
        let state = Arc::new(FakeState::default());
        let factory = fake_factory(root.path(), state.clone());

        let mut opts = options(root.path());
        opts.use_cache = true;

        plan::plan_stack_with(&target, opts.clone(), factory.clone()).unwrap();

        opts.force_stacks.insert("stack".to_string());
        let summary = plan::plan_stack_with(&target, opts, factory).unwrap();
        assert_eq!(summary.executed, 1);
        assert_eq!(summary.cached, 0);
    }
}
