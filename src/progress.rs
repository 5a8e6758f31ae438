//! Thread-safe progress sink for stack operations.
//!
//! Terraform child processes inherit stdout, so the sink prints plain tagged
//! lines rather than redrawing progress bars. All writes go through one
//! mutex; ordering across stacks is not guaranteed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use colored::Colorize;

/// Per-stack progress state. Monotonic within a command, except for the
/// explicit waiting → running transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    Waiting,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Default)]
struct Inner {
    states: HashMap<String, State>,
    started: HashMap<String, Instant>,
}

/// Event log over a state per stack.
#[derive(Default)]
pub struct Manager {
    inner: Mutex<Inner>,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, stack: &str) {
        let mut inner = self.inner.lock().expect("progress mutex poisoned");
        inner.states.insert(stack.to_string(), State::Pending);
    }

    pub fn waiting(&self, stack: &str, reason: &str) {
        let mut inner = self.inner.lock().expect("progress mutex poisoned");
        inner.states.insert(stack.to_string(), State::Waiting);
        println!("{} {} ({})", "[wait]".yellow(), stack, reason);
    }

    pub fn start(&self, stack: &str) {
        let mut inner = self.inner.lock().expect("progress mutex poisoned");
        inner.states.insert(stack.to_string(), State::Running);
        inner.started.insert(stack.to_string(), Instant::now());
        println!("{} {}", "[run]".cyan(), stack);
    }

    pub fn skip(&self, stack: &str, reason: &str) {
        let mut inner = self.inner.lock().expect("progress mutex poisoned");
        inner.states.insert(stack.to_string(), State::Skipped);
        println!("{} {} ({})", "[skip]".dimmed(), stack, reason);
    }

    pub fn succeed(&self, stack: &str) {
        let mut inner = self.inner.lock().expect("progress mutex poisoned");
        inner.states.insert(stack.to_string(), State::Succeeded);
        let elapsed = inner
            .started
            .get(stack)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        println!("{} {} ({:.1}s)", "[done]".green(), stack, elapsed);
    }

    pub fn fail(&self, stack: &str, err: &str) {
        let mut inner = self.inner.lock().expect("progress mutex poisoned");
        inner.states.insert(stack.to_string(), State::Failed);
        let elapsed = inner
            .started
            .get(stack)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        println!("{} {} ({:.1}s): {}", "[fail]".red(), stack, elapsed, err);
    }

    /// Current state of a stack, if registered.
    pub fn state(&self, stack: &str) -> Option<State> {
        let inner = self.inner.lock().expect("progress mutex poisoned");
        inner.states.get(stack).copied()
    }
}
