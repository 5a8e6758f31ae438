//! Environment-wide mutual exclusion over an object store.
//!
//! The lock is a single object at `locks/<env>/superplan-lock.json`;
//! existence means held. Acquisition is a conditional create, so the
//! store's create-if-absent semantics make the protocol safe across
//! concurrent writers without any server-side coordination.

use std::collections::BTreeMap;
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use objstore::ObjectStore;

use crate::ui;

/// Exit status surfaced to the CLI when an environment is locked.
pub const LOCKED_EXIT_CODE: i32 = 65;

const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_POLL: Duration = Duration::from_secs(15);

/// The environment is currently locked by another actor.
#[derive(Debug, Error)]
#[error("environment {env:?} is locked by {owner} since {timestamp}")]
pub struct LockedError {
    pub env: String,
    pub owner: String,
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

impl LockedError {
    pub fn exit_code(&self) -> i32 {
        LOCKED_EXIT_CODE
    }
}

/// An environment-level lock held in a shared object store.
pub struct OrchestrationLock {
    env: String,
    owner: String,
    command: String,
    ttl: Duration,
    poll_interval: Duration,
    store: Box<dyn ObjectStore>,
    locked: bool,
}

impl OrchestrationLock {
    pub fn new(store: Box<dyn ObjectStore>, env: &str, command: &str) -> Result<Self> {
        if env.is_empty() {
            bail!("lock environment must not be empty");
        }
        Ok(Self {
            env: env.to_string(),
            owner: default_owner(),
            command: command.to_string(),
            ttl: DEFAULT_TTL,
            poll_interval: DEFAULT_POLL,
            store,
            locked: false,
        })
    }

    /// Override the default owner identity (CI job, run id, host-pid).
    pub fn with_owner(mut self, owner: &str) -> Self {
        if !owner.is_empty() {
            self.owner = owner.to_string();
        }
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        if !ttl.is_zero() {
            self.ttl = ttl;
        }
        self
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        if !poll.is_zero() {
            self.poll_interval = poll;
        }
        self
    }

    fn key(&self) -> String {
        format!("locks/{}/superplan-lock.json", self.env)
    }

    /// Try to take the lock. With `wait` the call polls until the holder
    /// releases; without it a held lock is a [`LockedError`]. Locks older
    /// than the TTL are treated as stale and evicted.
    pub fn acquire(&mut self, wait: bool) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut metadata = BTreeMap::new();
        metadata.insert("owner".to_string(), self.owner.clone());
        metadata.insert("timestamp".to_string(), timestamp.clone());
        if !self.command.is_empty() {
            metadata.insert("command".to_string(), self.command.clone());
        }

        let mut payload = BTreeMap::new();
        payload.insert("owner", self.owner.clone());
        payload.insert("timestamp", timestamp);
        payload.insert("env", self.env.clone());
        if !self.command.is_empty() {
            payload.insert("command", self.command.clone());
        }
        let body = serde_json::to_vec(&payload).context("marshal lock payload")?;

        loop {
            match self.store.put_if_absent(&self.key(), &body, &metadata) {
                Ok(()) => {
                    ui::success(&format!("Acquired orchestration lock for {}", self.env));
                    self.locked = true;
                    return Ok(());
                }
                Err(err) if err.is_already_exists() => {}
                Err(err) => {
                    return Err(err).context("failed to acquire orchestration lock");
                }
            }

            let existing = self
                .store
                .head(&self.key())
                .context("lock exists but cannot be inspected")?;

            let created_at = existing
                .get("timestamp")
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|ts| ts.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            let age = (Utc::now() - created_at)
                .to_std()
                .unwrap_or(Duration::ZERO);

            if age > self.ttl {
                ui::warn(&format!(
                    "Stale lock detected for {} (age {}s) — releasing",
                    self.env,
                    age.as_secs()
                ));
                self.store
                    .delete(&self.key())
                    .context("evict stale orchestration lock")?;
                continue;
            }

            let owner = existing.get("owner").unwrap_or("unknown").to_string();
            if wait {
                ui::info(&format!(
                    "Waiting for orchestration lock (held by {owner} since {})",
                    created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
                ));
                thread::sleep(self.poll_interval);
                continue;
            }

            return Err(LockedError {
                env: self.env.clone(),
                owner,
                command: existing.get("command").unwrap_or_default().to_string(),
                timestamp: created_at,
            }
            .into());
        }
    }

    /// Delete the lock object when this instance holds it. Idempotent, so
    /// it is safe to call from deferred cleanup on every exit path.
    pub fn release(&mut self) -> Result<()> {
        if !self.locked {
            return Ok(());
        }
        self.store
            .delete(&self.key())
            .context("failed to release orchestration lock")?;
        self.locked = false;
        ui::success(&format!("Released orchestration lock for {}", self.env));
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Owner identity: CI job name, GitHub run id, or `<hostname>-<pid>`.
fn default_owner() -> String {
    if let Ok(name) = std::env::var("CI_JOB_NAME") {
        if !name.is_empty() {
            return name;
        }
    }
    if let Ok(run_id) = std::env::var("GITHUB_RUN_ID") {
        if !run_id.is_empty() {
            return format!("github-run-{run_id}");
        }
    }
    format!("{}-{}", hostname(), process::id())
}

fn hostname() -> String {
    std::process::Command::new("hostname")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown-host".to_string())
}
