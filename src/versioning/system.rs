//! Detection of a terraform binary already on `PATH`.

use std::path::PathBuf;
use std::process::Command;

use anyhow::Context;
use regex::Regex;
use semver::Version;
use thiserror::Error;

use super::constraint;

/// Outcome of probing `PATH`: the not-found case is a sentinel distinct
/// from an execution failure.
#[derive(Debug, Error)]
pub enum SystemDetectError {
    #[error("terraform binary not found in PATH")]
    NotFound,
    #[error("{0:#}")]
    Failed(#[from] anyhow::Error),
}

/// Locate `terraform` on `PATH`, run `terraform -version`, and parse the
/// reported version from the first matching output line.
pub fn detect_system_terraform() -> Result<(Version, PathBuf), SystemDetectError> {
    let binary = find_in_path("terraform").ok_or(SystemDetectError::NotFound)?;

    let output = Command::new(&binary)
        .arg("-version")
        .output()
        .with_context(|| format!("execute {} -version", binary.display()))?;
    if !output.status.success() {
        return Err(SystemDetectError::Failed(anyhow::anyhow!(
            "terraform -version failed (exit status {}): {}",
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let version = parse_terraform_version(&String::from_utf8_lossy(&output.stdout))?;
    Ok((version, binary))
}

/// Parse the `Terraform v<version>` banner line.
pub fn parse_terraform_version(output: &str) -> Result<Version, SystemDetectError> {
    let pattern = Regex::new(r"^Terraform\s+v?([0-9A-Za-z.\-+]+)").expect("static regex");

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(captures) = pattern.captures(line) {
            let raw = captures[1].trim_start_matches('v');
            let version = constraint::parse_lenient_version(raw)
                .with_context(|| format!("parse terraform version {raw:?}"))?;
            return Ok(version);
        }
    }

    Err(SystemDetectError::Failed(anyhow::anyhow!(
        "failed to detect terraform version from output: {output:?}"
    )))
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}
