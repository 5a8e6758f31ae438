//! Terraform binary resolution.
//!
//! Scans stack source for `required_version` constraints, consults the
//! version lock file and the system binary, and decides whether to reuse,
//! prefer the system install, or install from the public releases index.
//! The decision is persisted back to the lock file atomically.

pub mod constraint;
pub mod detector;
pub mod installer;
pub mod lockfile;
pub mod system;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use semver::Version;
use thiserror::Error;

use crate::ui;

use constraint::is_version_compatible;
use lockfile::{read_lock_file, write_lock_file, LockFile, LOCK_FILE_NAME};
use system::{detect_system_terraform, SystemDetectError};

/// Typed resolver failures callers are expected to distinguish.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("conflicting resolver flags: {0}")]
    ConflictingFlags(String),

    #[error("pinned Terraform version {0} does not satisfy stack constraints")]
    PinIncompatible(Version),

    #[error("no Terraform versions satisfy constraints: {0}")]
    NoCompatibleVersion(String),

    #[error("Terraform installation required but disabled: {0}")]
    InstallDisabled(String),
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub root_dir: PathBuf,
    pub stack_paths: Vec<PathBuf>,
    /// Defaults to `<root>/.terraform-version.lock.json`.
    pub lock_file_path: Option<PathBuf>,
    pub force_install: bool,
    pub use_system_only: bool,
    pub disable_install: bool,
    pub pinned_version: Option<Version>,
}

#[derive(Debug, Clone)]
pub struct ResolveResult {
    pub binary_path: PathBuf,
    pub version: Version,
    pub used_system_binary: bool,
    pub constraints: BTreeMap<String, String>,
    pub lock_file_path: PathBuf,
}

pub fn resolve_terraform_binary(opts: ResolveOptions) -> Result<ResolveResult> {
    if opts.stack_paths.is_empty() {
        bail!("no stack paths supplied");
    }
    if opts.force_install && opts.use_system_only {
        return Err(ResolveError::ConflictingFlags(
            "TFWRAPPER_FORCE_INSTALL and TFWRAPPER_USE_SYSTEM_TERRAFORM cannot both be set".into(),
        )
        .into());
    }
    if opts.force_install && opts.disable_install {
        return Err(ResolveError::ConflictingFlags(
            "TFWRAPPER_FORCE_INSTALL conflicts with TFWRAPPER_DISABLE_INSTALL".into(),
        )
        .into());
    }
    // disable-install alongside use-system is fine: nothing will install.

    let lock_path = opts
        .lock_file_path
        .clone()
        .unwrap_or_else(|| opts.root_dir.join(LOCK_FILE_NAME));

    let constraints = detector::detect_constraints(&opts.root_dir, &opts.stack_paths)?;
    println!("Detected Terraform version requirements:");
    for (stack, constraint) in &constraints {
        println!("- {stack}: {constraint}");
    }

    let stack_names: Vec<String> = constraints.keys().cloned().collect();
    let constraint_strings: Vec<String> = constraints.values().cloned().collect();

    let lock = match read_lock_file(&lock_path) {
        Ok(lock) => lock,
        Err(err) => {
            ui::warn(&format!("failed to read lock file: {err:#}"));
            None
        }
    };

    let mut lock_version = lock.as_ref().and_then(|lock| {
        if lock.version.is_empty() {
            return None;
        }
        match constraint::parse_lenient_version(&lock.version) {
            Ok(version) => Some(version),
            Err(err) => {
                ui::warn(&format!(
                    "ignoring invalid version {:?} in lock file: {err:#}",
                    lock.version
                ));
                None
            }
        }
    });
    let lock_used_system = lock.as_ref().map(|l| l.used_system_binary).unwrap_or(false);

    if let Some(pinned) = &opts.pinned_version {
        if !is_version_compatible(pinned, &constraint_strings)? {
            return Err(ResolveError::PinIncompatible(pinned.clone()).into());
        }
        // The pin replaces the lock's version for every downstream decision.
        lock_version = Some(pinned.clone());
    }

    let system = match detect_system_terraform() {
        Ok(found) => Some(found),
        Err(SystemDetectError::NotFound) => None,
        Err(SystemDetectError::Failed(err)) => {
            ui::warn(&format!("failed to detect system Terraform version: {err:#}"));
            None
        }
    };

    if opts.use_system_only {
        let Some((system_version, system_path)) = system else {
            bail!("system terraform binary required but not found");
        };
        if let Some(pinned) = &opts.pinned_version {
            if &system_version != pinned {
                ui::warn(&format!(
                    "system terraform version {system_version} differs from pinned {pinned}"
                ));
            }
        }
        // Operator override: an unsatisfied constraint is only a warning.
        if is_version_compatible(&system_version, &constraint_strings)? {
            println!("System Terraform v{system_version} detected — satisfies all constraints.");
        } else {
            ui::warn(&format!(
                "system terraform {system_version} does not satisfy all constraints"
            ));
        }
        return finalize(
            &lock_path,
            &stack_names,
            constraints,
            system_version,
            system_path,
            true,
        );
    }

    // Reuse the lock file when not forcing a fresh install.
    if !opts.force_install {
        if let Some(locked) = lock_version.clone() {
            if is_version_compatible(&locked, &constraint_strings)? {
                if lock_used_system {
                    if let Some((system_version, system_path)) = &system {
                        if system_version == &locked {
                            println!("Reusing system Terraform v{locked} from previous lock.");
                            return finalize(
                                &lock_path,
                                &stack_names,
                                constraints,
                                locked,
                                system_path.clone(),
                                true,
                            );
                        }
                    }
                }

                let cached = installer::cached_binary_path(&locked)?;
                if cached.is_file() {
                    if lock_used_system {
                        println!(
                            "System Terraform no longer matches lock; using cached install for v{locked}."
                        );
                    } else {
                        println!("Reusing cached Terraform installation v{locked}.");
                    }
                    return finalize(&lock_path, &stack_names, constraints, locked, cached, false);
                }

                if opts.disable_install {
                    return Err(ResolveError::InstallDisabled(format!(
                        "locked Terraform {locked} not available locally"
                    ))
                    .into());
                }
                match installer::ensure_version_installed(&locked) {
                    Ok(path) => {
                        println!("Reusing locked Terraform v{locked} via fresh install.");
                        return finalize(&lock_path, &stack_names, constraints, locked, path, false);
                    }
                    Err(err) => {
                        ui::warn(&format!("failed to reuse locked Terraform {locked}: {err:#}"));
                    }
                }
            }
        }
    }

    if opts.force_install {
        let to_install =
            installer::resolve_install_version(&constraint_strings, lock_version.as_ref())?;
        println!("Installing Terraform v{to_install} (forced install).");
        let path = installer::ensure_version_installed(&to_install)?;
        return finalize(&lock_path, &stack_names, constraints, to_install, path, false);
    }

    match &system {
        Some((system_version, system_path)) => {
            if is_version_compatible(system_version, &constraint_strings)? {
                println!(
                    "System Terraform v{system_version} detected — satisfies all constraints."
                );
                return finalize(
                    &lock_path,
                    &stack_names,
                    constraints,
                    system_version.clone(),
                    system_path.clone(),
                    true,
                );
            }
            println!("System Terraform v{system_version} does not satisfy all constraints.");
            if opts.disable_install {
                return Err(ResolveError::InstallDisabled(format!(
                    "system terraform {system_version} incompatible"
                ))
                .into());
            }
        }
        None => {
            println!("System Terraform binary not found.");
            if opts.disable_install {
                return Err(ResolveError::InstallDisabled(
                    "terraform binary not found".to_string(),
                )
                .into());
            }
        }
    }

    let preferred = opts.pinned_version.clone().or(lock_version);
    let to_install = installer::resolve_install_version(&constraint_strings, preferred.as_ref())?;
    if system.is_some() {
        println!("Installing Terraform v{to_install} (latest compatible).");
    } else {
        println!("Installing Terraform v{to_install}...");
    }
    let path = installer::ensure_version_installed(&to_install)?;
    finalize(&lock_path, &stack_names, constraints, to_install, path, false)
}

fn finalize(
    lock_path: &std::path::Path,
    stack_names: &[String],
    constraints: BTreeMap<String, String>,
    version: Version,
    binary_path: PathBuf,
    used_system: bool,
) -> Result<ResolveResult> {
    if binary_path.as_os_str().is_empty() {
        bail!("binary path cannot be empty");
    }

    let lock = LockFile {
        version: version.to_string(),
        used_system_binary: used_system,
        binary_path: Some(binary_path.to_string_lossy().to_string()),
        detected_from: stack_names.to_vec(),
    };
    if let Err(err) = write_lock_file(lock_path, lock) {
        ui::warn(&format!("failed to write lock file: {err:#}"));
    }

    if used_system {
        println!("Using system binary: {}", binary_path.display());
    } else {
        println!("Using installed binary: {}", binary_path.display());
    }
    println!("Locked version: {version}");

    Ok(ResolveResult {
        binary_path,
        version,
        used_system_binary: used_system,
        constraints,
        lock_file_path: lock_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_flags_are_rejected() {
        let opts = ResolveOptions {
            root_dir: PathBuf::from("."),
            stack_paths: vec![PathBuf::from(".")],
            force_install: true,
            use_system_only: true,
            ..ResolveOptions::default()
        };
        let err = resolve_terraform_binary(opts).unwrap_err();
        assert!(err.downcast_ref::<ResolveError>().is_some());

        let opts = ResolveOptions {
            root_dir: PathBuf::from("."),
            stack_paths: vec![PathBuf::from(".")],
            force_install: true,
            disable_install: true,
            ..ResolveOptions::default()
        };
        let err = resolve_terraform_binary(opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::ConflictingFlags(_))
        ));
    }

    #[test]
    fn test_empty_stack_list_is_rejected() {
        let err = resolve_terraform_binary(ResolveOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no stack paths"));
    }

    #[test]
    fn test_pin_rejected_when_incompatible() {
        use std::fs;
        let root = tempfile::TempDir::new().unwrap();
        let stack = root.path().join("a");
        fs::create_dir_all(&stack).unwrap();
        fs::write(
            stack.join("versions.tf"),
            "terraform {\n  required_version = \">= 1.6.0, < 1.9.0\"\n}\n",
        )
        .unwrap();

        let opts = ResolveOptions {
            root_dir: root.path().to_path_buf(),
            stack_paths: vec![stack],
            pinned_version: Some(Version::new(1, 9, 1)),
            ..ResolveOptions::default()
        };
        let err = resolve_terraform_binary(opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::PinIncompatible(v)) if v == &Version::new(1, 9, 1)
        ));
    }
}
