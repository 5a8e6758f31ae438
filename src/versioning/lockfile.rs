//! The Terraform version lock file.
//!
//! A JSON document at `<root>/.terraform-version.lock.json` recording which
//! binary a run resolved to and which stacks contributed constraints.
//! Replaced atomically by writing to a temp file and renaming over the
//! original.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const LOCK_FILE_NAME: &str = ".terraform-version.lock.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    pub version: String,
    #[serde(default)]
    pub used_system_binary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_path: Option<String>,
    #[serde(default)]
    pub detected_from: Vec<String>,
}

impl LockFile {
    /// Deduplicate and sort `detected_from`, collapsing `.`/`./` prefixes
    /// and backslashes so entries are stable across platforms.
    pub fn normalize(&mut self) {
        let mut unique: Vec<String> = self
            .detected_from
            .iter()
            .filter_map(|stack| {
                let mut cleaned = stack.replace('\\', "/");
                while let Some(rest) = cleaned.strip_prefix("./") {
                    cleaned = rest.to_string();
                }
                if cleaned == "." {
                    cleaned.clear();
                }
                if cleaned.is_empty() {
                    None
                } else {
                    Some(cleaned)
                }
            })
            .collect();
        unique.sort();
        unique.dedup();
        self.detected_from = unique;
    }
}

/// Read the lock file; `Ok(None)` when it does not exist.
pub fn read_lock_file(path: &Path) -> Result<Option<LockFile>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("read lock file {}", path.display())),
    };

    let mut lock: LockFile = serde_json::from_slice(&data)
        .with_context(|| format!("parse lock file {}", path.display()))?;
    lock.normalize();
    Ok(Some(lock))
}

/// Atomically persist the lock file (marshal, write `<path>.tmp`, rename).
pub fn write_lock_file(path: &Path, mut lock: LockFile) -> Result<()> {
    lock.normalize();
    if lock.version.is_empty() {
        bail!("lock file version cannot be empty");
    }

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create lock file directory {}", dir.display()))?;
        }
    }

    let mut contents = serde_json::to_vec_pretty(&lock).context("marshal lock file")?;
    contents.push(b'\n');

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("write temp lock file {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("persist lock file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let lock = LockFile {
            version: "1.7.5".to_string(),
            used_system_binary: true,
            binary_path: Some("/usr/local/bin/terraform".to_string()),
            detected_from: vec![
                "./network/vpc".to_string(),
                "app".to_string(),
                "network/vpc".to_string(),
                ".".to_string(),
            ],
        };
        write_lock_file(&path, lock).unwrap();

        let read = read_lock_file(&path).unwrap().unwrap();
        assert_eq!(read.version, "1.7.5");
        assert!(read.used_system_binary);
        assert_eq!(
            read.detected_from,
            vec!["app".to_string(), "network/vpc".to_string()]
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_read_missing_lock_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        assert!(read_lock_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_read_rejects_invalid_lock_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        fs::write(&path, "{broken").unwrap();
        assert!(read_lock_file(&path).is_err());
    }

    #[test]
    fn test_write_requires_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        let err = write_lock_file(&path, LockFile::default()).unwrap_err();
        assert!(err.to_string().contains("version cannot be empty"));
    }
}
