//! Path helpers shared across the graph, executor and superplan.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve a path against the current directory and normalize it lexically.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("determine current directory")?
            .join(path)
    };
    Ok(clean(&joined))
}

/// Lexically normalize a path: collapse `.` and resolve `..` where possible.
pub fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() {
                    cleaned.push(Component::ParentDir);
                }
            }
            other => cleaned.push(other),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Express `path` relative to `root` with forward slashes, falling back to
/// the full path when it does not live under the root.
pub fn rel_slash(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => slashify(rel),
        Err(_) => slashify(path),
    }
}

/// Render a path with forward slashes regardless of platform.
pub fn slashify(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Check whether a path points at an existing regular file.
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_dots() {
        assert_eq!(clean(Path::new("/a/./b")), PathBuf::from("/a/b"));
        assert_eq!(clean(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("./x")), PathBuf::from("x"));
        assert_eq!(clean(Path::new(".")), PathBuf::from("."));
    }

    #[test]
    fn test_rel_slash_under_root() {
        let root = Path::new("/repo");
        assert_eq!(rel_slash(root, Path::new("/repo/network/vpc")), "network/vpc");
        assert_eq!(rel_slash(root, Path::new("/repo")), ".");
    }

    #[test]
    fn test_rel_slash_outside_root_falls_back() {
        let root = Path::new("/repo");
        assert_eq!(rel_slash(root, Path::new("/elsewhere/x")), "/elsewhere/x");
    }
}
