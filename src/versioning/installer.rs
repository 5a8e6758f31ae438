//! Querying the public releases index and installing binaries into the
//! local cache at `~/.terraform-wrapper/versions/<version>/`.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;

use super::constraint::{self, Constraint};
use super::ResolveError;

const RELEASES_INDEX: &str = "https://releases.hashicorp.com/terraform/index.json";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ReleasesIndex {
    #[serde(default)]
    versions: std::collections::BTreeMap<String, ReleaseEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ReleaseEntry {
    #[serde(default)]
    version: String,
}

/// Pick the version to install: the preferred one when it satisfies every
/// constraint, otherwise the newest non-prerelease release that does.
pub fn resolve_install_version(
    constraint_strings: &[String],
    preferred: Option<&Version>,
) -> Result<Version> {
    let constraints = merged_constraints(constraint_strings)?;

    if let Some(preferred) = preferred {
        if constraints.iter().all(|c| c.check(preferred)) {
            return Ok(preferred.clone());
        }
    }

    let available = fetch_available_versions()?;
    pick_install_version(&available, &constraints)
        .ok_or_else(|| ResolveError::NoCompatibleVersion(constraint_strings.join("; ")).into())
}

/// Pure selection over a known release list; newest non-prerelease wins.
pub fn pick_install_version(available: &[Version], constraints: &[Constraint]) -> Option<Version> {
    let mut sorted = available.to_vec();
    sorted.sort();
    sorted
        .into_iter()
        .rev()
        .find(|v| v.pre.is_empty() && v.build.is_empty() && constraints.iter().all(|c| c.check(v)))
}

fn merged_constraints(constraint_strings: &[String]) -> Result<Vec<Constraint>> {
    let mut seen = std::collections::BTreeSet::new();
    let mut merged = Vec::new();
    for raw in constraint_strings {
        let raw = raw.trim();
        if raw.is_empty() || !seen.insert(raw.to_string()) {
            continue;
        }
        merged.extend(constraint::parse_constraint_set(raw)?);
    }
    Ok(merged)
}

/// Fetch and parse the public releases index.
pub fn fetch_available_versions() -> Result<Vec<Version>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("build http client")?;

    let response = client
        .get(RELEASES_INDEX)
        .send()
        .context("fetch terraform releases")?;
    if !response.status().is_success() {
        bail!("fetch terraform releases: unexpected status {}", response.status());
    }

    let index: ReleasesIndex = response.json().context("parse terraform releases index")?;
    if index.versions.is_empty() {
        bail!("terraform releases index empty");
    }

    let mut versions = Vec::new();
    for (key, entry) in &index.versions {
        let raw = if entry.version.trim().is_empty() {
            key.trim()
        } else {
            entry.version.trim()
        };
        if raw.is_empty() {
            continue;
        }
        if let Ok(version) = constraint::parse_lenient_version(raw) {
            versions.push(version);
        }
    }

    if versions.is_empty() {
        bail!("no parseable terraform versions in index");
    }
    Ok(versions)
}

/// Ensure `version` is present in the local cache, downloading and
/// unpacking the release archive when it is not. Returns the binary path.
pub fn ensure_version_installed(version: &Version) -> Result<PathBuf> {
    let binary_path = cached_binary_path(version)?;
    if binary_path.is_file() {
        return Ok(binary_path);
    }

    let install_dir = binary_path
        .parent()
        .context("install directory")?
        .to_path_buf();
    fs::create_dir_all(&install_dir)
        .with_context(|| format!("create install directory {}", install_dir.display()))?;

    let url = release_archive_url(version)?;
    log::info!("downloading {url}");

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .context("build http client")?;
    let response = client
        .get(&url)
        .send()
        .with_context(|| format!("download {url}"))?;
    if !response.status().is_success() {
        bail!("download {url}: unexpected status {}", response.status());
    }
    let archive = response.bytes().with_context(|| format!("read {url}"))?;

    extract_terraform_binary(&archive, &binary_path)
        .with_context(|| format!("install terraform {version}"))?;
    Ok(binary_path)
}

fn extract_terraform_binary(archive: &[u8], binary_path: &Path) -> Result<()> {
    let reader = std::io::Cursor::new(archive);
    let mut zip = zip::ZipArchive::new(reader).context("open release archive")?;
    let mut file = zip
        .by_name(binary_name())
        .context("terraform binary missing from archive")?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents).context("read archive entry")?;

    let tmp = binary_path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    set_executable(&tmp)?;
    fs::rename(&tmp, binary_path).with_context(|| format!("persist {}", binary_path.display()))
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn release_archive_url(version: &Version) -> Result<String> {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "arm" => "arm",
        other => bail!("unsupported architecture {other}"),
    };
    Ok(format!(
        "https://releases.hashicorp.com/terraform/{version}/terraform_{version}_{os}_{arch}.zip"
    ))
}

fn binary_name() -> &'static str {
    if cfg!(windows) {
        "terraform.exe"
    } else {
        "terraform"
    }
}

/// Root of the local install cache: `~/.terraform-wrapper/versions`.
pub fn cache_root() -> Result<PathBuf> {
    let home = dirs::home_dir().context("determine home directory")?;
    Ok(home.join(".terraform-wrapper").join("versions"))
}

/// Expected binary path for a cached install of `version`.
pub fn cached_binary_path(version: &Version) -> Result<PathBuf> {
    Ok(cache_root()?.join(version.to_string()).join(binary_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(raw: &[&str]) -> Vec<Version> {
        raw.iter()
            .map(|v| constraint::parse_lenient_version(v).unwrap())
            .collect()
    }

    #[test]
    fn test_pick_install_version_selects_latest_compatible() {
        let available = versions(&["1.5.7", "1.8.2", "1.9.0", "1.7.5", "1.9.1-beta1"]);
        let constraints = constraint::parse_constraint_set(">= 1.6.0, < 1.9.0").unwrap();

        let picked = pick_install_version(&available, &constraints).unwrap();
        assert_eq!(picked, Version::new(1, 8, 2));
    }

    #[test]
    fn test_pick_install_version_skips_prereleases() {
        let available = versions(&["1.9.0-beta1", "1.9.0-rc1"]);
        let constraints = constraint::parse_constraint_set(">= 1.0.0").unwrap();
        assert!(pick_install_version(&available, &constraints).is_none());
    }

    #[test]
    fn test_resolve_install_version_prefers_preferred() {
        // A compatible preferred version resolves without touching the index.
        let preferred = Version::new(1, 7, 5);
        let resolved = resolve_install_version(
            &[">= 1.6.0, < 1.9.0".to_string()],
            Some(&preferred),
        )
        .unwrap();
        assert_eq!(resolved, preferred);
    }

    #[test]
    fn test_release_archive_url_shape() {
        let url = release_archive_url(&Version::new(1, 7, 5)).unwrap();
        assert!(url.starts_with("https://releases.hashicorp.com/terraform/1.7.5/terraform_1.7.5_"));
        assert!(url.ends_with(".zip"));
    }

    #[test]
    fn test_cached_binary_path_layout() {
        let path = cached_binary_path(&Version::new(1, 7, 5)).unwrap();
        let rendered = path.to_string_lossy();
        assert!(rendered.contains(".terraform-wrapper"));
        assert!(rendered.contains("versions"));
        assert!(rendered.contains("1.7.5"));
    }
}
