//! Registry download of configuration packages.
//!
//! The latest published version is fetched from the registry's abbreviated
//! metadata, its tarball is checked against the `integrity` digest and
//! unpacked into a temporary directory that lives as long as the cache.
use std::collections::HashMap;
use std::io::Read as _;
use std::path::{Component, Path, PathBuf};

use base64::Engine as _;
use serde::Deserialize;
use sha2::{Digest as _, Sha512};

use crate::error::ConfigError;
use crate::logging::Log;

/// Registry used when `npm_config_registry` is unset.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Upper bound on a downloaded tarball.
const MAX_TARBALL_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    dist: Dist,
}

/// Location and digest of a published tarball.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct Dist {
    tarball: String,
    #[serde(default)]
    integrity: Option<String>,
}

/// Downloads packages once per run and keeps their extracted trees alive.
#[derive(Debug)]
pub struct PackageCache {
    registry: String,
    agent: ureq::Agent,
    extracted: HashMap<String, tempfile::TempDir>,
}

impl Default for PackageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageCache {
    /// Create a cache using the registry named by `npm_config_registry`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(&registry_from_env())
    }

    /// Create a cache against an explicit registry URL.
    #[must_use]
    pub fn with_registry(registry: &str) -> Self {
        Self {
            registry: registry.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_defaults(),
            extracted: HashMap::new(),
        }
    }

    /// Return the extracted root of `name`, downloading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Download`] if the metadata or tarball cannot be
    /// fetched, the digest does not match, or extraction fails.
    pub fn fetch(&mut self, name: &str, log: &dyn Log) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = self.extracted.get(name) {
            log.debug(&format!("package {name} already downloaded"));
            return Ok(dir.path().to_path_buf());
        }

        let fail = |reason: String| ConfigError::Download {
            package: name.to_string(),
            reason,
        };

        let url = metadata_url(&self.registry, name);
        log.debug(&format!("fetching package metadata: {url}"));
        let metadata: Metadata = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.npm.install-v1+json")
            .call()
            .and_then(|mut response| response.body_mut().read_json())
            .map_err(|e| fail(e.to_string()))?;
        let dist = latest_dist(&metadata).map_err(fail)?;

        log.debug(&format!("downloading {}", dist.tarball));
        let bytes = self
            .agent
            .get(&dist.tarball)
            .call()
            .and_then(|mut response| {
                response
                    .body_mut()
                    .with_config()
                    .limit(MAX_TARBALL_BYTES)
                    .read_to_vec()
            })
            .map_err(|e| fail(e.to_string()))?;

        verify_integrity(&bytes, dist.integrity.as_deref()).map_err(fail)?;

        let dir = tempfile::Builder::new()
            .prefix("repo-starter-kit-")
            .tempdir()
            .map_err(|e| fail(e.to_string()))?;
        extract_tarball(&bytes, dir.path()).map_err(|e| fail(e.to_string()))?;

        let root = dir.path().to_path_buf();
        log.info(&format!("Downloaded package {name}"));
        self.extracted.insert(name.to_string(), dir);
        Ok(root)
    }
}

/// Registry URL from `npm_config_registry`, falling back to the public one.
fn registry_from_env() -> String {
    std::env::var("npm_config_registry")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REGISTRY.to_string())
}

/// Metadata URL for `name`; the scope separator is percent-encoded.
fn metadata_url(registry: &str, name: &str) -> String {
    let encoded = name
        .split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("%2f");
    format!("{}/{encoded}", registry.trim_end_matches('/'))
}

fn latest_dist(metadata: &Metadata) -> Result<Dist, String> {
    let latest = metadata
        .dist_tags
        .get("latest")
        .ok_or_else(|| "no 'latest' dist-tag published".to_string())?;
    metadata
        .versions
        .get(latest)
        .map(|entry| entry.dist.clone())
        .ok_or_else(|| format!("version {latest} is missing from the registry metadata"))
}

/// Check `bytes` against the `sha512-<base64>` entry of an SRI string.
///
/// Integrity strings without a sha512 entry are accepted unchecked.
fn verify_integrity(bytes: &[u8], integrity: Option<&str>) -> Result<(), String> {
    let Some(expected) = integrity
        .into_iter()
        .flat_map(str::split_whitespace)
        .find_map(|entry| entry.strip_prefix("sha512-"))
    else {
        return Ok(());
    };

    let actual = base64::engine::general_purpose::STANDARD.encode(Sha512::digest(bytes));
    if actual == expected {
        Ok(())
    } else {
        Err(format!("integrity mismatch (expected sha512-{expected}, got sha512-{actual})"))
    }
}

/// Unpack a gzipped tarball into `dest`, dropping the leading path component.
///
/// Entries whose remaining path is not a plain relative path are ignored.
fn extract_tarball(bytes: &[u8], dest: &Path) -> std::io::Result<()> {
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(bytes));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let stripped: PathBuf = path.components().skip(1).collect();
        if stripped.as_os_str().is_empty()
            || stripped
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            continue;
        }

        let target = dest.join(&stripped);
        if entry.header().entry_type().is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        std::fs::write(&target, contents)?;
    }
    Ok(())
}
