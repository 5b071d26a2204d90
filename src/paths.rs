//! Local path classification and root-confined path resolution.
//!
//! A configuration value is either a local path or an npm package reference.
//! Resource references found inside a configuration file are resolved against
//! the directory holding that file and may not escape it.
use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;

/// Prefix that forces a value to be treated as an npm reference.
pub const NPM_PREFIX: &str = "npm:";

/// Return `true` if `value` names a local file or directory rather than an
/// npm package.
///
/// A value is local when it is absolute, starts with `.` or `~`, or contains
/// a path separator without starting with `@`. Values with the `npm:` prefix
/// are never local.
///
/// # Examples
///
/// ```
/// use repo_starter_kit::paths::is_local_path;
///
/// assert!(is_local_path("./config"));
/// assert!(is_local_path("~/starter"));
/// assert!(is_local_path("conf/labels.yml"));
/// assert!(!is_local_path("demo"));
/// assert!(!is_local_path("@acme/demo"));
/// assert!(!is_local_path("npm:demo/labels.yml"));
/// ```
#[must_use]
pub fn is_local_path(value: &str) -> bool {
    if value.is_empty() || value.starts_with(NPM_PREFIX) {
        return false;
    }
    if Path::new(value).is_absolute() || value.starts_with('.') || value.starts_with('~') {
        return true;
    }
    !value.starts_with('@') && value.contains(['/', '\\'])
}

/// Expand a leading `~` to the current user's home directory.
///
/// Returns the input unchanged when it does not start with `~` or the home
/// directory cannot be determined.
#[must_use]
pub fn expand_tilde(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix('~')
        && (rest.is_empty() || rest.starts_with(['/', '\\']))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest.trim_start_matches(['/', '\\']));
    }
    PathBuf::from(value)
}

/// Make `value` absolute against the working directory after `~` expansion.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the working directory cannot be determined.
pub fn absolutize(value: &str) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(value);
    let absolute = std::path::absolute(&expanded).map_err(|source| ConfigError::Io {
        path: expanded.clone(),
        source,
    })?;
    Ok(dunce::simplified(&normalize(&absolute)).to_path_buf())
}

/// Lexically normalise a path: drop `.` components and fold `..` into the
/// preceding component. The filesystem is not consulted.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join `relative` onto `root`, failing if the result escapes `root`.
///
/// # Errors
///
/// Returns [`ConfigError::OutsideRoot`] when the joined path is not inside
/// `root` after normalisation.
pub fn join_within_root(root: &Path, relative: &str) -> Result<PathBuf, ConfigError> {
    let root = normalize(root);
    let joined = normalize(&root.join(relative));
    if joined.starts_with(&root) {
        Ok(joined)
    } else {
        Err(ConfigError::OutsideRoot {
            path: relative.to_string(),
            root: root.display().to_string(),
        })
    }
}

/// Resolve a local path value.
///
/// Without a `root` the value is classified with [`is_local_path`] and made
/// absolute against the working directory (after `~` expansion). With a
/// `root` every value except an `npm:` reference is local, and it must
/// resolve to a location inside `root`.
///
/// Returns `Ok(None)` when `value` refers to an npm package.
///
/// # Errors
///
/// Returns [`ConfigError::OutsideRoot`] when the value escapes `root`, or
/// [`ConfigError::Io`] when the working directory cannot be determined.
pub fn resolve_local_path(value: &str, root: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let Some(root) = root else {
        if !is_local_path(value) {
            return Ok(None);
        }
        return absolutize(value).map(Some);
    };

    if value.is_empty() || value.starts_with(NPM_PREFIX) {
        return Ok(None);
    }

    let candidate = if value.starts_with('~') {
        expand_tilde(value)
    } else {
        PathBuf::from(value)
    };

    if candidate.is_absolute() {
        let normalized = normalize(&candidate);
        if normalized.starts_with(normalize(root)) {
            return Ok(Some(normalized));
        }
        return Err(ConfigError::OutsideRoot {
            path: value.to_string(),
            root: root.display().to_string(),
        });
    }

    join_within_root(root, value).map(Some)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_path_classification() {
        assert!(is_local_path("."));
        assert!(is_local_path("../starter"));
        assert!(is_local_path("~"));
        assert!(is_local_path("a\\b"));
        assert!(!is_local_path(""));
        assert!(!is_local_path("repo-starter-kit-demo"));
        assert!(!is_local_path("@scope/name/labels.yml"));
    }

    #[test]
    fn join_within_root_accepts_nested_paths() {
        let joined = join_within_root(Path::new("/pkg"), "conf/./labels.yml").unwrap();
        assert_eq!(joined, PathBuf::from("/pkg/conf/labels.yml"));
    }

    #[test]
    fn join_within_root_rejects_escape() {
        let err = join_within_root(Path::new("/pkg/conf"), "../../etc/passwd").unwrap_err();
        assert!(matches!(err, ConfigError::OutsideRoot { .. }));
        assert_eq!(
            err.to_string(),
            "\"../../etc/passwd\" must reference a file in /pkg/conf"
        );
    }

    #[test]
    fn join_within_root_allows_inner_parent_components() {
        let joined = join_within_root(Path::new("/pkg"), "a/../b.yml").unwrap();
        assert_eq!(joined, PathBuf::from("/pkg/b.yml"));
    }

    #[test]
    fn resolve_local_path_returns_none_for_packages() {
        assert!(resolve_local_path("demo", None).unwrap().is_none());
        assert!(
            resolve_local_path("npm:demo/labels.yml", Some(Path::new("/conf")))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn resolve_local_path_under_root() {
        let resolved = resolve_local_path("./labels.yml", Some(Path::new("/conf"))).unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/conf/labels.yml")));
    }

    #[test]
    fn resolve_local_path_treats_bare_names_under_root_as_local() {
        let resolved = resolve_local_path("labels.yml", Some(Path::new("/conf"))).unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/conf/labels.yml")));
    }

    #[test]
    fn resolve_local_path_rejects_absolute_outside_root() {
        let err = resolve_local_path("/etc/labels.yml", Some(Path::new("/conf"))).unwrap_err();
        assert!(matches!(err, ConfigError::OutsideRoot { .. }));
    }

    #[test]
    fn resolve_local_path_without_root_is_absolute() {
        let resolved = resolve_local_path("./conf", None).unwrap().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("conf"));
    }

    #[test]
    fn expand_tilde_leaves_other_values() {
        assert_eq!(expand_tilde("conf/x"), PathBuf::from("conf/x"));
        assert_eq!(expand_tilde("~user"), PathBuf::from("~user"));
    }
}
