//! Domain-specific error types for the starter kit.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`], [`AuthError`])
//! while command handlers at the CLI boundary convert them to [`anyhow::Error`]
//! via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! StarterKitError
//! ├── Config(ConfigError)    : config discovery, resource file parsing/validation
//! ├── Api(ApiError)          : REST/GraphQL failures (see github::error)
//! ├── Auth(AuthError)        : token lookup and device authorization
//! ├── Browser(BrowserError)  : Chrome launch, sign-in, page automation
//! └── Repository(RepositoryError) : target repository lookup and creation
//! ```

use std::path::PathBuf;

use thiserror::Error;

pub use crate::github::error::ApiError;

/// Top-level error type for the starter kit.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum StarterKitError {
    /// Configuration-related error (discovery, parsing, validation).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Browser automation error.
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Target repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Errors that arise while locating and loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a file.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file could not be parsed as YAML/JSON.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A file parsed but its shape is wrong (e.g. not an array).
    #[error("{kind} file {} must contain {expected}.", path.display())]
    Shape {
        /// Human name of the resource kind (e.g. `"Label"`).
        kind: &'static str,
        /// Path to the offending file.
        path: PathBuf,
        /// What the file should have contained (e.g. `"an array"`).
        expected: &'static str,
    },

    /// A single record inside a resource file is malformed.
    #[error("{kind} entry at index {index} {message}.")]
    InvalidEntry {
        /// Human name of the resource kind (e.g. `"Label"`).
        kind: &'static str,
        /// Position of the entry in the file.
        index: usize,
        /// What is wrong with it.
        message: String,
    },

    /// A Markdown resource is missing a required front-matter field.
    #[error("Missing {field} in {}", path.display())]
    MissingField {
        /// Front-matter key.
        field: &'static str,
        /// Path to the Markdown file.
        path: PathBuf,
    },

    /// No configuration file was found in a directory or package.
    #[error("{location} must include one of {candidates} at its root.")]
    NotFound {
        /// Directory or package that was searched.
        location: String,
        /// Comma-separated list of accepted file names.
        candidates: String,
    },

    /// A path escapes the root it must stay within.
    #[error("\"{path}\" must reference a file in {root}")]
    OutsideRoot {
        /// The offending relative path.
        path: String,
        /// The root it was resolved against.
        root: String,
    },

    /// The package reference could not be understood.
    #[error("{0}")]
    InvalidPackage(String),

    /// A package could not be fetched from the registry.
    #[error("Failed to download package {package}: {reason}")]
    Download {
        /// Normalised package name.
        package: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The `--repo` value is not in `OWNER/NAME` form.
    #[error("Repository must use OWNER/NAME format.")]
    InvalidRepo,
}

/// Errors that arise while obtaining a GitHub token.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The device authorization request was rejected.
    #[error("device authorization failed: {0}")]
    DeviceFlow(String),

    /// The user declined the authorization request.
    #[error("authorization was denied by the user")]
    Denied,

    /// The device code expired before the user completed the login.
    #[error("the device code expired before authorization completed")]
    Expired,

    /// Reading from the terminal failed.
    #[error("failed to read from the terminal: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Errors that arise from browser automation.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Chrome could not be started.
    #[error("Failed to launch Chrome: {0}")]
    Launch(String),

    /// The operator did not confirm the login in time.
    #[error("Timed out waiting for login confirmation ({minutes} minutes).")]
    LoginTimeout {
        /// Length of the wait, in minutes.
        minutes: u64,
    },

    /// The sign-in control is still shown after the operator confirmed.
    #[error("GitHub sign in is still detected")]
    StillSignedOut,

    /// A page command failed.
    #[error("Browser action '{action}' failed: {reason}")]
    Action {
        /// Short description of what was attempted.
        action: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Errors about the target repository itself.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The repository does not exist and `--create` was not given.
    #[error("Repository {0} not found. Pass --create to create it automatically.")]
    NotFound(String),

    /// Creating the repository failed.
    #[error("Failed to create repository {repo}: {reason}")]
    CreateFailed {
        /// `OWNER/NAME`.
        repo: String,
        /// Underlying failure.
        reason: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_shape_display() {
        let e = ConfigError::Shape {
            kind: "Label",
            path: PathBuf::from("labels.yml"),
            expected: "an array",
        };
        assert_eq!(e.to_string(), "Label file labels.yml must contain an array.");
    }

    #[test]
    fn config_error_invalid_entry_display() {
        let e = ConfigError::InvalidEntry {
            kind: "Label",
            index: 3,
            message: "must define a non-empty 'name'".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Label entry at index 3 must define a non-empty 'name'."
        );
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/conf/labels.yml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("/conf/labels.yml"));
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_not_found_display() {
        let e = ConfigError::NotFound {
            location: "Package repo-starter-kit-demo".to_string(),
            candidates: "repo-starter-kit.yml, repo-starter-kit.json".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Package repo-starter-kit-demo must include one of repo-starter-kit.yml, repo-starter-kit.json at its root."
        );
    }

    #[test]
    fn config_error_invalid_repo_display() {
        assert_eq!(
            ConfigError::InvalidRepo.to_string(),
            "Repository must use OWNER/NAME format."
        );
    }

    // -----------------------------------------------------------------------
    // Browser / repository errors
    // -----------------------------------------------------------------------

    #[test]
    fn browser_error_login_timeout_display() {
        let e = BrowserError::LoginTimeout { minutes: 5 };
        assert_eq!(
            e.to_string(),
            "Timed out waiting for login confirmation (5 minutes)."
        );
    }

    #[test]
    fn repository_error_not_found_display() {
        let e = RepositoryError::NotFound("octo/demo".to_string());
        assert_eq!(
            e.to_string(),
            "Repository octo/demo not found. Pass --create to create it automatically."
        );
    }

    // -----------------------------------------------------------------------
    // StarterKitError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn starter_kit_error_from_config_error() {
        let e: StarterKitError = ConfigError::InvalidRepo.into();
        assert!(e.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn starter_kit_error_from_auth_error() {
        let e: StarterKitError = AuthError::Denied.into();
        assert!(e.to_string().contains("Authentication error"));
    }

    #[test]
    fn starter_kit_error_from_browser_error() {
        let e: StarterKitError = BrowserError::StillSignedOut.into();
        assert!(e.to_string().contains("Browser error"));
    }

    // -----------------------------------------------------------------------
    // Send + Sync bounds
    // -----------------------------------------------------------------------

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<StarterKitError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<AuthError>();
        assert_send_sync::<BrowserError>();
        assert_send_sync::<RepositoryError>();
    }

    #[test]
    fn config_error_converts_to_anyhow() {
        let e = ConfigError::InvalidRepo;
        let _anyhow_err: anyhow::Error = e.into();
    }
}
