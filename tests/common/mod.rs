// Shared helpers for integration tests.
//
// Provides a temporary directory that stands in for a local configuration
// package, plus CLI and logger factories, so each test can drive the
// bootstrap command without touching the network.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use clap::Parser as _;
use repo_starter_kit::cli::Cli;
use repo_starter_kit::config::{Config, ConfigSources};
use repo_starter_kit::logging::Logger;
use repo_starter_kit::npm::PackageCache;

/// A local configuration package backed by a [`tempfile::TempDir`].
///
/// The directory is deleted when dropped.
pub struct ConfigPackage {
    /// Temporary directory holding the package files.
    pub root: tempfile::TempDir,
}

impl ConfigPackage {
    /// An empty package directory.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the package root.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Package root as a `--package` value.
    pub fn arg(&self) -> String {
        self.root.path().display().to_string()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, content).expect("write package file");
        self
    }

    /// Load the package through [`Config::load`].
    pub fn load(&self) -> Config {
        let sources = ConfigSources {
            package: Some(self.arg()),
            ..ConfigSources::default()
        };
        Config::load(&sources, &mut PackageCache::new(), &Logger::new("test"))
            .expect("load config")
    }
}

/// Parse `args` as if given on the command line after the binary name.
pub fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("repo-starter-kit").chain(args.iter().copied()))
}

/// A logger for one command run.
pub fn logger() -> Arc<Logger> {
    Arc::new(Logger::new("test"))
}
