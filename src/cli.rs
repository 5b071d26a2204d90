//! Command-line interface.
use clap::{Args, Parser};

use crate::config::ConfigSources;
use crate::tasks::KeepExisting;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "repo-starter-kit",
    about = "Bootstrap a GitHub repository's labels, discussion categories, rulesets and seed content",
    version = option_env!("STARTER_KIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
)]
pub struct Cli {
    /// Target repository
    #[arg(short, long, value_name = "OWNER/NAME")]
    pub repo: String,

    /// Create the repository if it does not exist
    #[arg(short, long)]
    pub create: bool,

    /// Configuration source: npm package name or local path
    #[arg(short, long, value_name = "NAME|PATH")]
    pub package: Option<String>,

    /// Per-resource overrides.
    #[command(flatten)]
    pub resources: ResourceOpts,

    /// Deletion overrides.
    #[command(flatten)]
    pub keep: KeepOpts,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// GitHub token (falls back to GH_TOKEN, then the device flow)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,
}

/// Per-resource file overrides; each takes precedence over the package config.
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceOpts {
    /// Labels YAML file
    #[arg(long, value_name = "PATH")]
    pub labels: Option<String>,

    /// Discussion categories YAML file
    #[arg(long, value_name = "PATH")]
    pub categories: Option<String>,

    /// Branch rulesets YAML/JSON file (repeatable)
    #[arg(long, value_name = "PATH")]
    pub rulesets: Vec<String>,

    /// Seed issue Markdown file
    #[arg(long, value_name = "PATH")]
    pub issue: Option<String>,

    /// Seed discussion Markdown file
    #[arg(long, value_name = "PATH")]
    pub discussion: Option<String>,
}

/// Deletion overrides.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct KeepOpts {
    /// Do not delete anything missing from the configuration
    #[arg(short, long)]
    pub keep: bool,

    /// Do not delete labels missing from the configuration
    #[arg(long)]
    pub keep_labels: bool,

    /// Do not delete categories missing from the configuration
    #[arg(long)]
    pub keep_categories: bool,

    /// Do not delete rulesets missing from the configuration
    #[arg(long)]
    pub keep_rulesets: bool,
}

impl Cli {
    /// Configuration sources named on the command line.
    #[must_use]
    pub fn sources(&self) -> ConfigSources {
        ConfigSources {
            package: self.package.clone(),
            labels: self.resources.labels.clone(),
            categories: self.resources.categories.clone(),
            rulesets: self.resources.rulesets.clone(),
            issue: self.resources.issue.clone(),
            discussion: self.resources.discussion.clone(),
        }
    }
}

impl KeepOpts {
    /// Resolve `--keep` and the per-kind flags.
    #[must_use]
    pub const fn resolve(self) -> KeepExisting {
        KeepExisting {
            labels: self.keep || self.keep_labels,
            categories: self.keep || self.keep_categories,
            rulesets: self.keep || self.keep_rulesets,
        }
    }
}
