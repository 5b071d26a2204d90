//! Configuration sources and resource loading.
//!
//! A run's configuration comes from an optional config file (local or
//! inside an npm package) plus per-resource command-line overrides. Every
//! reference is resolved to a file and loaded into typed records here, before
//! any remote call is made.
pub mod categories;
pub mod discussion;
pub mod front_matter;
pub mod issue;
pub mod labels;
pub mod new_repository;
pub mod package;
pub mod rulesets;
pub mod yaml_loader;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::Log;
use crate::npm::{PackageCache, PackageSpec};
use crate::paths::{self, NPM_PREFIX};

pub use package::{ContentKind, DEFAULT_ORDER};

/// Where configuration comes from, as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// Config source: local file/directory or npm package reference.
    pub package: Option<String>,
    /// Labels file override.
    pub labels: Option<String>,
    /// Categories file override.
    pub categories: Option<String>,
    /// Rulesets file overrides; non-empty replaces the config's list.
    pub rulesets: Vec<String>,
    /// Issue file override.
    pub issue: Option<String>,
    /// Discussion file override.
    pub discussion: Option<String>,
}

/// Everything loaded for one run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Desired labels, if a labels file was configured.
    pub labels: Option<Vec<labels::Label>>,
    /// Desired discussion categories, if configured.
    pub categories: Option<Vec<categories::Category>>,
    /// Desired rulesets, concatenated across every configured file.
    pub rulesets: Option<Vec<rulesets::Ruleset>>,
    /// Seed issue, if configured.
    pub issue: Option<issue::Issue>,
    /// Seed discussion, if configured.
    pub discussion: Option<discussion::Discussion>,
    /// Options for `--create`.
    pub new_repository: new_repository::NewRepository,
    /// Order in which the seed issue and discussion are created.
    pub order: Vec<ContentKind>,
}

impl Config {
    /// Resolve `sources` and load every referenced resource.
    ///
    /// # Errors
    ///
    /// Returns the first resolution, download, read, or validation error.
    pub fn load(
        sources: &ConfigSources,
        packages: &mut PackageCache,
        log: &dyn Log,
    ) -> Result<Self, ConfigError> {
        let package = sources
            .package
            .as_deref()
            .map(|value| load_package_config(value, packages, log))
            .transpose()?;

        let mut resolver = Resolver { packages, log };
        let root = package.as_ref().map(|p| p.root.as_path());

        let labels_path = resolver.pick(
            sources.labels.as_deref(),
            package.as_ref().and_then(|p| p.labels.as_deref()),
            root,
        )?;
        let categories_path = resolver.pick(
            sources.categories.as_deref(),
            package.as_ref().and_then(|p| p.categories.as_deref()),
            root,
        )?;
        let issue_path = resolver.pick(
            sources.issue.as_deref(),
            package.as_ref().and_then(|p| p.issue.as_deref()),
            root,
        )?;
        let discussion_path = resolver.pick(
            sources.discussion.as_deref(),
            package.as_ref().and_then(|p| p.discussion.as_deref()),
            root,
        )?;
        let new_repository_path = resolver.pick(
            None,
            package.as_ref().and_then(|p| p.new_repository.as_deref()),
            root,
        )?;

        let ruleset_paths = if sources.rulesets.is_empty() {
            let refs = package.as_ref().map(|p| p.rulesets.as_slice()).unwrap_or_default();
            refs.iter()
                .map(|value| resolver.resolve(value, root))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            sources
                .rulesets
                .iter()
                .map(|value| resolver.resolve(value, None))
                .collect::<Result<Vec<_>, _>>()?
        };

        let labels = labels_path.as_deref().map(labels::load).transpose()?;
        if let Some(labels) = &labels {
            log.info(&format!("loaded {} labels", labels.len()));
        }

        let categories = categories_path
            .as_deref()
            .map(categories::load)
            .transpose()?;
        if let Some(categories) = &categories {
            log.info(&format!("loaded {} categories", categories.len()));
        }

        let rulesets = if ruleset_paths.is_empty() {
            None
        } else {
            let mut all = Vec::new();
            for path in &ruleset_paths {
                all.extend(rulesets::load(path)?);
            }
            log.info(&format!("loaded {} rulesets", all.len()));
            Some(all)
        };

        let issue = issue_path.as_deref().map(issue::load).transpose()?;
        if let Some(issue) = &issue {
            log.info(&format!("loaded issue '{}'", issue.title));
        }

        let discussion = discussion_path
            .as_deref()
            .map(discussion::load)
            .transpose()?;
        if let Some(discussion) = &discussion {
            log.info(&format!("loaded discussion '{}'", discussion.title));
        }

        let new_repository = new_repository_path
            .as_deref()
            .map(new_repository::load)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            labels,
            categories,
            rulesets,
            issue,
            discussion,
            new_repository,
            order: package.map_or_else(|| DEFAULT_ORDER.to_vec(), |p| p.order),
        })
    }

    /// `true` when no label, category, ruleset, issue, or discussion is
    /// configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_none()
            && self.categories.is_none()
            && self.rulesets.is_none()
            && self.issue.is_none()
            && self.discussion.is_none()
    }

    /// `true` when some configured step drives the browser.
    #[must_use]
    pub fn needs_browser(&self) -> bool {
        self.categories.as_ref().is_some_and(|c| !c.is_empty())
            || self.discussion.as_ref().is_some_and(|d| d.pin)
    }
}

/// Locate and read the configuration file named by `--package`.
fn load_package_config(
    value: &str,
    packages: &mut PackageCache,
    log: &dyn Log,
) -> Result<package::PackageConfig, ConfigError> {
    if let Some(path) = paths::resolve_local_path(value, None)? {
        log.debug(&format!("reading config from {}", path.display()));
        let location = if path.is_dir() {
            format!("Directory {}", path.display())
        } else {
            format!("File {}", path.display())
        };
        return package::read(&path, &location);
    }

    let spec = PackageSpec::parse(value);
    let name = spec.normalized_name()?;
    let root = packages.fetch(&name, log)?;
    let path = match &spec.file {
        Some(file) => package_file(&root, file)?,
        None => root,
    };
    package::read(&path, &format!("Package {}", spec.name))
}

/// Join a file reference onto an extracted package root.
fn package_file(root: &Path, file: &str) -> Result<PathBuf, ConfigError> {
    paths::join_within_root(root, file).map_err(|_| ConfigError::OutsideRoot {
        path: file.to_string(),
        root: "the package".to_string(),
    })
}

/// Resolves resource references to files, downloading packages on demand.
struct Resolver<'a> {
    packages: &'a mut PackageCache,
    log: &'a dyn Log,
}

impl Resolver<'_> {
    /// Resolve the command-line override if given, else the config reference.
    fn pick(
        &mut self,
        cli: Option<&str>,
        configured: Option<&str>,
        root: Option<&Path>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        match (cli, configured) {
            (Some(value), _) => self.resolve(value, None).map(Some),
            (None, Some(value)) => self.resolve(value, root).map(Some),
            (None, None) => Ok(None),
        }
    }

    /// Resolve one reference.
    ///
    /// `npm:` references name a file inside a package. Anything else is a
    /// local path: confined to `root` when one is given, otherwise relative to
    /// the working directory.
    fn resolve(&mut self, value: &str, root: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let path = if value.starts_with(NPM_PREFIX) {
            let spec = PackageSpec::parse(value);
            let Some(file) = spec.file.as_deref() else {
                return Err(ConfigError::InvalidPackage(format!(
                    "\"{value}\" must reference a file in the package"
                )));
            };
            let package_root = self.packages.fetch(&spec.normalized_name()?, self.log)?;
            package_file(&package_root, file)?
        } else if let Some(root) = root {
            paths::resolve_local_path(value, Some(root))?
                .unwrap_or_else(|| root.join(value))
        } else {
            paths::absolutize(value)?
        };
        self.log.debug(&format!("resolved {value} -> {}", path.display()));
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn sample_package(dir: &Path) {
        write(
            dir,
            "repo-starter-kit.yml",
            "labels: conf/labels.yml\ncategories: conf/categories.yml\nrulesets: [conf/main.yml, conf/tags.yml]\nissue: conf/issue.md\nnewRepository: conf/repo.yml\norder: [discussion]\n",
        );
        write(dir, "conf/labels.yml", "- name: bug\n  color: d73a4a\n");
        write(dir, "conf/categories.yml", "- name: Q&A\n  format: answer\n");
        write(dir, "conf/main.yml", "- name: main\n");
        write(dir, "conf/tags.yml", "- name: tags\n  target: tag\n");
        write(dir, "conf/issue.md", "---\ntitle: Hello\n---\nbody\n");
        write(dir, "conf/repo.yml", "features:\n  discussions: true\n");
    }

    #[test]
    fn load_from_local_directory() {
        let (log, _tmp, _guard) = isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        sample_package(dir.path());

        let sources = ConfigSources {
            package: Some(dir.path().display().to_string()),
            ..ConfigSources::default()
        };
        let config = Config::load(&sources, &mut PackageCache::new(), &log).unwrap();

        assert_eq!(config.labels.as_ref().unwrap()[0].name, "bug");
        assert_eq!(config.categories.as_ref().unwrap().len(), 1);
        let rulesets = config.rulesets.as_ref().unwrap();
        assert_eq!(
            rulesets.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["main", "tags"]
        );
        assert_eq!(config.issue.as_ref().unwrap().title, "Hello");
        assert!(config.discussion.is_none());
        assert!(config.new_repository.features.discussions);
        assert_eq!(
            config.order,
            vec![ContentKind::Discussion, ContentKind::Issue]
        );
        assert!(!config.is_empty());
        assert!(config.needs_browser());
    }

    #[test]
    fn cli_override_wins_over_config() {
        let (log, _tmp, _guard) = isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        sample_package(dir.path());
        let other = tempfile::tempdir().unwrap();
        write(other.path(), "labels.yml", "- name: docs\n  color: 0075ca\n");

        let sources = ConfigSources {
            package: Some(dir.path().display().to_string()),
            labels: Some(other.path().join("labels.yml").display().to_string()),
            rulesets: vec![dir.path().join("conf/tags.yml").display().to_string()],
            ..ConfigSources::default()
        };
        let config = Config::load(&sources, &mut PackageCache::new(), &log).unwrap();

        assert_eq!(config.labels.as_ref().unwrap()[0].name, "docs");
        assert_eq!(config.rulesets.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn config_references_cannot_escape_root() {
        let (log, _tmp, _guard) = isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "kit/repo-starter-kit.yml", "labels: ../labels.yml\n");
        write(dir.path(), "labels.yml", "- name: bug\n");

        let sources = ConfigSources {
            package: Some(dir.path().join("kit").display().to_string()),
            ..ConfigSources::default()
        };
        let err = Config::load(&sources, &mut PackageCache::new(), &log).unwrap_err();
        assert!(matches!(err, ConfigError::OutsideRoot { .. }));
    }

    #[test]
    fn npm_reference_without_file_is_rejected() {
        let (log, _tmp, _guard) = isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "repo-starter-kit.yml", "labels: 'npm:demo'\n");

        let sources = ConfigSources {
            package: Some(dir.path().display().to_string()),
            ..ConfigSources::default()
        };
        let err = Config::load(&sources, &mut PackageCache::new(), &log).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"npm:demo\" must reference a file in the package"
        );
    }

    #[test]
    fn nothing_configured_is_empty() {
        let (log, _tmp, _guard) = isolated_logger();
        let config =
            Config::load(&ConfigSources::default(), &mut PackageCache::new(), &log).unwrap();
        assert!(config.is_empty());
        assert!(!config.needs_browser());
        assert_eq!(config.order, DEFAULT_ORDER.to_vec());
    }
}
