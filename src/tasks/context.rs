use std::cell::OnceCell;
use std::sync::Arc;

use anyhow::Result;

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::github::{GitHubClient, RepoRef};
use crate::logging::Log;

/// Per-kind "keep existing" switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepExisting {
    /// Do not delete labels missing from the configuration.
    pub labels: bool,
    /// Do not delete categories missing from the configuration.
    pub categories: bool,
    /// Do not delete rulesets missing from the configuration.
    pub rulesets: bool,
}

impl KeepExisting {
    /// The same switch for every kind.
    #[must_use]
    pub const fn all(keep: bool) -> Self {
        Self {
            labels: keep,
            categories: keep,
            rulesets: keep,
        }
    }
}

/// Shared context for step execution.
pub struct Context {
    /// Everything loaded from the configuration sources.
    pub config: Arc<Config>,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// Authenticated API client.
    pub client: Arc<GitHubClient>,
    /// Target repository.
    pub repo: RepoRef,
    /// GraphQL node id of the target repository.
    pub repository_id: String,
    /// Web root used by the browser, e.g. `https://github.com`.
    pub server_url: String,
    /// Whether to perform a dry run (plan without applying).
    pub dry_run: bool,
    /// Deletion overrides.
    pub keep: KeepExisting,
    /// Run Chrome without a window.
    pub headless: bool,
    /// Browser session, opened on first use.
    browser: OnceCell<BrowserSession>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("log", &"<dyn Log>")
            .field("repo", &self.repo)
            .field("repository_id", &self.repository_id)
            .field("server_url", &self.server_url)
            .field("dry_run", &self.dry_run)
            .field("keep", &self.keep)
            .field("headless", &self.headless)
            .field("browser_open", &self.browser.get().is_some())
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a new context for step execution.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        log: Arc<dyn Log>,
        client: Arc<GitHubClient>,
        repo: RepoRef,
        repository_id: String,
        server_url: String,
    ) -> Self {
        Self {
            config,
            log,
            client,
            repo,
            repository_id,
            server_url,
            dry_run: false,
            keep: KeepExisting::default(),
            headless: false,
            browser: OnceCell::new(),
        }
    }

    /// Set the dry-run flag.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the deletion overrides.
    #[must_use]
    pub const fn with_keep(mut self, keep: KeepExisting) -> Self {
        self.keep = keep;
        self
    }

    /// Set whether the browser runs headless.
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// The browser session, launching Chrome and waiting for sign-in the
    /// first time it is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if Chrome cannot be started or the operator does not
    /// sign in.
    pub fn browser(&self) -> Result<&BrowserSession> {
        if let Some(session) = self.browser.get() {
            return Ok(session);
        }
        self.log.info("Opening browser session");
        let session =
            BrowserSession::open(&self.server_url, &self.repo, self.headless, &*self.log)?;
        Ok(self.browser.get_or_init(|| session))
    }

    /// Close the browser session if one was opened.
    pub fn close_browser(&mut self) {
        if let Some(session) = self.browser.take() {
            self.log.debug("closing browser session");
            session.close();
        }
    }

    /// Create a copy of this context with a different logger.
    ///
    /// The browser session is not shared with the copy.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            log,
            client: Arc::clone(&self.client),
            repo: self.repo.clone(),
            repository_id: self.repository_id.clone(),
            server_url: self.server_url.clone(),
            dry_run: self.dry_run,
            keep: self.keep,
            headless: self.headless,
            browser: OnceCell::new(),
        }
    }
}
