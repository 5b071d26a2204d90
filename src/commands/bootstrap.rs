//! The bootstrap command: configure, load, authenticate, run steps.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::config::new_repository::Features;
use crate::error::{RepositoryError, StarterKitError};
use crate::github::repos::{self, Repository};
use crate::github::{self, GitHubClient, RepoRef, auth};
use crate::logging::{Log, Logger};
use crate::npm::PackageCache;
use crate::tasks::{self, Context, Task};

/// Run a bootstrap against `cli.repo`.
///
/// Loads every configured resource before touching the network, then
/// authenticates, makes sure the repository exists, and runs the steps in
/// order. The browser, if one was opened, is closed on every exit path.
///
/// # Errors
///
/// Returns an error if the repository reference or configuration is
/// invalid, authentication fails, the repository is missing (without
/// `--create`), or any step fails.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    log.stage("Configuring");
    let repo: RepoRef = cli.repo.parse().map_err(StarterKitError::from)?;
    let keep = cli.keep.resolve();
    if cli.dry_run {
        log.dry_run("Dry run: nothing will be changed");
    }

    log.stage("Loading");
    let mut packages = PackageCache::new();
    let config = Config::load(&cli.sources(), &mut packages, &**log).map_err(StarterKitError::from)?;
    log_loaded(&config, &**log);

    if config.is_empty() {
        log.info("Nothing to do!");
        return Ok(());
    }

    log.stage("Authenticating");
    let server_url = github::server_url();
    let token =
        auth::resolve_token(cli.token.as_deref(), &server_url, &**log).map_err(StarterKitError::from)?;
    let client = GitHubClient::new(&token);
    log.debug(&format!("API root: {}", client.api_url()));

    let Some(repository) = ensure_repository(
        &client,
        &repo,
        cli.create,
        config.new_repository.features,
        cli.dry_run,
        &**log,
    )?
    else {
        return Ok(());
    };
    if (config.categories.is_some() || config.discussion.is_some()) && !repository.has_discussions {
        log.warn(&format!(
            "Discussions are disabled on {repo}; discussion steps will likely fail."
        ));
    }

    if config.needs_browser() && !cli.dry_run {
        log.info("Some steps have no API and will drive Chrome; sign in there if asked.");
    }

    let config = Arc::new(config);
    let all_tasks = tasks::all_bootstrap_tasks(&config.order);
    let mut ctx = Context::new(
        Arc::clone(&config),
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(client),
        repo.clone(),
        repository.node_id,
        server_url,
    )
    .with_dry_run(cli.dry_run)
    .with_keep(keep)
    .with_headless(cli.headless);

    let result = super::run_tasks_to_completion(
        all_tasks.iter().map(|task| task.as_ref() as &dyn Task),
        &ctx,
        log,
    );
    ctx.close_browser();
    result?;

    log.info(&format!("Repository bootstrap completed for {repo}"));
    Ok(())
}

fn log_loaded(config: &Config, log: &dyn Log) {
    let count = |n: Option<usize>| n.map_or_else(|| "-".to_string(), |n| n.to_string());
    log.debug(&format!("labels: {}", count(config.labels.as_ref().map(Vec::len))));
    log.debug(&format!(
        "categories: {}",
        count(config.categories.as_ref().map(Vec::len))
    ));
    log.debug(&format!(
        "rulesets: {}",
        count(config.rulesets.as_ref().map(Vec::len))
    ));
    log.debug(&format!("issue: {}", config.issue.is_some()));
    log.debug(&format!("discussion: {}", config.discussion.is_some()));
}

/// Look the repository up, creating it when allowed.
///
/// Returns `None` in dry-run mode when the repository would have to be
/// created: nothing else can be planned against it.
fn ensure_repository(
    client: &GitHubClient,
    repo: &RepoRef,
    create: bool,
    features: Features,
    dry_run: bool,
    log: &dyn Log,
) -> Result<Option<Repository>> {
    if let Some(found) =
        repos::find(client, repo).with_context(|| format!("Failed to look up repository {repo}"))?
    {
        log.debug(&format!("repository {repo} exists"));
        return Ok(Some(found));
    }
    if !create {
        return Err(RepositoryError::NotFound(repo.to_string()).into());
    }
    if dry_run {
        log.dry_run(&format!("Would create repository {repo}"));
        return Ok(None);
    }

    log.stage(&format!("Creating repository {repo}"));
    let created = repos::create(client, repo, features).map_err(|e| RepositoryError::CreateFailed {
        repo: repo.to_string(),
        reason: e.to_string(),
    })?;
    log.info(&format!("Created repository {repo}"));
    Ok(Some(created))
}
