#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the bootstrap command.
//!
//! These tests cover the step list produced by [`all_bootstrap_tasks`] and
//! the parts of a run that happen before any remote call: repository
//! reference parsing, configuration loading, and the "nothing to do" exit.

mod common;

use std::collections::HashSet;

use common::{ConfigPackage, cli, logger};
use repo_starter_kit::commands::bootstrap;
use repo_starter_kit::config::{ContentKind, DEFAULT_ORDER};
use repo_starter_kit::tasks;

// ---------------------------------------------------------------------------
// Step list
// ---------------------------------------------------------------------------

/// Regression guard for step names and their default order.
#[test]
fn bootstrap_task_names() {
    let all_tasks = tasks::all_bootstrap_tasks(&DEFAULT_ORDER);
    let task_names: Vec<&str> = all_tasks.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!(task_names.join("\n"), @r"
    Sync labels
    Sync discussion categories
    Sync branch rulesets
    Create issue
    Create discussion
    ");
}

#[test]
fn bootstrap_task_names_are_unique() {
    let tasks = tasks::all_bootstrap_tasks(&DEFAULT_ORDER);
    let mut seen: HashSet<&str> = HashSet::new();
    for task in &tasks {
        assert!(seen.insert(task.name()), "duplicate step name: {}", task.name());
    }
}

#[test]
fn configured_order_moves_discussion_first() {
    let package = ConfigPackage::new()
        .with_file("repo-starter-kit.yml", "issue: issue.md\norder: [discussion]\n")
        .with_file("issue.md", "---\ntitle: Hello\n---\nbody\n");
    let config = package.load();
    assert_eq!(config.order, vec![ContentKind::Discussion, ContentKind::Issue]);

    let names: Vec<String> = tasks::all_bootstrap_tasks(&config.order)
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names[3], "Create discussion");
    assert_eq!(names[4], "Create issue");
}

// ---------------------------------------------------------------------------
// Runs that stop before the network
// ---------------------------------------------------------------------------

#[test]
fn malformed_repository_is_rejected() {
    let err = bootstrap::run(&cli(&["--repo", "octo"]), &logger()).unwrap_err();
    assert!(
        err.to_string().ends_with("Repository must use OWNER/NAME format."),
        "unexpected error: {err:#}"
    );
}

#[test]
fn nothing_configured_finishes_without_authenticating() {
    let package = ConfigPackage::new().with_file("repo-starter-kit.yml", "order: [issue]\n");
    let source = package.arg();
    let log = logger();
    bootstrap::run(&cli(&["-r", "octo/hello", "-p", source.as_str()]), &log).unwrap();
    assert!(!log.has_failures());
}

#[test]
fn directory_without_config_file_is_an_error() {
    let package = ConfigPackage::new();
    let source = package.arg();
    let err = bootstrap::run(&cli(&["-r", "octo/hello", "-p", source.as_str()]), &logger())
        .unwrap_err();
    assert!(
        err.to_string().contains("must include one of repo-starter-kit.yml"),
        "unexpected error: {err:#}"
    );
}

#[test]
fn missing_override_file_is_an_error() {
    let package = ConfigPackage::new();
    let missing = package.path().join("labels.yml").display().to_string();
    let err = bootstrap::run(
        &cli(&["-r", "octo/hello", "--labels", missing.as_str()]),
        &logger(),
    )
    .unwrap_err();
    assert!(
        err.to_string().contains("Failed to read"),
        "unexpected error: {err:#}"
    );
}
