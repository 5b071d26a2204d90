//! Repository bootstrap engine.
//!
//! Brings a GitHub repository's labels, discussion categories and branch
//! rulesets in line with a declarative configuration, then seeds it with an
//! issue and a discussion. Category editing and discussion pinning have no
//! API and go through a real browser session.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: locate the configuration (local or npm) and load resources
//! - **[`reconcile`]**: the desired-versus-existing plan and its execution
//! - **[`github`]** / **[`browser`]**: the remote gateways
//! - **[`tasks`]**: named steps wiring resources to gateways
//! - **[`commands`]**: top-level orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod npm;
pub mod paths;
pub mod reconcile;
pub mod tasks;
