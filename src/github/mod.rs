//! GitHub REST/GraphQL gateways.
pub mod auth;
pub mod categories;
pub mod client;
pub mod discussions;
pub mod error;
pub mod issues;
pub mod labels;
pub mod repos;
pub mod rulesets;

pub use client::GitHubClient;
pub use error::ApiError;
pub use repos::RepoRef;

/// Web root named by `GITHUB_SERVER_URL`, or `https://github.com`.
#[must_use]
pub fn server_url() -> String {
    std::env::var("GITHUB_SERVER_URL")
        .ok()
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| client::DEFAULT_SERVER_URL.to_string())
}
