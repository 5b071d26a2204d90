//! Repository lookup and creation.
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::json;

use super::client::GitHubClient;
use super::error::ApiError;
use crate::config::new_repository::Features;
use crate::error::ConfigError;

/// `OWNER/NAME` reference to a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// User or organisation login.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// REST path prefix, `/repos/{owner}/{name}`.
    #[must_use]
    pub fn api_path(&self) -> String {
        format!(
            "/repos/{}/{}",
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.name)
        )
    }
}

impl FromStr for RepoRef {
    type Err = ConfigError;

    /// ```
    /// use repo_starter_kit::github::RepoRef;
    ///
    /// let repo: RepoRef = "octo/hello".parse().unwrap();
    /// assert_eq!(repo.owner, "octo");
    /// assert!("octo".parse::<RepoRef>().is_err());
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (owner, name) = value.trim().split_once('/').ok_or(ConfigError::InvalidRepo)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(ConfigError::InvalidRepo);
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The parts of a repository the run needs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Repository {
    /// GraphQL node id.
    pub node_id: String,
    /// Whether discussions are enabled.
    #[serde(default)]
    pub has_discussions: bool,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    login: String,
}

/// Fetch `repo`, or `None` if it does not exist (or is not visible).
///
/// # Errors
///
/// Returns [`ApiError`] on any failure other than `404`.
pub fn find(client: &GitHubClient, repo: &RepoRef) -> Result<Option<Repository>, ApiError> {
    client.get_optional(&repo.api_path())
}

/// Login of the authenticated user.
///
/// # Errors
///
/// Returns [`ApiError`] if the lookup fails.
pub fn viewer_login(client: &GitHubClient) -> Result<String, ApiError> {
    client.get::<Viewer>("/user").map(|viewer| viewer.login)
}

/// Request body for repository creation.
fn create_body(repo: &RepoRef, features: Features) -> serde_json::Value {
    json!({
        "name": repo.name,
        "has_discussions": features.discussions,
        "has_issues": features.issues,
        "has_projects": features.projects,
        "has_wiki": features.wiki,
    })
}

/// Creation endpoint: the user endpoint when `owner` is the viewer
/// (case-insensitive), the organisation endpoint otherwise.
fn create_path(repo: &RepoRef, viewer: &str) -> String {
    if viewer.eq_ignore_ascii_case(&repo.owner) {
        "/user/repos".to_string()
    } else {
        format!("/orgs/{}/repos", urlencoding::encode(&repo.owner))
    }
}

/// Create `repo` with the given features.
///
/// # Errors
///
/// Returns [`ApiError`] if the viewer lookup or creation fails.
pub fn create(client: &GitHubClient, repo: &RepoRef, features: Features) -> Result<Repository, ApiError> {
    let viewer = viewer_login(client)?;
    client.post(&create_path(repo, &viewer), &create_body(repo, features))
}
