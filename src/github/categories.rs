//! GraphQL listing of discussion categories.
use serde::Deserialize;
use serde_json::json;

use super::client::GitHubClient;
use super::error::ApiError;
use super::repos::RepoRef;
use crate::reconcile::categories::ApiCategory;

const LIST_CATEGORIES: &str = r"
query listCategories($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    discussionCategories(first: 100) {
      nodes { id name description emoji }
    }
  }
}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Data {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    discussion_categories: Connection,
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(default)]
    nodes: Vec<ApiCategory>,
}

/// Discussion categories of `repo` (name, description, emoji, node id).
///
/// # Errors
///
/// Returns [`ApiError`] if the query fails or the repository is missing.
pub fn list(client: &GitHubClient, repo: &RepoRef) -> Result<Vec<ApiCategory>, ApiError> {
    let data: Data = client.graphql(
        LIST_CATEGORIES,
        &json!({ "owner": repo.owner, "name": repo.name }),
    )?;
    data.repository
        .map(|r| r.discussion_categories.nodes)
        .ok_or_else(|| ApiError::GraphQl(format!("repository {repo} not found")))
}

/// Node id of the category called `name`, if any.
///
/// # Errors
///
/// Returns [`ApiError`] if the listing fails.
pub fn find_id(client: &GitHubClient, repo: &RepoRef, name: &str) -> Result<Option<String>, ApiError> {
    Ok(list(client, repo)?
        .into_iter()
        .find(|category| category.name == name)
        .map(|category| category.id))
}
