//! Discussion creation and follow-up mutations.
use serde::Deserialize;
use serde_json::{Value, json};

use super::client::GitHubClient;
use super::error::ApiError;
use crate::config::discussion::DiscussionClose;

const CREATE_DISCUSSION: &str = r"
mutation createDiscussion($repositoryId: ID!, $categoryId: ID!, $title: String!, $body: String!) {
  createDiscussion(input: {repositoryId: $repositoryId, categoryId: $categoryId, title: $title, body: $body}) {
    discussion { id number }
  }
}";

const ADD_LABELS: &str = r"
mutation addLabels($id: ID!, $labelIds: [ID!]!) {
  addLabelsToLabelable(input: {labelableId: $id, labelIds: $labelIds}) { clientMutationId }
}";

const CLOSE_DISCUSSION: &str = r"
mutation closeDiscussion($id: ID!, $reason: DiscussionCloseReason!) {
  closeDiscussion(input: {discussionId: $id, reason: $reason}) { discussion { id } }
}";

/// A newly created discussion.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedDiscussion {
    /// GraphQL node id.
    pub id: String,
    /// Discussion number.
    pub number: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateData {
    create_discussion: CreatePayload,
}

#[derive(Debug, Deserialize)]
struct CreatePayload {
    discussion: CreatedDiscussion,
}

/// Create a discussion in the category with node id `category_id`.
///
/// # Errors
///
/// Returns [`ApiError`] if the mutation fails.
pub fn create(
    client: &GitHubClient,
    repository_id: &str,
    category_id: &str,
    title: &str,
    body: &str,
) -> Result<CreatedDiscussion, ApiError> {
    let data: CreateData = client.graphql(
        CREATE_DISCUSSION,
        &json!({
            "repositoryId": repository_id,
            "categoryId": category_id,
            "title": title,
            "body": body,
        }),
    )?;
    Ok(data.create_discussion.discussion)
}

/// Attach labels (by node id) to a discussion.
///
/// # Errors
///
/// Returns [`ApiError`] if the mutation fails.
pub fn add_labels(client: &GitHubClient, id: &str, label_ids: &[String]) -> Result<(), ApiError> {
    client
        .graphql::<Value>(ADD_LABELS, &json!({ "id": id, "labelIds": label_ids }))
        .map(drop)
}

/// Close a discussion with the given reason.
///
/// # Errors
///
/// Returns [`ApiError`] if the mutation fails.
pub fn close(client: &GitHubClient, id: &str, reason: DiscussionClose) -> Result<(), ApiError> {
    client
        .graphql::<Value>(CLOSE_DISCUSSION, &json!({ "id": id, "reason": reason.reason() }))
        .map(drop)
}

/// Lock a discussion as resolved.
///
/// # Errors
///
/// Returns [`ApiError`] if the mutation fails.
pub fn lock(client: &GitHubClient, id: &str) -> Result<(), ApiError> {
    client
        .graphql::<Value>(super::issues::LOCK_LOCKABLE, &json!({ "id": id }))
        .map(drop)
}

/// Node ids for the label names in `wanted`, in order; unknown names are
/// dropped.
#[must_use]
pub fn label_ids(wanted: &[String], available: &[super::labels::LabelNode]) -> Vec<String> {
    wanted
        .iter()
        .filter_map(|name| available.iter().find(|label| &label.name == name))
        .map(|label| label.node_id.clone())
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::github::labels::LabelNode;

    #[test]
    fn label_ids_skip_unknown_names() {
        let available = vec![
            LabelNode {
                name: "docs".to_string(),
                node_id: "LA_1".to_string(),
            },
            LabelNode {
                name: "help".to_string(),
                node_id: "LA_2".to_string(),
            },
        ];
        let wanted = vec!["help".to_string(), "missing".to_string(), "docs".to_string()];
        assert_eq!(label_ids(&wanted, &available), vec!["LA_2", "LA_1"]);
    }

    #[test]
    fn create_response_decodes() {
        let data: CreateData = serde_json::from_value(json!({
            "createDiscussion": {"discussion": {"id": "D_1", "number": 7}}
        }))
        .unwrap();
        assert_eq!(data.create_discussion.discussion.number, 7);
    }
}
