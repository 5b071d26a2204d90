//! Issue creation and follow-up mutations.
use serde::Deserialize;
use serde_json::{Value, json};

use super::client::GitHubClient;
use super::error::ApiError;
use super::repos::RepoRef;
use crate::config::issue::{Issue, IssueClose};

const CLOSE_ISSUE: &str = r"
mutation closeIssue($issueId: ID!, $reason: IssueClosedStateReason!) {
  closeIssue(input: {issueId: $issueId, stateReason: $reason}) { issue { id } }
}";

const PIN_ISSUE: &str = r"
mutation pinIssue($issueId: ID!) {
  pinIssue(input: {issueId: $issueId}) { issue { id } }
}";

/// Locks an issue or discussion.
pub(super) const LOCK_LOCKABLE: &str = r"
mutation lockLockable($id: ID!) {
  lockLockable(input: {lockableId: $id, lockReason: RESOLVED}) { lockedRecord { locked } }
}";

/// A newly created issue.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedIssue {
    /// Issue number.
    pub number: u64,
    /// GraphQL node id.
    pub node_id: String,
}

fn create_body(issue: &Issue) -> Value {
    json!({
        "title": issue.title,
        "body": issue.body,
        "labels": issue.labels,
    })
}

/// Create `issue` (title, body, labels).
///
/// # Errors
///
/// Returns [`ApiError`] if the request fails.
pub fn create(client: &GitHubClient, repo: &RepoRef, issue: &Issue) -> Result<CreatedIssue, ApiError> {
    client.post(&format!("{}/issues", repo.api_path()), &create_body(issue))
}

/// Close an issue with the given reason.
///
/// # Errors
///
/// Returns [`ApiError`] if the mutation fails.
pub fn close(client: &GitHubClient, node_id: &str, reason: IssueClose) -> Result<(), ApiError> {
    client
        .graphql::<Value>(
            CLOSE_ISSUE,
            &json!({ "issueId": node_id, "reason": reason.state_reason() }),
        )
        .map(drop)
}

/// Pin an issue to the repository's issue list.
///
/// # Errors
///
/// Returns [`ApiError`] if the mutation fails.
pub fn pin(client: &GitHubClient, node_id: &str) -> Result<(), ApiError> {
    client
        .graphql::<Value>(PIN_ISSUE, &json!({ "issueId": node_id }))
        .map(drop)
}

/// Lock an issue or discussion as resolved.
///
/// # Errors
///
/// Returns [`ApiError`] if the mutation fails.
pub fn lock(client: &GitHubClient, node_id: &str) -> Result<(), ApiError> {
    client
        .graphql::<Value>(LOCK_LOCKABLE, &json!({ "id": node_id }))
        .map(drop)
}
