//! REST gateway for issue labels.
use serde::Deserialize;
use serde_json::{Value, json};

use super::client::GitHubClient;
use super::repos::RepoRef;
use crate::config::labels::Label;
use crate::reconcile::Gateway;
use crate::reconcile::labels::{ExistingLabel, LabelKind, normalize_color};

/// Label listing entry with its node id, used to label discussions.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelNode {
    /// Label name.
    pub name: String,
    /// GraphQL node id.
    pub node_id: String,
}

/// Label operations on one repository.
#[derive(Debug)]
pub struct LabelsApi<'a> {
    client: &'a GitHubClient,
    repo: &'a RepoRef,
}

impl<'a> LabelsApi<'a> {
    /// Gateway for `repo`.
    #[must_use]
    pub const fn new(client: &'a GitHubClient, repo: &'a RepoRef) -> Self {
        Self { client, repo }
    }

    fn label_path(&self, name: &str) -> String {
        format!("{}/labels/{}", self.repo.api_path(), urlencoding::encode(name))
    }

    /// All labels with their node ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub fn nodes(&self) -> anyhow::Result<Vec<LabelNode>> {
        Ok(self.client.paginate(&format!("{}/labels", self.repo.api_path()))?)
    }
}

/// Body for create and update: colour normalised, missing description sent
/// as an empty string.
fn payload(label: &Label) -> Value {
    json!({
        "name": label.name,
        "color": normalize_color(&label.color),
        "description": label.description.as_deref().unwrap_or_default(),
    })
}

impl Gateway<LabelKind> for LabelsApi<'_> {
    fn fetch_existing(&mut self) -> anyhow::Result<Vec<ExistingLabel>> {
        Ok(self.client.paginate(&format!("{}/labels", self.repo.api_path()))?)
    }

    fn create(&mut self, desired: &Label) -> anyhow::Result<()> {
        self.client
            .post::<Value>(&format!("{}/labels", self.repo.api_path()), &payload(desired))?;
        Ok(())
    }

    fn update(&mut self, desired: &Label, _existing: Option<&ExistingLabel>) -> anyhow::Result<()> {
        let mut body = payload(desired);
        if let Some(fields) = body.as_object_mut()
            && let Some(name) = fields.remove("name")
        {
            fields.insert("new_name".to_string(), name);
        }
        self.client.patch(&self.label_path(&desired.name), &body)?;
        Ok(())
    }

    fn delete(&mut self, existing: &ExistingLabel) -> anyhow::Result<()> {
        self.client.delete(&self.label_path(&existing.name))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn payload_normalises_color() {
        let label = Label {
            name: "bug".to_string(),
            color: "#FF0000".to_string(),
            description: None,
        };
        assert_eq!(
            payload(&label),
            json!({"name": "bug", "color": "ff0000", "description": ""})
        );
    }

    #[test]
    fn label_path_encodes_name() {
        let client = GitHubClient::with_api_url("t", "https://api.github.com");
        let repo: RepoRef = "o/r".parse().unwrap();
        let api = LabelsApi::new(&client, &repo);
        assert_eq!(api.label_path("good first issue"), "/repos/o/r/labels/good%20first%20issue");
    }
}
