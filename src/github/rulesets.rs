//! REST gateway for repository rulesets.
use serde::Deserialize;
use serde_json::{Map, Value};

use super::client::GitHubClient;
use super::repos::RepoRef;
use crate::config::rulesets::Ruleset;
use crate::reconcile::Gateway;
use crate::reconcile::rulesets::{ExistingRuleset, RulesetKind, normalize_payload};

#[derive(Debug, Deserialize)]
struct Summary {
    id: u64,
    name: String,
}

/// Ruleset operations on one repository.
#[derive(Debug)]
pub struct RulesetsApi<'a> {
    client: &'a GitHubClient,
    repo: &'a RepoRef,
}

impl<'a> RulesetsApi<'a> {
    /// Gateway for `repo`.
    #[must_use]
    pub const fn new(client: &'a GitHubClient, repo: &'a RepoRef) -> Self {
        Self { client, repo }
    }

    fn collection(&self) -> String {
        format!("{}/rulesets", self.repo.api_path())
    }

    fn item(&self, id: u64) -> String {
        format!("{}/rulesets/{id}", self.repo.api_path())
    }
}

impl Gateway<RulesetKind> for RulesetsApi<'_> {
    /// Lists rulesets defined on the repository itself, then fetches each
    /// one's detail for comparison.
    fn fetch_existing(&mut self) -> anyhow::Result<Vec<ExistingRuleset>> {
        let summaries: Vec<Summary> = self
            .client
            .paginate(&format!("{}?includes_parents=false", self.collection()))?;
        summaries
            .into_iter()
            .filter(|summary| !summary.name.is_empty())
            .map(|summary| {
                let detail: Map<String, Value> = self.client.get(&self.item(summary.id))?;
                Ok::<_, anyhow::Error>(ExistingRuleset {
                    id: summary.id,
                    name: summary.name,
                    detail,
                })
            })
            .collect()
    }

    fn create(&mut self, desired: &Ruleset) -> anyhow::Result<()> {
        let body = Value::Object(normalize_payload(desired));
        self.client.post::<Value>(&self.collection(), &body)?;
        Ok(())
    }

    fn update(&mut self, desired: &Ruleset, existing: Option<&ExistingRuleset>) -> anyhow::Result<()> {
        let Some(existing) = existing else {
            anyhow::bail!("ruleset '{}' has no known id", desired.name);
        };
        let body = Value::Object(normalize_payload(desired));
        self.client.put(&self.item(existing.id), &body)?;
        Ok(())
    }

    fn delete(&mut self, existing: &ExistingRuleset) -> anyhow::Result<()> {
        self.client.delete(&self.item(existing.id))?;
        Ok(())
    }
}
