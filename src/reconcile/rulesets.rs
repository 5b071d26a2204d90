//! Branch ruleset reconciliation.
use anyhow::Result;
use serde_json::{Map, Value};

use super::{EntityKind, Gateway, SyncOpts, SyncStats, sync};
use crate::config::rulesets::Ruleset;
use crate::logging::Log;

/// Keys the server assigns; never sent back.
const SERVER_FIELDS: &[&str] = &[
    "id",
    "source",
    "source_type",
    "created_at",
    "updated_at",
    "node_id",
];

const TARGETS: &[&str] = &["branch", "tag", "push"];
const ENFORCEMENTS: &[&str] = &["active", "disabled", "evaluate"];

/// An existing ruleset with its full detail.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingRuleset {
    /// Server-assigned id.
    pub id: u64,
    /// Ruleset name.
    pub name: String,
    /// Detail object as returned by `GET .../rulesets/{id}`.
    pub detail: Map<String, Value>,
}

fn pick(value: Option<&Value>, allowed: &[&'static str], default: &'static str) -> &'static str {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .and_then(|s| allowed.iter().copied().find(|a| *a == s))
        .unwrap_or(default)
}

/// Build the request body for `ruleset`.
///
/// Server-only fields are dropped. `target` and `enforcement` are trimmed and
/// lower-cased, and fall back to `branch` and `active` when missing or
/// unknown.
///
/// ```
/// use repo_starter_kit::config::rulesets::Ruleset;
/// use repo_starter_kit::reconcile::rulesets::normalize_payload;
/// use serde_json::json;
///
/// let attributes = json!({"name": "main", "id": 123, "source": "x", "target": "Branch"});
/// let ruleset = Ruleset {
///     name: "main".to_string(),
///     attributes: attributes.as_object().unwrap().clone(),
/// };
/// assert_eq!(
///     serde_json::Value::Object(normalize_payload(&ruleset)),
///     json!({"name": "main", "target": "branch", "enforcement": "active"})
/// );
/// ```
#[must_use]
pub fn normalize_payload(ruleset: &Ruleset) -> Map<String, Value> {
    let mut payload: Map<String, Value> = ruleset
        .attributes
        .iter()
        .filter(|(key, _)| !SERVER_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let target = pick(payload.get("target"), TARGETS, "branch");
    let enforcement = pick(payload.get("enforcement"), ENFORCEMENTS, "active");
    payload.insert("name".to_string(), Value::String(ruleset.name.clone()));
    payload.insert("target".to_string(), Value::String(target.to_string()));
    payload.insert("enforcement".to_string(), Value::String(enforcement.to_string()));
    payload
}

/// `true` when every part of `wanted` appears in `actual`.
///
/// Objects compare as a subset; arrays need the same length and pairwise
/// containment; scalars compare equal.
#[must_use]
pub fn is_contained(wanted: &Value, actual: &Value) -> bool {
    match (wanted, actual) {
        (Value::Object(w), Value::Object(a)) => w
            .iter()
            .all(|(key, value)| a.get(key).is_some_and(|other| is_contained(value, other))),
        (Value::Array(w), Value::Array(a)) => {
            w.len() == a.len() && w.iter().zip(a).all(|(x, y)| is_contained(x, y))
        }
        _ => wanted == actual,
    }
}

/// [`EntityKind`] for branch rulesets.
#[derive(Debug)]
pub struct RulesetKind;

impl EntityKind for RulesetKind {
    type Desired = Ruleset;
    type Existing = ExistingRuleset;
    const NOUN: &'static str = "ruleset";
    const PLURAL: &'static str = "branch rulesets";

    fn desired_name(desired: &Ruleset) -> &str {
        &desired.name
    }

    fn existing_name(existing: &ExistingRuleset) -> &str {
        &existing.name
    }

    fn differs(desired: &Ruleset, existing: &ExistingRuleset) -> bool {
        let payload = Value::Object(normalize_payload(desired));
        !is_contained(&payload, &Value::Object(existing.detail.clone()))
    }
}

/// Sync rulesets; every failure aborts.
///
/// # Errors
///
/// Returns the first failed listing, create, update, or delete.
pub fn sync_rulesets<G>(
    desired: &[Ruleset],
    gateway: &mut G,
    keep_existing: bool,
    dry_run: bool,
    log: &dyn Log,
) -> Result<Option<SyncStats>>
where
    G: Gateway<RulesetKind> + ?Sized,
{
    sync::<RulesetKind, G>(desired, gateway, SyncOpts::new(keep_existing, dry_run), log)
}
