//! Three-way reconciliation of named entities.
//!
//! Given the desired entities and a snapshot of the existing ones, [`plan`]
//! computes an ordered list of [`Action`]s and [`sync`] applies them through a
//! [`Gateway`]. The engine is generic over an [`EntityKind`]; labels,
//! discussion categories, and rulesets each provide one.
//!
//! Name is the only identity key and comparison is case-sensitive, except
//! that a kind may widen [`EntityKind::covers`] to protect existing entities
//! from deletion. Desired
//! entities are processed in list order, deletions follow in snapshot order,
//! and every gateway call is issued sequentially.
pub mod categories;
pub mod labels;
pub mod rulesets;

use std::collections::HashSet;
use std::fmt::Debug;

use anyhow::{Context as _, Result};

use crate::github::error::is_conflict;
use crate::logging::Log;

/// Describes one kind of reconcilable entity.
pub trait EntityKind {
    /// Entity as read from configuration.
    type Desired: Debug;
    /// Entity as reported by the remote side.
    type Existing: Debug;

    /// Singular noun used in log messages (`"label"`).
    const NOUN: &'static str;
    /// Plural noun used in log messages (`"labels"`).
    const PLURAL: &'static str;

    /// Identity of a desired entity.
    fn desired_name(desired: &Self::Desired) -> &str;

    /// Identity of an existing entity.
    fn existing_name(existing: &Self::Existing) -> &str;

    /// Kind-specific checks. An `Err` skips only this entity, with the
    /// returned message logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns the skip reason when the entity cannot be applied.
    fn validate(_desired: &Self::Desired) -> Result<(), String> {
        Ok(())
    }

    /// `true` when `existing` must be updated to match `desired`.
    fn differs(desired: &Self::Desired, existing: &Self::Existing) -> bool;

    /// Reason an existing entity cannot be updated or deleted, if any.
    fn unaddressable(_existing: &Self::Existing) -> Option<String> {
        None
    }

    /// `true` when an existing entity named `existing` is covered by the
    /// desired name `desired` and must survive the delete phase.
    fn covers(desired: &str, existing: &str) -> bool {
        desired == existing
    }
}

/// Remote operations for one entity kind.
pub trait Gateway<K: EntityKind> {
    /// Fetch the current snapshot, following pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn fetch_existing(&mut self) -> Result<Vec<K::Existing>>;

    /// Create `desired`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    fn create(&mut self, desired: &K::Desired) -> Result<()>;

    /// Update the entity named like `desired`. `existing` is `None` when the
    /// update follows a create conflict and no snapshot entry is known.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    fn update(&mut self, desired: &K::Desired, existing: Option<&K::Existing>) -> Result<()>;

    /// Delete `existing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    fn delete(&mut self, existing: &K::Existing) -> Result<()>;
}

/// One planned step.
#[derive(Debug)]
pub enum Action<'a, K: EntityKind> {
    /// Create a missing entity.
    Create(&'a K::Desired),
    /// Update an entity whose fields differ.
    Update {
        /// Target state.
        desired: &'a K::Desired,
        /// Current state.
        existing: &'a K::Existing,
    },
    /// Entity already matches.
    Unchanged(&'a K::Desired),
    /// Entity left alone; the reason is logged as a warning.
    Skip {
        /// Entity name.
        name: &'a str,
        /// Why it was skipped.
        reason: String,
    },
    /// Delete an entity that is no longer desired.
    Delete(&'a K::Existing),
}

/// Compute the ordered action list for `desired` against `existing`.
///
/// Desired entities come first, in list order; when two share a name only the
/// last one is planned. Deletions of existing entities not named in
/// `desired` follow in snapshot order, unless `keep_existing` is set. A
/// desired entity that fails validation still counts as desired, so its
/// existing counterpart is never deleted.
#[must_use]
pub fn plan<'a, K: EntityKind>(
    desired: &'a [K::Desired],
    existing: &'a [K::Existing],
    keep_existing: bool,
) -> Vec<Action<'a, K>> {
    let find = |name: &str| existing.iter().find(|e| K::existing_name(e) == name);

    let mut actions = Vec::new();
    let mut desired_names: HashSet<&str> = HashSet::new();

    for (index, item) in desired.iter().enumerate() {
        let name = K::desired_name(item);
        desired_names.insert(name);

        let shadowed = desired
            .iter()
            .skip(index + 1)
            .any(|later| K::desired_name(later) == name);
        if shadowed {
            continue;
        }

        if let Err(reason) = K::validate(item) {
            actions.push(Action::Skip { name, reason });
            continue;
        }

        let action = match find(name) {
            None => Action::Create(item),
            Some(current) if K::differs(item, current) => match K::unaddressable(current) {
                Some(reason) => Action::Skip { name, reason },
                None => Action::Update {
                    desired: item,
                    existing: current,
                },
            },
            Some(_) => Action::Unchanged(item),
        };
        actions.push(action);
    }

    if keep_existing {
        return actions;
    }

    for current in existing {
        let name = K::existing_name(current);
        if desired_names.iter().any(|wanted| K::covers(wanted, name)) {
            continue;
        }
        match K::unaddressable(current) {
            Some(reason) => actions.push(Action::Skip { name, reason }),
            None => actions.push(Action::Delete(current)),
        }
    }

    actions
}

/// Policy for one [`sync`] call.
///
/// # Examples
///
/// ```
/// use repo_starter_kit::reconcile::SyncOpts;
///
/// let opts = SyncOpts::new(false, false).retry_conflict_as_update().best_effort_delete();
/// assert!(opts.retry_conflict_as_update && opts.best_effort_delete);
/// assert!(!opts.keep_existing);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SyncOpts {
    /// Never delete existing entities missing from the desired list.
    pub keep_existing: bool,
    /// Log planned changes instead of applying them.
    pub dry_run: bool,
    /// Retry a create that fails with a name conflict as an update.
    pub retry_conflict_as_update: bool,
    /// Warn and continue when a delete fails instead of aborting.
    pub best_effort_delete: bool,
}

impl SyncOpts {
    /// Strict policy: every failure aborts.
    #[must_use]
    pub const fn new(keep_existing: bool, dry_run: bool) -> Self {
        Self {
            keep_existing,
            dry_run,
            retry_conflict_as_update: false,
            best_effort_delete: false,
        }
    }

    /// Retry create conflicts as updates.
    #[must_use]
    pub const fn retry_conflict_as_update(mut self) -> Self {
        self.retry_conflict_as_update = true;
        self
    }

    /// Make deletions best-effort.
    #[must_use]
    pub const fn best_effort_delete(mut self) -> Self {
        self.best_effort_delete = true;
        self
    }
}

/// Counters for one sync.
///
/// # Examples
///
/// ```
/// use repo_starter_kit::reconcile::SyncStats;
///
/// let stats = SyncStats { created: 2, updated: 1, deleted: 0, unchanged: 5, skipped: 0 };
/// assert_eq!(stats.summary(false), "2 created, 1 updated, 0 deleted, 5 unchanged");
/// assert_eq!(stats.summary(true), "2 to create, 1 to update, 0 to delete, 5 unchanged");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    /// Entities created.
    pub created: u32,
    /// Entities updated.
    pub updated: u32,
    /// Entities deleted.
    pub deleted: u32,
    /// Entities already matching.
    pub unchanged: u32,
    /// Entities skipped (validation, unaddressable, or failed best-effort delete).
    pub skipped: u32,
}

impl SyncStats {
    /// One-line summary, e.g. `"2 created, 1 updated, 0 deleted, 5 unchanged"`.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let (create, update, delete) = if dry_run {
            ("to create", "to update", "to delete")
        } else {
            ("created", "updated", "deleted")
        };
        let mut line = format!(
            "{} {create}, {} {update}, {} {delete}, {} unchanged",
            self.created, self.updated, self.deleted, self.unchanged
        );
        if self.skipped > 0 {
            line.push_str(&format!(", {} skipped", self.skipped));
        }
        line
    }
}

/// Reconcile `desired` against the remote state behind `gateway`.
///
/// Returns `Ok(None)` without touching the gateway when `desired` is empty:
/// an empty list never means "delete everything".
///
/// # Errors
///
/// Returns the first fetch, create, or update failure, and the first delete
/// failure unless [`SyncOpts::best_effort_delete`] is set.
pub fn sync<K, G>(
    desired: &[K::Desired],
    gateway: &mut G,
    opts: SyncOpts,
    log: &dyn Log,
) -> Result<Option<SyncStats>>
where
    K: EntityKind,
    G: Gateway<K> + ?Sized,
{
    if desired.is_empty() {
        log.warn(&format!(
            "No {} defined; skipping {} sync.",
            K::PLURAL,
            K::NOUN
        ));
        return Ok(None);
    }

    let existing = gateway
        .fetch_existing()
        .with_context(|| format!("Failed to list {}", K::PLURAL))?;
    log.debug(&format!("{} existing {}", existing.len(), K::PLURAL));

    let mut stats = SyncStats::default();
    for action in plan::<K>(desired, &existing, opts.keep_existing) {
        apply(action, gateway, opts, log, &mut stats)?;
    }

    if opts.keep_existing {
        log.info(&format!(
            "Keeping existing {} that are not in the configuration.",
            K::PLURAL
        ));
    }

    log.info(&stats.summary(opts.dry_run));
    Ok(Some(stats))
}

fn apply<K, G>(
    action: Action<'_, K>,
    gateway: &mut G,
    opts: SyncOpts,
    log: &dyn Log,
    stats: &mut SyncStats,
) -> Result<()>
where
    K: EntityKind,
    G: Gateway<K> + ?Sized,
{
    let noun = K::NOUN;
    match action {
        Action::Skip { reason, .. } => {
            log.warn(&reason);
            stats.skipped += 1;
        }
        Action::Unchanged(desired) => {
            log.debug(&format!("{noun} '{}' is up to date", K::desired_name(desired)));
            stats.unchanged += 1;
        }
        Action::Create(desired) => {
            let name = K::desired_name(desired);
            if opts.dry_run {
                log.dry_run(&format!("Would create {noun} '{name}'"));
                stats.created += 1;
                return Ok(());
            }
            match gateway.create(desired) {
                Ok(()) => {
                    log.info(&format!("Created {noun}: {name}"));
                    stats.created += 1;
                }
                Err(e) if opts.retry_conflict_as_update && is_conflict(&e) => {
                    log.debug(&format!("{noun} '{name}' already exists, updating instead"));
                    gateway
                        .update(desired, None)
                        .with_context(|| format!("Failed to update {noun} '{name}'"))?;
                    log.info(&format!("Updated {noun}: {name}"));
                    stats.updated += 1;
                }
                Err(e) => return Err(e.context(format!("Failed to create {noun} '{name}'"))),
            }
        }
        Action::Update { desired, existing } => {
            let name = K::desired_name(desired);
            if opts.dry_run {
                log.dry_run(&format!("Would update {noun} '{name}'"));
            } else {
                gateway
                    .update(desired, Some(existing))
                    .with_context(|| format!("Failed to update {noun} '{name}'"))?;
                log.info(&format!("Updated {noun}: {name}"));
            }
            stats.updated += 1;
        }
        Action::Delete(existing) => {
            let name = K::existing_name(existing);
            if opts.dry_run {
                log.dry_run(&format!("Would delete {noun} '{name}'"));
                stats.deleted += 1;
                return Ok(());
            }
            match gateway.delete(existing) {
                Ok(()) => {
                    log.info(&format!("Deleted {noun}: {name}"));
                    stats.deleted += 1;
                }
                Err(e) if opts.best_effort_delete => {
                    log.warn(&format!("Failed to delete {noun} '{name}': {e:#}"));
                    stats.skipped += 1;
                }
                Err(e) => return Err(e.context(format!("Failed to delete {noun} '{name}'"))),
            }
        }
    }
    Ok(())
}
