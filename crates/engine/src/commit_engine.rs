//! The Commit Engine (spec §4.6): the transactional three-phase
//! pipeline that validates, applies, and arbitrates rejections for a
//! submitted [`Commit`].

use crate::appliers;
use alphatier_concurrency::StateStore;
use alphatier_core::{
    Action, ActionKind, ActionType, Commit, CommitResult, ConstraintName, Error, ExecutorId, Pool,
    Result, Snapshot,
};
use im::HashSet as ImHashSet;
use std::collections::{HashMap, HashSet};

/// Per-commit options accepted by [`commit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitOptions {
    /// When `true`, both constraint phases are skipped (Step 0 still
    /// runs). Intended for replaying an already-vetted commit log.
    pub force: bool,
}

const RESERVED_CREATE_METADATA_KEYS: [&str; 3] =
    ["scheduler_id", "lifecycle_phase", "metadata_version"];

/// Submit `commit` against `store`.
///
/// Runs entirely inside one `StateStore::mutate` call, so the whole
/// pipeline — Step 0 validation, the pre-constraint phase, apply, and
/// the post-constraint phase — executes with exclusive access to the
/// pool and either commits in full or leaves the store untouched.
pub fn commit(store: &StateStore, commit: Commit, options: CommitOptions) -> Result<CommitResult> {
    store.mutate(|pool| commit_against_pool(pool, &commit, options))
}

/// The same pipeline, operating directly on an owned [`Pool`] rather
/// than through a [`StateStore`]. Exposed so callers that already hold
/// exclusive access to a pool (e.g. property tests) can drive the
/// pipeline without a `StateStore` in the loop.
pub fn commit_against_pool(
    pool: Pool,
    commit: &Commit,
    options: CommitOptions,
) -> Result<(Pool, CommitResult)> {
    let pre_snapshot = alphatier_core::get_snapshot(&pool);
    validate_step0(commit, &pre_snapshot)?;

    let mut rejected_actions: HashMap<ConstraintName, Vec<Action>> = HashMap::new();

    if !options.force {
        for (name, constraint) in pool.constraints.iter_pre() {
            let rejects = constraint.evaluate(commit, &pre_snapshot);
            if !rejects.is_empty() {
                rejected_actions.entry(name.clone()).or_default().extend(rejects);
            }
        }
        if arbitrate(commit, &rejected_actions) {
            tracing::warn!(
                constraints = ?rejected_actions.keys().collect::<Vec<_>>(),
                "commit rejected in pre-constraint phase"
            );
            let rejected_count = distinct_rejected_count(&rejected_actions);
            let result = CommitResult {
                accepted_actions: Vec::new(),
                rejected_actions,
                pre_snapshot,
                post_snapshot: None,
            };
            return Err(Error::Rejected(Box::new(result), rejected_count, commit.actions.len()));
        }
    }

    let rejected_so_far = identities(&rejected_actions);
    let mut working_pool = pool;
    for action in &commit.actions {
        if rejected_so_far.contains(&action.identity()) {
            continue;
        }
        working_pool = appliers::apply(working_pool, &commit.scheduler_id, action)?;
    }

    let post_apply_snapshot = alphatier_core::get_snapshot(&working_pool);

    if !options.force {
        for (name, constraint) in working_pool.constraints.iter_post() {
            let rejects = constraint.evaluate(commit, &pre_snapshot, &post_apply_snapshot);
            if !rejects.is_empty() {
                rejected_actions.entry(name.clone()).or_default().extend(rejects);
            }
        }
        if arbitrate(commit, &rejected_actions) {
            tracing::warn!(
                constraints = ?rejected_actions.keys().collect::<Vec<_>>(),
                "commit rejected in post-constraint phase"
            );
            let rejected_count = distinct_rejected_count(&rejected_actions);
            let result = CommitResult {
                accepted_actions: Vec::new(),
                rejected_actions,
                pre_snapshot,
                post_snapshot: Some(post_apply_snapshot),
            };
            return Err(Error::Rejected(Box::new(result), rejected_count, commit.actions.len()));
        }
    }

    // The surviving commit is accepted, possibly partially. Post-phase
    // rejections were computed against `working_pool`, which still
    // holds every action Step 2 applied — including ones the post
    // phase just rejected. Rebuild the committed pool from the
    // pre-snapshot, replaying only the final accepted set, so neither
    // the returned pool nor `post_snapshot` carries a rejected action's
    // mutation (spec §4.6 scenario 3: "post-snapshot contains two
    // tasks").
    let rejected_ids = identities(&rejected_actions);
    let accepted_actions: Vec<Action> = commit
        .actions
        .iter()
        .filter(|a| !rejected_ids.contains(&a.identity()))
        .cloned()
        .collect();

    let mut final_pool = Pool {
        executors: pre_snapshot.executors.clone(),
        tasks: pre_snapshot.tasks.clone(),
        constraints: working_pool.constraints,
    };
    for action in &accepted_actions {
        final_pool = appliers::apply(final_pool, &commit.scheduler_id, action)?;
    }
    let post_snapshot = alphatier_core::get_snapshot(&final_pool);

    tracing::info!(
        accepted = accepted_actions.len(),
        rejected = rejected_ids.len(),
        "commit accepted"
    );

    let result = CommitResult {
        accepted_actions,
        rejected_actions,
        pre_snapshot,
        post_snapshot: Some(post_snapshot),
    };
    Ok((final_pool, result))
}

fn identities(rejected: &HashMap<ConstraintName, Vec<Action>>) -> HashSet<(alphatier_core::TaskId, ActionType)> {
    rejected.values().flatten().map(Action::identity).collect()
}

fn distinct_rejected_count(rejected: &HashMap<ConstraintName, Vec<Action>>) -> usize {
    identities(rejected).len()
}

/// Abort iff `allow_partial_commit && R == N`, or `!allow_partial_commit && R > 0`.
fn arbitrate(commit: &Commit, rejected: &HashMap<ConstraintName, Vec<Action>>) -> bool {
    let r = distinct_rejected_count(rejected);
    let n = commit.actions.len();
    if commit.allow_partial_commit {
        r == n && n > 0
    } else {
        r > 0
    }
}

/// Step 0: syntactic validation. Fails the whole commit with a fatal,
/// non-partial error; reason strings are matched verbatim by tests.
fn validate_step0(commit: &Commit, pre_snapshot: &Snapshot) -> Result<()> {
    let mut seen_ids = HashSet::new();
    for action in &commit.actions {
        if !seen_ids.insert(action.id.clone()) {
            return Err(Error::ValidationFailure(
                "Commit contains duplicate tasks".to_string(),
            ));
        }
    }

    for action in &commit.actions {
        if matches!(action.kind, ActionKind::Create { .. }) && pre_snapshot.tasks.contains_key(&action.id)
        {
            return Err(Error::ValidationFailure(
                "Commit contains duplicate create tasks".to_string(),
            ));
        }
    }

    for action in &commit.actions {
        if let ActionKind::Create {
            metadata: Some(metadata),
            ..
        } = &action.kind
        {
            if RESERVED_CREATE_METADATA_KEYS
                .iter()
                .any(|key| metadata.0.contains_key(*key))
            {
                return Err(Error::ValidationFailure(
                    "Commit contains illegal properties in create actions".to_string(),
                ));
            }
        }
    }

    for action in &commit.actions {
        let type_word = match &action.kind {
            ActionKind::Update { .. } => Some("update"),
            ActionKind::Kill => Some("kill"),
            ActionKind::Create { .. } => None,
        };
        if let Some(word) = type_word {
            if !pre_snapshot.tasks.contains_key(&action.id) {
                return Err(Error::ValidationFailure(format!(
                    "Commit contains reference to missing task for {word}"
                )));
            }
        }
    }

    for action in &commit.actions {
        if let ActionKind::Create { executor_id, .. } = &action.kind {
            if !pre_snapshot.executors.contains_key(executor_id) {
                return Err(Error::ValidationFailure(format!(
                    "Commit contains reference to missing executor {executor_id}"
                )));
            }
        }
    }

    // Rule 6 applies per executor targeted by at least one `create`
    // action: the union of resource keys named by this commit's
    // `create` actions against that executor must exactly equal the
    // executor's declared resource keys. Executors targeted only by
    // `update`/`kill` actions (which carry no `resources` field) are
    // not subject to this rule — there is nothing for them to "name".
    let mut named_keys: HashMap<ExecutorId, ImHashSet<String>> = HashMap::new();
    for action in &commit.actions {
        if let ActionKind::Create {
            executor_id,
            resources,
            ..
        } = &action.kind
        {
            named_keys
                .entry(executor_id.clone())
                .or_insert_with(ImHashSet::new)
                .extend(resources.keys());
        }
    }
    for (executor_id, keys) in &named_keys {
        // Guaranteed present: rule 5 above already proved this.
        let executor = pre_snapshot.executors.get(executor_id).expect("checked above");
        if *keys != executor.resources.keys() {
            return Err(Error::ValidationFailure(
                "Commit contains missing resource".to_string(),
            ));
        }
    }

    Ok(())
}
