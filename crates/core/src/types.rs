//! The entities from spec §3: `Executor`, `Task`, `Action`, `Commit`, and
//! the `CommitResult` the Commit Engine returns.

use crate::ids::{ConstraintName, ExecutorId, SchedulerId, TaskId};
use crate::metadata::Metadata;
use crate::resources::Resources;
use crate::snapshot::Snapshot;
use im::HashSet as ImHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of an `Executor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutorStatus {
    /// The executor is currently registered and may accept tasks.
    Registered,
    /// The executor has been unregistered; its record is retained.
    Unregistered,
}

/// Lifecycle phase of a `Task`.
///
/// Declaration order is the monotonicity order: a task's phase may only
/// move to a strictly later variant, never an earlier one (spec §3
/// invariant, enforced per spec §9 in both `update_task` and the `kill`
/// applier). `derive(PartialOrd, Ord)` on a field-less enum orders by
/// declaration position, which is exactly this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecyclePhase {
    /// The task was just created and has not yet been acknowledged.
    Create,
    /// The executor has acknowledged the task and is bringing it up.
    Creating,
    /// The task is fully up and running.
    Created,
    /// A scheduler has requested the task be killed.
    Kill,
    /// The executor is in the process of tearing the task down.
    Killing,
}

/// A registered capacity-providing entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executor {
    /// Unique identifier.
    pub id: ExecutorId,
    /// Whether the executor is still registered.
    pub status: ExecutorStatus,
    /// Declared resource capacity.
    pub resources: Resources,
    /// Free-form metadata.
    pub metadata: Metadata,
    /// Incremented on every metadata mutation.
    pub metadata_version: u64,
    /// Ids of tasks currently assigned to this executor.
    pub task_ids: ImHashSet<TaskId>,
    /// Incremented on every mutation of `task_ids`.
    pub task_ids_version: u64,
}

impl Executor {
    /// Construct a freshly-registered executor with no tasks.
    pub fn new(id: ExecutorId, resources: Resources) -> Self {
        Executor {
            id,
            status: ExecutorStatus::Registered,
            resources,
            metadata: Metadata::empty(),
            metadata_version: 0,
            task_ids: ImHashSet::new(),
            task_ids_version: 0,
        }
    }
}

/// A reservation against exactly one executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: TaskId,
    /// The executor this task is assigned to.
    pub executor_id: ExecutorId,
    /// The scheduler that created this task.
    pub scheduler_id: SchedulerId,
    /// Current lifecycle phase.
    pub lifecycle_phase: LifecyclePhase,
    /// Reserved resources against the executor's capacity.
    pub resources: Resources,
    /// Free-form metadata.
    pub metadata: Metadata,
    /// Incremented on every metadata mutation.
    pub metadata_version: u64,
}

/// Discriminator distinguishing the three action kinds without their
/// payload — used to compute rejection identity ("action.id + type").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// See [`ActionKind::Create`].
    Create,
    /// See [`ActionKind::Update`].
    Update,
    /// See [`ActionKind::Kill`].
    Kill,
}

/// The type-specific payload of an [`Action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Create a new task on `executor_id` reserving `resources`.
    Create {
        /// Target executor.
        executor_id: ExecutorId,
        /// Reservation against the executor's capacity.
        resources: Resources,
        /// Initial metadata, if any.
        metadata: Option<Metadata>,
    },
    /// Deep-merge `metadata` into the target task.
    Update {
        /// Metadata patch (shallow "right wins" merge, see [`Metadata::merge`]).
        metadata: Metadata,
    },
    /// Mark the target task's lifecycle phase as `Kill`.
    Kill,
}

/// One intended mutation inside a [`Commit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// The target task id (for `create`, the id of the task being born).
    pub id: TaskId,
    /// Type-specific payload.
    pub kind: ActionKind,
    /// Optimistic-locking probe against the target executor's
    /// `metadata_version`. Resolution of "the target executor" is
    /// type-dependent: for `Create` it is `kind`'s `executor_id`; for
    /// `Update`/`Kill` it is the executor already owning the
    /// pre-existing task.
    pub executor_metadata_version: Option<u64>,
    /// Optimistic-locking probe against the target executor's
    /// `task_ids_version`.
    pub executor_task_ids_version: Option<u64>,
    /// Optimistic-locking probe against the target task's
    /// `metadata_version`. Meaningless for `Create` (the task doesn't
    /// exist yet in the pre-snapshot) and simply never supplied there.
    pub metadata_version: Option<u64>,
}

impl Action {
    /// This action's [`ActionType`] discriminator.
    pub fn action_type(&self) -> ActionType {
        match self.kind {
            ActionKind::Create { .. } => ActionType::Create,
            ActionKind::Update { .. } => ActionType::Update,
            ActionKind::Kill => ActionType::Kill,
        }
    }

    /// Rejection/dedup identity: "action.id + type" (spec §4.4).
    pub fn identity(&self) -> (TaskId, ActionType) {
        (self.id.clone(), self.action_type())
    }

    /// Convenience constructor for a `create` action.
    pub fn create(id: TaskId, executor_id: ExecutorId, resources: Resources) -> Self {
        Action {
            id,
            kind: ActionKind::Create {
                executor_id,
                resources,
                metadata: None,
            },
            executor_metadata_version: None,
            executor_task_ids_version: None,
            metadata_version: None,
        }
    }

    /// Convenience constructor for an `update` action.
    pub fn update(id: TaskId, metadata: Metadata) -> Self {
        Action {
            id,
            kind: ActionKind::Update { metadata },
            executor_metadata_version: None,
            executor_task_ids_version: None,
            metadata_version: None,
        }
    }

    /// Convenience constructor for a `kill` action.
    pub fn kill(id: TaskId) -> Self {
        Action {
            id,
            kind: ActionKind::Kill,
            executor_metadata_version: None,
            executor_task_ids_version: None,
            metadata_version: None,
        }
    }
}

/// The atomic unit a scheduler submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// The scheduler submitting this commit.
    pub scheduler_id: SchedulerId,
    /// Ordered batch of actions.
    pub actions: Vec<Action>,
    /// Partial-accept policy (spec §4.6 rejection-arbitration rule).
    pub allow_partial_commit: bool,
}

impl Commit {
    /// Construct a commit with `allow_partial_commit: false`.
    pub fn new(scheduler_id: SchedulerId, actions: Vec<Action>) -> Self {
        Commit {
            scheduler_id,
            actions,
            allow_partial_commit: false,
        }
    }

    /// Builder-style setter for `allow_partial_commit`.
    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial_commit = allow;
        self
    }
}

/// The outcome of a successful (possibly partial) commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitResult {
    /// Actions that were applied, in commit-submission order.
    pub accepted_actions: Vec<Action>,
    /// Actions rejected, keyed by the name of the constraint that
    /// rejected them. A single action may appear under more than one
    /// constraint name if more than one constraint rejected it.
    pub rejected_actions: HashMap<ConstraintName, Vec<Action>>,
    /// Snapshot taken before Step 1 (pre-constraint phase).
    pub pre_snapshot: Snapshot,
    /// Snapshot taken after Step 2 (apply), before Step 3. `None` if the
    /// commit aborted during the pre-constraint phase or Step 0.
    pub post_snapshot: Option<Snapshot>,
}

impl CommitResult {
    /// Total count of distinct actions rejected across all constraints
    /// (an action rejected by two constraints counts once).
    pub fn distinct_rejected_count(&self) -> usize {
        self.rejected_actions
            .values()
            .flatten()
            .map(Action::identity)
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    /// Per-constraint rejection counts, for compact log lines — not
    /// part of the distilled spec, added as a small ergonomics
    /// supplement (see `SPEC_FULL.md` §10).
    pub fn rejection_summary(&self) -> Vec<(ConstraintName, usize)> {
        let mut summary: Vec<(ConstraintName, usize)> = self
            .rejected_actions
            .iter()
            .map(|(name, actions)| (name.clone(), actions.len()))
            .collect();
        summary.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        summary
    }
}
