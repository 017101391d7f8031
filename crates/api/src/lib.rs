//! The public facade (spec §6): `PoolStore` wires the State Store, the
//! built-in constraints, and the Commit Engine together behind one
//! handle, the way a caller outside this workspace is expected to use
//! Alphatier.
//!
//! Every other crate in the workspace is a collaborator surface; this
//! is the only one that depends on all of them.

#![warn(missing_docs)]

use std::sync::Arc;

use alphatier_concurrency::StateStore;
use alphatier_constraints::install_builtins;
pub use alphatier_core::{
    get_snapshot, Action, ActionKind, Commit, CommitResult, ConstraintName, Error, Executor,
    ExecutorId, ExecutorStatus, LifecyclePhase, Metadata, MetadataValue, Pool, PostConstraint,
    PreConstraint, Resources, Result, SchedulerId, Snapshot, Task, TaskId,
};
use alphatier_engine::commit as engine_commit;
use alphatier_engine::executor_ops;
pub use alphatier_engine::executor_ops::RegisterOptions;
pub use alphatier_engine::CommitOptions;

/// Tunable behaviour of a [`PoolStore`] beyond the per-commit options
/// already carried by [`Commit`] and [`CommitOptions`].
///
/// Deliberately small: admission policy, persistence, and everything
/// else left out-of-scope by the core stays out-of-scope here too.
#[derive(Debug, Clone, Copy)]
pub struct PoolStoreConfig {
    /// Whether a rejected commit additionally emits a `tracing::warn!`
    /// at the facade layer, naming the rejected/total counts and a
    /// per-constraint summary. The Commit Engine itself always logs its
    /// own outcome regardless of this setting; this only controls the
    /// facade's extra line.
    pub trace_rejections: bool,
}

impl Default for PoolStoreConfig {
    fn default() -> Self {
        PoolStoreConfig {
            trace_rejections: true,
        }
    }
}

/// A shared, lock-guarded `Pool` with the default built-in constraints
/// installed, exposing every operation from spec §4 as a method.
pub struct PoolStore {
    store: StateStore,
    config: PoolStoreConfig,
}

impl PoolStore {
    /// A fresh, empty pool with `optimistic-locking` and
    /// `no-resource-overbooking` preinstalled, using
    /// [`PoolStoreConfig::default`].
    pub fn new() -> Self {
        Self::with_config(PoolStoreConfig::default())
    }

    /// As [`PoolStore::new`], with an explicit configuration.
    pub fn with_config(config: PoolStoreConfig) -> Self {
        let mut pool = Pool::new();
        install_builtins(&mut pool);
        PoolStore {
            store: StateStore::new(pool),
            config,
        }
    }

    /// Rebuild a pool seeded with `snapshot`'s `{executors, tasks}`,
    /// with the default built-in constraints installed (spec §6
    /// persistence note: the constraint registry itself is never part
    /// of a snapshot, so this always starts from the defaults).
    pub fn create_with_snapshot(snapshot: Snapshot) -> Self {
        let mut pool = Pool::from_snapshot(snapshot);
        install_builtins(&mut pool);
        PoolStore {
            store: StateStore::new(pool),
            config: PoolStoreConfig::default(),
        }
    }

    /// A consistent clone of the current pool, including its
    /// constraint registry.
    pub fn read(&self) -> Pool {
        self.store.read()
    }

    /// The `{executors, tasks}` projection of the current pool.
    pub fn get_snapshot(&self) -> Snapshot {
        get_snapshot(&self.store.read())
    }

    /// Install or overwrite the executor record for `id` (spec §4.3).
    pub fn register(
        &self,
        id: ExecutorId,
        resources: Resources,
        options: RegisterOptions,
    ) -> Result<()> {
        self.store
            .mutate(|pool| executor_ops::register(pool, id, resources, options).map(|p| (p, ())))
    }

    /// Deep-merge `metadata` into the executor's metadata, incrementing
    /// `metadata_version` by one.
    pub fn update(&self, id: &ExecutorId, metadata: &Metadata) -> Result<()> {
        self.store
            .mutate(|pool| executor_ops::update(pool, id, metadata).map(|p| (p, ())))
    }

    /// Set the executor's status to `Unregistered`, retaining the record.
    pub fn unregister(&self, id: &ExecutorId) -> Result<()> {
        self.store
            .mutate(|pool| executor_ops::unregister(pool, id).map(|p| (p, ())))
    }

    /// Advance the task's lifecycle phase and merge metadata.
    pub fn update_task(
        &self,
        id: &TaskId,
        lifecycle_phase: LifecyclePhase,
        metadata: &Metadata,
    ) -> Result<()> {
        self.store.mutate(|pool| {
            executor_ops::update_task(pool, id, lifecycle_phase, metadata).map(|p| (p, ()))
        })
    }

    /// Remove the task, detaching it from its owning executor's `task_ids`.
    pub fn kill_task(&self, id: &TaskId) -> Result<()> {
        self.store
            .mutate(|pool| executor_ops::kill_task(pool, id).map(|p| (p, ())))
    }

    /// Register (or replace) a pre-constraint under `name` (spec §4.4).
    pub fn add_pre_constraint(&self, name: ConstraintName, constraint: Arc<dyn PreConstraint>) {
        self.store
            .mutate::<(), Error>(move |mut pool| {
                pool.constraints.add_pre(name, constraint);
                Ok((pool, ()))
            })
            .expect("constraint registration cannot fail");
    }

    /// Register (or replace) a post-constraint under `name`.
    pub fn add_post_constraint(&self, name: ConstraintName, constraint: Arc<dyn PostConstraint>) {
        self.store
            .mutate::<(), Error>(move |mut pool| {
                pool.constraints.add_post(name, constraint);
                Ok((pool, ()))
            })
            .expect("constraint registration cannot fail");
    }

    /// Remove a pre-constraint by name, if present.
    pub fn del_pre_constraint(&self, name: &ConstraintName) {
        self.store
            .mutate::<(), Error>(|mut pool| {
                pool.constraints.del_pre(name);
                Ok((pool, ()))
            })
            .expect("constraint removal cannot fail");
    }

    /// Remove a post-constraint by name, if present.
    pub fn del_post_constraint(&self, name: &ConstraintName) {
        self.store
            .mutate::<(), Error>(|mut pool| {
                pool.constraints.del_post(name);
                Ok((pool, ()))
            })
            .expect("constraint removal cannot fail");
    }

    /// Submit `commit` through the three-phase pipeline (spec §4.6).
    pub fn commit(&self, commit: Commit, options: CommitOptions) -> Result<CommitResult> {
        let scheduler_id = commit.scheduler_id.clone();
        let result = engine_commit(&self.store, commit, options);
        if self.config.trace_rejections {
            if let Err(Error::Rejected(ref partial, rejected, total)) = result {
                tracing::warn!(
                    scheduler_id = %scheduler_id,
                    rejected,
                    total,
                    summary = ?partial.rejection_summary(),
                    "commit rejected"
                );
            }
        }
        result
    }
}

impl Default for PoolStore {
    fn default() -> Self {
        Self::new()
    }
}
