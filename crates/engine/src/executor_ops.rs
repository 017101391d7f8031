//! Executor Operations (spec §4.3).
//!
//! Out of the Commit Engine's direct control-flow, but its semantics —
//! particularly lifecycle monotonicity — are depended upon by the
//! engine and documented here as the collaborator contract.

use alphatier_core::{
    Error, Executor, ExecutorId, ExecutorStatus, LifecyclePhase, Metadata, Pool, Result, Task,
    TaskId,
};
use im::HashSet as ImHashSet;

/// Extra fields accepted by [`register`] beyond `id` and `resources`.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Initial metadata.
    pub metadata: Metadata,
    /// Initial `metadata_version` (normally `0`; nonzero when replaying
    /// an already-vetted log).
    pub metadata_version: u64,
    /// Pre-existing tasks to insert verbatim alongside the executor
    /// record — used when rebuilding a pool from an external snapshot.
    pub tasks: Vec<Task>,
    /// Initial `task_ids_version`.
    pub task_ids_version: u64,
}

/// Install or overwrite the executor record for `id`.
///
/// Fails with `Error::InvalidResources` if `resources` is empty or any
/// value is non-numeric (NaN, infinite, or negative). Pre-existing
/// tasks supplied in `options.tasks` are inserted into `pool.tasks`
/// verbatim.
///
/// Per spec §9's open question: **re-registering an already-present
/// executor id overwrites the executor record wholesale, including
/// `task_ids`.** Tasks that referenced the old executor and are not
/// named again in `options.tasks` become orphaned — they remain in
/// `pool.tasks` but are no longer reachable from any executor's
/// `task_ids`. `register` performs no garbage collection; an orphaned
/// task is visible to a caller scanning `pool.tasks` directly and can be
/// retired with an explicit `kill` action followed by `kill_task`.
pub fn register(
    mut pool: Pool,
    id: ExecutorId,
    resources: alphatier_core::Resources,
    options: RegisterOptions,
) -> Result<Pool> {
    if resources.is_empty() || !resources.all_numeric_non_negative() {
        return Err(Error::InvalidResources(format!(
            "executor {id} resources must be non-empty and all non-negative"
        )));
    }

    let task_ids: ImHashSet<TaskId> = options.tasks.iter().map(|t| t.id.clone()).collect();
    let executor = Executor {
        id: id.clone(),
        status: ExecutorStatus::Registered,
        resources,
        metadata: options.metadata,
        metadata_version: options.metadata_version,
        task_ids,
        task_ids_version: options.task_ids_version,
    };
    pool.executors.insert(id, executor);
    for task in options.tasks {
        pool.tasks.insert(task.id.clone(), task);
    }
    Ok(pool)
}

/// Deep-merge `metadata` into the executor's metadata (shallow "right
/// wins"), incrementing `metadata_version` by one.
pub fn update(mut pool: Pool, id: &ExecutorId, metadata: &Metadata) -> Result<Pool> {
    let Some(mut executor) = pool.executors.get(id).cloned() else {
        return Err(Error::InvalidOperation(format!(
            "cannot update unknown executor {id}"
        )));
    };
    executor.metadata.merge(metadata);
    executor.metadata_version += 1;
    pool.executors.insert(id.clone(), executor);
    Ok(pool)
}

/// Set the executor's status to `Unregistered`, retaining the record.
pub fn unregister(mut pool: Pool, id: &ExecutorId) -> Result<Pool> {
    let Some(mut executor) = pool.executors.get(id).cloned() else {
        return Err(Error::InvalidOperation(format!(
            "cannot unregister unknown executor {id}"
        )));
    };
    executor.status = ExecutorStatus::Unregistered;
    pool.executors.insert(id.clone(), executor);
    Ok(pool)
}

/// Advance the task's `lifecycle_phase` and merge `metadata`,
/// incrementing `metadata_version` by one.
///
/// Rejects (`Error::InvalidOperation`) if `lifecycle_phase` would
/// regress the task's current phase, enforcing the monotonicity
/// invariant from spec §3/§9 at this collaborator boundary as well as
/// in the `kill` applier.
pub fn update_task(
    mut pool: Pool,
    id: &TaskId,
    lifecycle_phase: LifecyclePhase,
    metadata: &Metadata,
) -> Result<Pool> {
    let Some(mut task) = pool.tasks.get(id).cloned() else {
        return Err(Error::InvalidOperation(format!("cannot update unknown task {id}")));
    };
    if lifecycle_phase < task.lifecycle_phase {
        return Err(Error::InvalidOperation(format!(
            "task {id} lifecycle phase cannot regress from {:?} to {:?}",
            task.lifecycle_phase, lifecycle_phase
        )));
    }
    task.lifecycle_phase = lifecycle_phase;
    task.metadata.merge(metadata);
    task.metadata_version += 1;
    pool.tasks.insert(id.clone(), task);
    Ok(pool)
}

/// Remove the task from `pool.tasks`, remove its id from the owning
/// executor's `task_ids`, and increment that executor's
/// `task_ids_version`.
pub fn kill_task(mut pool: Pool, id: &TaskId) -> Result<Pool> {
    let Some(task) = pool.tasks.get(id).cloned() else {
        return Err(Error::InvalidOperation(format!("cannot kill unknown task {id}")));
    };
    pool.tasks.remove(id);
    if let Some(mut executor) = pool.executors.get(&task.executor_id).cloned() {
        executor.task_ids.remove(id);
        executor.task_ids_version += 1;
        pool.executors.insert(task.executor_id.clone(), executor);
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphatier_core::Resources;

    #[test]
    fn register_rejects_empty_resources() {
        let pool = Pool::new();
        let result = register(pool, ExecutorId::from("e1"), Resources::empty(), RegisterOptions::default());
        assert!(matches!(result, Err(Error::InvalidResources(_))));
    }

    #[test]
    fn register_rejects_negative_resources() {
        let pool = Pool::new();
        let resources = Resources::from_pairs([("cpu".to_string(), -1.0)]);
        let result = register(pool, ExecutorId::from("e1"), resources, RegisterOptions::default());
        assert!(matches!(result, Err(Error::InvalidResources(_))));
    }

    #[test]
    fn reregistration_overwrites_and_orphans_old_tasks() {
        let pool = Pool::new();
        let resources = Resources::from_pairs([("cpu".to_string(), 8.0)]);
        let old_task = Task {
            id: TaskId::from("t1"),
            executor_id: ExecutorId::from("e1"),
            scheduler_id: alphatier_core::SchedulerId::from("s1"),
            lifecycle_phase: LifecyclePhase::Created,
            resources: Resources::empty(),
            metadata: Metadata::empty(),
            metadata_version: 0,
        };
        let options = RegisterOptions {
            tasks: vec![old_task.clone()],
            ..Default::default()
        };
        let pool = register(pool, ExecutorId::from("e1"), resources.clone(), options).unwrap();
        assert!(pool.tasks.contains_key(&TaskId::from("t1")));

        // Re-register without carrying the old task forward.
        let pool = register(pool, ExecutorId::from("e1"), resources, RegisterOptions::default()).unwrap();
        let executor = pool.executors.get(&ExecutorId::from("e1")).unwrap();
        assert!(executor.task_ids.is_empty());
        // Orphaned, not garbage-collected.
        assert!(pool.tasks.contains_key(&TaskId::from("t1")));
    }

    #[test]
    fn update_task_rejects_phase_regression() {
        let pool = Pool::new();
        let mut pool = pool;
        pool.tasks.insert(
            TaskId::from("t1"),
            Task {
                id: TaskId::from("t1"),
                executor_id: ExecutorId::from("e1"),
                scheduler_id: alphatier_core::SchedulerId::from("s1"),
                lifecycle_phase: LifecyclePhase::Created,
                resources: Resources::empty(),
                metadata: Metadata::empty(),
                metadata_version: 0,
            },
        );
        let result = update_task(pool, &TaskId::from("t1"), LifecyclePhase::Create, &Metadata::empty());
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn kill_task_removes_task_and_bumps_executor_version() {
        let mut pool = Pool::new();
        pool.executors.insert(
            ExecutorId::from("e1"),
            Executor::new(ExecutorId::from("e1"), Resources::from_pairs([("cpu".to_string(), 8.0)])),
        );
        let options = RegisterOptions::default();
        let _ = options;
        let mut executor = pool.executors.get(&ExecutorId::from("e1")).unwrap().clone();
        executor.task_ids.insert(TaskId::from("t1"));
        pool.executors.insert(ExecutorId::from("e1"), executor);
        pool.tasks.insert(
            TaskId::from("t1"),
            Task {
                id: TaskId::from("t1"),
                executor_id: ExecutorId::from("e1"),
                scheduler_id: alphatier_core::SchedulerId::from("s1"),
                lifecycle_phase: LifecyclePhase::Kill,
                resources: Resources::empty(),
                metadata: Metadata::empty(),
                metadata_version: 0,
            },
        );

        let pool = kill_task(pool, &TaskId::from("t1")).unwrap();
        assert!(!pool.tasks.contains_key(&TaskId::from("t1")));
        let executor = pool.executors.get(&ExecutorId::from("e1")).unwrap();
        assert!(!executor.task_ids.contains(&TaskId::from("t1")));
        assert_eq!(executor.task_ids_version, 1);
    }
}
