//! Action Appliers (spec §4.5).
//!
//! By the time an applier runs, Commit Engine Step 0 has already proven
//! referential integrity (targets exist, executors exist), so appliers
//! have no user-reachable *validation* failure mode. The `kill` applier
//! still returns a `Result` because it enforces the lifecycle
//! monotonicity invariant (spec §3, §9) — the one applier-level
//! invariant Step 0 cannot check syntactically.

use alphatier_core::{Action, ActionKind, Error, LifecyclePhase, Pool, Result, SchedulerId};

/// Construct a new `Task` from a `create` action and insert it.
///
/// Appends the new task's id to the target executor's `task_ids` and
/// increments that executor's `task_ids_version`.
pub fn create(mut pool: Pool, scheduler_id: &SchedulerId, action: &Action) -> Result<Pool> {
    let ActionKind::Create {
        executor_id,
        resources,
        metadata,
    } = &action.kind
    else {
        panic!("appliers::create called with a non-create action");
    };

    let task = alphatier_core::Task {
        id: action.id.clone(),
        executor_id: executor_id.clone(),
        scheduler_id: scheduler_id.clone(),
        lifecycle_phase: LifecyclePhase::Create,
        resources: resources.clone(),
        metadata: metadata.clone().unwrap_or_default(),
        metadata_version: 0,
    };
    pool.tasks.insert(task.id.clone(), task);

    if let Some(executor) = pool.executors.get(executor_id).cloned() {
        let mut executor = executor;
        executor.task_ids.insert(action.id.clone());
        executor.task_ids_version += 1;
        pool.executors.insert(executor_id.clone(), executor);
    }

    Ok(pool)
}

/// Deep-merge `action`'s metadata into the target task; increments its
/// `metadata_version`. Does not touch lifecycle.
pub fn update(mut pool: Pool, _scheduler_id: &SchedulerId, action: &Action) -> Result<Pool> {
    let ActionKind::Update { metadata } = &action.kind else {
        panic!("appliers::update called with a non-update action");
    };

    if let Some(mut task) = pool.tasks.get(&action.id).cloned() {
        task.metadata.merge(metadata);
        task.metadata_version += 1;
        pool.tasks.insert(action.id.clone(), task);
    }
    Ok(pool)
}

/// Set the target task's `lifecycle_phase` to `Kill`. Does not delete
/// the task — the owning executor removes it later via `kill_task`.
///
/// Rejects (`Error::InvalidOperation`) if the task's current phase is
/// already past `Kill` (i.e. `Killing`), which would be a regression.
pub fn kill(mut pool: Pool, _scheduler_id: &SchedulerId, action: &Action) -> Result<Pool> {
    if let Some(mut task) = pool.tasks.get(&action.id).cloned() {
        if task.lifecycle_phase > LifecyclePhase::Kill {
            return Err(Error::InvalidOperation(format!(
                "task {} lifecycle phase cannot regress from {:?} to Kill",
                action.id, task.lifecycle_phase
            )));
        }
        task.lifecycle_phase = LifecyclePhase::Kill;
        pool.tasks.insert(action.id.clone(), task);
    }
    Ok(pool)
}

/// Apply `action` using the applier matching its type.
pub fn apply(pool: Pool, scheduler_id: &SchedulerId, action: &Action) -> Result<Pool> {
    match &action.kind {
        ActionKind::Create { .. } => create(pool, scheduler_id, action),
        ActionKind::Update { .. } => update(pool, scheduler_id, action),
        ActionKind::Kill => kill(pool, scheduler_id, action),
    }
}
