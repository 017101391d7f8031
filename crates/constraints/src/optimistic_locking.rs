//! Built-in pre-constraint: `optimistic-locking` (spec §4.4.1).

use alphatier_core::{Action, ActionKind, Commit, ExecutorId, PreConstraint, Snapshot};

/// Registry name this constraint is installed under.
pub const OPTIMISTIC_LOCKING: &str = "optimistic-locking";

/// Rejects any action whose version probes (`executor_metadata_version`,
/// `executor_task_ids_version`, `metadata_version`) disagree with the
/// pre-snapshot. Actions carrying no probes are never rejected by this
/// constraint.
pub struct OptimisticLocking;

impl OptimisticLocking {
    /// The executor a given action's probes should be checked against:
    /// `Create` names its own target executor directly; `Update`/`Kill`
    /// inherit the executor already owning the pre-existing task (Step 0
    /// has already proven this task exists).
    fn target_executor_id<'a>(action: &'a Action, pre_snapshot: &'a Snapshot) -> Option<&'a ExecutorId> {
        match &action.kind {
            ActionKind::Create { executor_id, .. } => Some(executor_id),
            ActionKind::Update { .. } | ActionKind::Kill => {
                pre_snapshot.tasks.get(&action.id).map(|t| &t.executor_id)
            }
        }
    }
}

impl PreConstraint for OptimisticLocking {
    fn evaluate(&self, commit: &Commit, pre_snapshot: &Snapshot) -> Vec<Action> {
        commit
            .actions
            .iter()
            .filter(|action| {
                let executor_stale = action.executor_metadata_version.is_some_and(|expected| {
                    Self::target_executor_id(action, pre_snapshot)
                        .and_then(|id| pre_snapshot.executors.get(id))
                        .is_some_and(|executor| executor.metadata_version != expected)
                });
                let task_ids_stale = action.executor_task_ids_version.is_some_and(|expected| {
                    Self::target_executor_id(action, pre_snapshot)
                        .and_then(|id| pre_snapshot.executors.get(id))
                        .is_some_and(|executor| executor.task_ids_version != expected)
                });
                let task_metadata_stale = action.metadata_version.is_some_and(|expected| {
                    pre_snapshot
                        .tasks
                        .get(&action.id)
                        .is_some_and(|task| task.metadata_version != expected)
                });
                executor_stale || task_ids_stale || task_metadata_stale
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphatier_core::{Executor, Resources, SchedulerId, TaskId};

    fn snapshot_with_executor(metadata_version: u64) -> Snapshot {
        let mut snap = Snapshot::empty();
        let mut executor = Executor::new(ExecutorId::from("e1"), Resources::empty());
        executor.metadata_version = metadata_version;
        snap.executors.insert(ExecutorId::from("e1"), executor);
        snap
    }

    #[test]
    fn rejects_create_with_stale_executor_metadata_version() {
        let snap = snapshot_with_executor(1);
        let mut action = Action::create(TaskId::from("t1"), ExecutorId::from("e1"), Resources::empty());
        action.executor_metadata_version = Some(0);
        let commit = Commit::new(SchedulerId::from("s1"), vec![action.clone()]);

        let rejected = OptimisticLocking.evaluate(&commit, &snap);
        assert_eq!(rejected, vec![action]);
    }

    #[test]
    fn ignores_actions_with_no_probes() {
        let snap = snapshot_with_executor(5);
        let action = Action::create(TaskId::from("t1"), ExecutorId::from("e1"), Resources::empty());
        let commit = Commit::new(SchedulerId::from("s1"), vec![action]);
        assert!(OptimisticLocking.evaluate(&commit, &snap).is_empty());
    }

    #[test]
    fn matching_probe_is_accepted() {
        let snap = snapshot_with_executor(3);
        let mut action = Action::create(TaskId::from("t1"), ExecutorId::from("e1"), Resources::empty());
        action.executor_metadata_version = Some(3);
        let commit = Commit::new(SchedulerId::from("s1"), vec![action]);
        assert!(OptimisticLocking.evaluate(&commit, &snap).is_empty());
    }
}
