//! Built-in post-constraint: `no-resource-overbooking` (spec §4.4.2).

use alphatier_core::{Action, ActionKind, Commit, ExecutorId, PostConstraint, Resources, Snapshot};
use im::HashMap as ImHashMap;

/// Registry name this constraint is installed under.
pub const NO_RESOURCE_OVERBOOKING: &str = "no-resource-overbooking";

/// Rejects `create` actions that would push an executor's running
/// reservation total past its declared capacity on any resource
/// dimension.
///
/// Processes the commit's `create` actions in commit-submission order,
/// per executor, maintaining a running reservation seeded from the
/// pre-snapshot's existing task reservations. Rejection is sticky
/// within the pass: a rejected action's reservation is never added to
/// the running total, so a resource that is already saturated keeps
/// rejecting subsequent creates that need it.
pub struct NoResourceOverbooking;

impl PostConstraint for NoResourceOverbooking {
    fn evaluate(&self, commit: &Commit, pre_snapshot: &Snapshot, _post_snapshot: &Snapshot) -> Vec<Action> {
        let mut running: ImHashMap<ExecutorId, Resources> = ImHashMap::new();
        for task in pre_snapshot.tasks.values() {
            running
                .entry(task.executor_id.clone())
                .and_modify(|r| *r = r.add(&task.resources))
                .or_insert_with(|| task.resources.clone());
        }

        let mut rejected = Vec::new();
        for action in &commit.actions {
            let ActionKind::Create {
                executor_id,
                resources,
                ..
            } = &action.kind
            else {
                continue;
            };

            let Some(capacity) = pre_snapshot.executors.get(executor_id).map(|e| &e.resources)
            else {
                // Step 0 has already proven the target executor exists.
                continue;
            };

            let baseline = running
                .get(executor_id)
                .cloned()
                .unwrap_or_else(Resources::empty);
            let candidate = baseline.add(resources);

            if candidate.fits_within(capacity) {
                running.insert(executor_id.clone(), candidate);
            } else {
                rejected.push(action.clone());
            }
        }
        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphatier_core::{Executor, SchedulerId, TaskId};

    fn pool_snapshot(cpu: f64, memory: f64) -> Snapshot {
        let mut snap = Snapshot::empty();
        let resources = Resources::from_pairs([("cpu".to_string(), cpu), ("memory".to_string(), memory)]);
        snap.executors
            .insert(ExecutorId::from("e1"), Executor::new(ExecutorId::from("e1"), resources));
        snap
    }

    #[test]
    fn third_create_exceeding_capacity_is_rejected() {
        let snap = pool_snapshot(8.0, 100.0);
        let r = |cpu: f64, mem: f64| Resources::from_pairs([("cpu".to_string(), cpu), ("memory".to_string(), mem)]);
        let actions = vec![
            Action::create(TaskId::from("t1"), ExecutorId::from("e1"), r(1.0, 50.0)),
            Action::create(TaskId::from("t2"), ExecutorId::from("e1"), r(1.0, 50.0)),
            Action::create(TaskId::from("t3"), ExecutorId::from("e1"), r(1.0, 1.0)),
        ];
        let commit = Commit::new(SchedulerId::from("s1"), actions.clone());
        let rejected = NoResourceOverbooking.evaluate(&commit, &snap, &snap);
        assert_eq!(rejected, vec![actions[2].clone()]);
    }

    #[test]
    fn baseline_counts_pre_existing_reservations() {
        let mut snap = pool_snapshot(8.0, 100.0);
        let mut pre_task = alphatier_core::Task {
            id: TaskId::from("existing"),
            executor_id: ExecutorId::from("e1"),
            scheduler_id: SchedulerId::from("s0"),
            lifecycle_phase: alphatier_core::LifecyclePhase::Created,
            resources: Resources::from_pairs([("cpu".to_string(), 7.0), ("memory".to_string(), 10.0)]),
            metadata: alphatier_core::Metadata::empty(),
            metadata_version: 0,
        };
        pre_task.id = TaskId::from("existing");
        snap.tasks.insert(TaskId::from("existing"), pre_task);

        let action = Action::create(
            TaskId::from("t1"),
            ExecutorId::from("e1"),
            Resources::from_pairs([("cpu".to_string(), 2.0), ("memory".to_string(), 1.0)]),
        );
        let commit = Commit::new(SchedulerId::from("s1"), vec![action.clone()]);
        let rejected = NoResourceOverbooking.evaluate(&commit, &snap, &snap);
        assert_eq!(rejected, vec![action]);
    }
}
