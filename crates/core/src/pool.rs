//! `Pool`: the top-level in-memory container (spec §3).

use crate::ids::{ExecutorId, TaskId};
use crate::registry::ConstraintRegistry;
use crate::snapshot::Snapshot;
use crate::types::{Executor, Task};
use im::HashMap as ImHashMap;

/// The full state a `StateStore` (in `alphatier-concurrency`) guards:
/// executors, tasks, and the installed constraint registry.
///
/// `Pool` is a plain value type. Its `executors`/`tasks` maps are
/// persistent (`im::HashMap`), so cloning a `Pool` — which the State
/// Store does on every `read()` and at the start of every `mutate()` —
/// is O(1) rather than a deep copy; only the specific entries a
/// transaction touches are ever reallocated.
#[derive(Clone, Debug)]
pub struct Pool {
    /// All registered (and formerly-registered) executors, by id.
    pub executors: ImHashMap<ExecutorId, Executor>,
    /// All tasks not yet removed by `kill_task`, by id.
    pub tasks: ImHashMap<TaskId, Task>,
    /// Installed pre- and post-constraints.
    pub constraints: ConstraintRegistry,
}

impl Pool {
    /// An empty pool with an empty constraint registry.
    ///
    /// Callers that want the two built-in constraints preinstalled
    /// (the normal case) should go through
    /// `alphatier_api::PoolStore::new()`, which calls
    /// `alphatier_constraints::install_builtins` on a pool built this
    /// way — keeping this crate free of a dependency on the crate that
    /// implements the built-ins.
    pub fn new() -> Self {
        Pool {
            executors: ImHashMap::new(),
            tasks: ImHashMap::new(),
            constraints: ConstraintRegistry::empty(),
        }
    }

    /// Rebuild a pool from a `Snapshot`, carrying no constraints.
    ///
    /// This is the core half of spec §6's `create_with_snapshot`; the
    /// full operation (which also installs the default built-ins) lives
    /// in `alphatier-api`, since only that crate depends on both this
    /// one and `alphatier-constraints`.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Pool {
            executors: snapshot.executors,
            tasks: snapshot.tasks,
            constraints: ConstraintRegistry::empty(),
        }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resources;
    use crate::snapshot::get_snapshot;

    #[test]
    fn from_snapshot_round_trips_executors_and_tasks() {
        let mut pool = Pool::new();
        pool.executors.insert(
            ExecutorId::from("e1"),
            Executor::new(ExecutorId::from("e1"), Resources::empty()),
        );
        let snap = get_snapshot(&pool);
        let rebuilt = Pool::from_snapshot(snap.clone());
        assert_eq!(get_snapshot(&rebuilt), snap);
    }
}
