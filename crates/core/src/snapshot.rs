//! The Snapshot Facility (spec §4.2).

use crate::ids::{ExecutorId, TaskId};
use crate::pool::Pool;
use crate::types::{Executor, Task};
use im::HashMap as ImHashMap;
use serde::{Deserialize, Serialize};

/// An immutable point-in-time view of `{executors, tasks}`.
///
/// Deliberately excludes the constraint registry, so that scheduler code
/// (and constraint implementations themselves) cannot depend on
/// constraint identity. Both fields are persistent maps, so cloning a
/// `Snapshot` is O(1) and later mutations of the originating `Pool` can
/// never alter a `Snapshot` already handed to a reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Executors as of this snapshot.
    pub executors: ImHashMap<ExecutorId, Executor>,
    /// Tasks as of this snapshot.
    pub tasks: ImHashMap<TaskId, Task>,
}

impl Snapshot {
    /// An empty snapshot (no executors, no tasks).
    pub fn empty() -> Self {
        Snapshot {
            executors: ImHashMap::new(),
            tasks: ImHashMap::new(),
        }
    }
}

/// Project `{executors, tasks}` out of a `Pool`, excluding its
/// constraint registry.
pub fn get_snapshot(pool: &Pool) -> Snapshot {
    Snapshot {
        executors: pool.executors.clone(),
        tasks: pool.tasks.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ExecutorId;
    use crate::resources::Resources;
    use crate::types::Executor;

    #[test]
    fn get_snapshot_excludes_constraints_and_is_independent_of_later_mutation() {
        let mut pool = Pool::new();
        pool.executors.insert(
            ExecutorId::from("e1"),
            Executor::new(ExecutorId::from("e1"), Resources::empty()),
        );
        let snap = get_snapshot(&pool);
        assert_eq!(snap.executors.len(), 1);

        // Mutating the pool afterwards must not alter the snapshot.
        pool.executors.insert(
            ExecutorId::from("e2"),
            Executor::new(ExecutorId::from("e2"), Resources::empty()),
        );
        assert_eq!(snap.executors.len(), 1);
        assert_eq!(pool.executors.len(), 2);
    }
}
