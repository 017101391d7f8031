//! The Constraint Registry (spec §4.4): generic mechanics only.
//!
//! Built-in constraint *implementations* (`optimistic-locking`,
//! `no-resource-overbooking`) live in the `alphatier-constraints` crate,
//! which depends on this one. Keeping the mechanics here and the
//! built-ins there lets `Pool` (which must own a registry field) stay
//! free of a dependency on the crate that implements the built-ins.

use crate::ids::ConstraintName;
use crate::types::{Action, Commit};
use im::HashMap as ImHashMap;
use std::fmt;
use std::sync::Arc;

use crate::snapshot::Snapshot;

/// Which phase a constraint runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Runs before Step 2 (apply), against the pre-snapshot only.
    Pre,
    /// Runs after Step 2 (apply), against both snapshots.
    Post,
}

/// A pure predicate evaluated before applier execution.
///
/// Implementations must be side-effect-free: the spec requires
/// constraints to be safely re-invocable, and this design's
/// single-writer-lock `StateStore` may hold `f` inside a critical
/// section where re-entrancy assumptions matter.
pub trait PreConstraint: Send + Sync {
    /// Return the actions this constraint rejects.
    fn evaluate(&self, commit: &Commit, pre_snapshot: &Snapshot) -> Vec<Action>;
}

/// A pure predicate evaluated after applier execution.
pub trait PostConstraint: Send + Sync {
    /// Return the actions this constraint rejects.
    fn evaluate(&self, commit: &Commit, pre_snapshot: &Snapshot, post_snapshot: &Snapshot)
        -> Vec<Action>;
}

impl<F> PreConstraint for F
where
    F: Fn(&Commit, &Snapshot) -> Vec<Action> + Send + Sync,
{
    fn evaluate(&self, commit: &Commit, pre_snapshot: &Snapshot) -> Vec<Action> {
        (self)(commit, pre_snapshot)
    }
}

impl<F> PostConstraint for F
where
    F: Fn(&Commit, &Snapshot, &Snapshot) -> Vec<Action> + Send + Sync,
{
    fn evaluate(
        &self,
        commit: &Commit,
        pre_snapshot: &Snapshot,
        post_snapshot: &Snapshot,
    ) -> Vec<Action> {
        (self)(commit, pre_snapshot, post_snapshot)
    }
}

/// The registry of named pre- and post-constraints installed on a `Pool`.
///
/// The pair `(kind, name)` uniquely identifies a constraint; re-adding
/// under the same name replaces the previous registration.
#[derive(Clone)]
pub struct ConstraintRegistry {
    pre: ImHashMap<ConstraintName, Arc<dyn PreConstraint>>,
    post: ImHashMap<ConstraintName, Arc<dyn PostConstraint>>,
}

impl ConstraintRegistry {
    /// An empty registry (no pre- or post-constraints installed).
    pub fn empty() -> Self {
        ConstraintRegistry {
            pre: ImHashMap::new(),
            post: ImHashMap::new(),
        }
    }

    /// Register (or replace) a pre-constraint under `name`.
    pub fn add_pre(&mut self, name: ConstraintName, constraint: Arc<dyn PreConstraint>) {
        self.pre.insert(name, constraint);
    }

    /// Register (or replace) a post-constraint under `name`.
    pub fn add_post(&mut self, name: ConstraintName, constraint: Arc<dyn PostConstraint>) {
        self.post.insert(name, constraint);
    }

    /// Remove a pre-constraint by name, if present.
    pub fn del_pre(&mut self, name: &ConstraintName) {
        self.pre.remove(name);
    }

    /// Remove a post-constraint by name, if present.
    pub fn del_post(&mut self, name: &ConstraintName) {
        self.post.remove(name);
    }

    /// Iterate all registered pre-constraints as `(name, constraint)` pairs.
    pub fn iter_pre(&self) -> impl Iterator<Item = (&ConstraintName, &Arc<dyn PreConstraint>)> {
        self.pre.iter()
    }

    /// Iterate all registered post-constraints as `(name, constraint)` pairs.
    pub fn iter_post(&self) -> impl Iterator<Item = (&ConstraintName, &Arc<dyn PostConstraint>)> {
        self.post.iter()
    }

    /// Names of currently registered pre-constraints.
    pub fn pre_names(&self) -> Vec<ConstraintName> {
        self.pre.keys().cloned().collect()
    }

    /// Names of currently registered post-constraints.
    pub fn post_names(&self) -> Vec<ConstraintName> {
        self.post.keys().cloned().collect()
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintRegistry")
            .field("pre", &self.pre_names())
            .field("post", &self.post_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TaskId;

    #[test]
    fn add_under_same_name_replaces() {
        let mut reg = ConstraintRegistry::empty();
        let name = ConstraintName::from("always-reject-first");
        reg.add_pre(
            name.clone(),
            Arc::new(|commit: &Commit, _snap: &Snapshot| {
                commit.actions.first().cloned().into_iter().collect()
            }),
        );
        reg.add_pre(name.clone(), Arc::new(|_: &Commit, _: &Snapshot| Vec::new()));
        assert_eq!(reg.pre_names(), vec![name]);
        let commit = Commit::new(
            crate::ids::SchedulerId::from("s1"),
            vec![Action::kill(TaskId::from("t1"))],
        );
        let (_, constraint) = reg.iter_pre().next().unwrap();
        assert!(constraint.evaluate(&commit, &Snapshot::empty()).is_empty());
    }
}
