//! # Alphatier
//!
//! An in-memory resource-coordination core: multiple independent
//! schedulers mutate a shared pool of executors and the tasks running
//! on them, under configurable consistency constraints.
//!
//! [`PoolStore`] is the entry point. A pool holds executor capacity
//! declarations, the tasks currently assigned against that capacity,
//! and a set of pluggable pre- and post-commit constraints. Schedulers
//! submit batched change proposals (a [`Commit`]); the core validates,
//! transactionally applies, and constraint-checks them with either
//! atomic all-or-nothing or partial-accept semantics.
//!
//! ```
//! use alphatier::{Action, Commit, CommitOptions, ExecutorId, PoolStore, RegisterOptions, Resources, SchedulerId, TaskId};
//!
//! let store = PoolStore::new();
//! store.register(
//!     ExecutorId::from("e1"),
//!     Resources::from_pairs([("cpu".to_string(), 8.0), ("memory".to_string(), 100.0)]),
//!     RegisterOptions::default(),
//! ).unwrap();
//!
//! let action = Action::create(
//!     TaskId::from("t1"),
//!     ExecutorId::from("e1"),
//!     Resources::from_pairs([("cpu".to_string(), 1.0), ("memory".to_string(), 25.0)]),
//! );
//! let commit = Commit::new(SchedulerId::from("s1"), vec![action]);
//! let result = store.commit(commit, CommitOptions::default()).unwrap();
//! assert_eq!(result.accepted_actions.len(), 1);
//! ```
//!
//! Internal crates (`alphatier-core`, `alphatier-concurrency`,
//! `alphatier-constraints`, `alphatier-engine`) are workspace
//! collaborators; [`alphatier_api`]'s public surface, re-exported here
//! in full, is the stable entry point.

pub use alphatier_api::*;
