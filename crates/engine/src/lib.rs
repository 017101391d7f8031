//! The Commit Engine and its collaborators (spec §4.3, §4.5, §4.6): the
//! only workspace member that depends on both `alphatier-concurrency`
//! (the State Store) and `alphatier-core` (the data model and
//! constraint-registry mechanics).
//!
//! Built-in constraints themselves live in `alphatier-constraints`,
//! pulled in here only as a dev-dependency for scenario/property tests —
//! the engine's own code only ever calls through
//! `ConstraintRegistry::iter_pre`/`iter_post`, never a concrete built-in
//! directly.

#![warn(missing_docs)]

pub mod appliers;
pub mod commit_engine;
pub mod executor_ops;

pub use commit_engine::{commit, commit_against_pool, CommitOptions};
