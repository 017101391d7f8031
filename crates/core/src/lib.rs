//! Data model for Alphatier: the in-memory resource-coordination core.
//!
//! This crate has no dependency on any other workspace member. It defines
//! the value types schedulers exchange with the core (`Resources`,
//! `Executor`, `Task`, `Action`, `Commit`), the top-level `Pool` container,
//! the `Snapshot` projection, the generic constraint-registry mechanics, and
//! the crate-wide `Error` type.
//!
//! Built-in constraint *implementations* live in `alphatier-constraints`;
//! this crate only defines the `PreConstraint` / `PostConstraint` traits and
//! the registry that holds them.

#![warn(missing_docs)]

pub mod error;
pub mod ids;
pub mod metadata;
pub mod pool;
pub mod registry;
pub mod resources;
pub mod snapshot;
pub mod types;

pub use error::{Error, Result};
pub use ids::{ConstraintName, ExecutorId, SchedulerId, TaskId};
pub use metadata::{Metadata, MetadataValue};
pub use pool::Pool;
pub use registry::{ConstraintKind, ConstraintRegistry, PostConstraint, PreConstraint};
pub use resources::Resources;
pub use snapshot::{get_snapshot, Snapshot};
pub use types::{
    Action, ActionKind, ActionType, Commit, CommitResult, Executor, ExecutorStatus,
    LifecyclePhase, Task,
};
