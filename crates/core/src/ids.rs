//! Opaque identifier newtypes.
//!
//! The spec treats `executor_id`, `task_id`, `scheduler_id`, and
//! constraint `name` as "any hashable value" supplied by the caller. A
//! `String`-backed newtype keeps them distinguishable at the type level
//! (an `ExecutorId` can never be passed where a `TaskId` is expected)
//! while staying as transparent as possible for callers who already have
//! a string identifier from their own scheduler.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }
    };
}

opaque_id!(ExecutorId, "Identifier of an `Executor` within a `Pool`.");
opaque_id!(TaskId, "Identifier of a `Task` within a `Pool`.");
opaque_id!(
    SchedulerId,
    "Identifier of the scheduler submitting a `Commit`."
);
opaque_id!(
    ConstraintName,
    "Identifier of a registered pre- or post-constraint."
);
