//! Error types for Alphatier.
//!
//! Three kinds, per spec §7:
//! 1. Programmer errors — bad API use or malformed commits, caught
//!    synchronously and never retried by the core.
//! 2. Constraint rejections — surfaced with the partial [`CommitResult`]
//!    so the caller can inspect the per-constraint breakdown.
//! 3. Transactional retry — invisible to callers; this design's
//!    single-writer lock (`alphatier-concurrency`) never retries, so
//!    there is no variant for it.

use crate::types::CommitResult;
use thiserror::Error;

/// Result type alias for Alphatier operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the Alphatier core.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised by executor registration when `resources` is empty or any
    /// value is non-numeric (NaN, infinite, or negative).
    #[error("Invalid resources: {0}")]
    InvalidResources(String),

    /// Raised by Commit Engine Step 0 (syntactic validation). The
    /// message is one of the exact reason strings from spec §4.6 and is
    /// matched verbatim by tests.
    #[error("{0}")]
    ValidationFailure(String),

    /// Raised when an operation would violate an invariant the core
    /// enforces directly, such as lifecycle-phase monotonicity.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A commit aborted because the rejection-arbitration rule fired.
    /// Carries the partially-filled `CommitResult` (with `post_snapshot`
    /// `None` if the commit aborted in the pre-constraint phase).
    ///
    /// Boxed to keep `Error` small on the stack — the same reasoning the
    /// teacher applies to other large error payloads kept behind an
    /// indirection rather than inlined into every match arm.
    #[error("commit rejected: {1} action(s) rejected of {2} submitted")]
    Rejected(Box<CommitResult>, usize, usize),
}

impl Error {
    /// Whether this error represents a constraint rejection (kind 2).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Rejected(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_preserves_exact_reason_string() {
        let err = Error::ValidationFailure("Commit contains duplicate tasks".to_string());
        assert_eq!(err.to_string(), "Commit contains duplicate tasks");
    }

    #[test]
    fn is_rejection_only_matches_rejected_variant() {
        assert!(!Error::InvalidResources("x".into()).is_rejection());
        assert!(!Error::InvalidOperation("x".into()).is_rejection());
    }
}
