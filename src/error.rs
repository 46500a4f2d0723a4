//! Error types reported to callers.
//!
//! Search pruning (join mismatches, inconsistent completions) is not an error
//! and never shows up here.

use thiserror::Error;

use crate::fact::Fact;
use crate::types::Side;

/// Errors returned by [`KnowledgeBase`][crate::kb::KnowledgeBase] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChaseError {
    /// A dependency with an empty left or right pattern.
    #[error("invalid dependency: {0}")]
    InvalidDependency(String),
    /// A pending deletion has no matching fact in the materialized image.
    ///
    /// Only reported under [`MissingDelete::Reject`][crate::config::MissingDelete::Reject].
    #[error("no such fact on {side}: {fact}")]
    NoSuchFact { side: Side, fact: Fact },
    /// A local edit carrying an unbound cell. Peer facts must be fully bound.
    #[error("unbound cell in local edit on {side}: {fact}")]
    UnboundCell { side: Side, fact: Fact },
}

/// A consequence of the dependencies that contradicts a local edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// A fact requested for deletion was derived again.
    #[error("violation on local deletion: {0}")]
    Deletion(Fact),
    /// A fact of the pre-chase image disappeared.
    #[error("violation on local insertion: {0}")]
    Insertion(Fact),
}

impl Violation {
    pub fn fact(&self) -> &Fact {
        match self {
            Violation::Deletion(fact) | Violation::Insertion(fact) => fact,
        }
    }
}
