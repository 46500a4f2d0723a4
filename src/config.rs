//! Configuration of a [`KnowledgeBase`][crate::kb::KnowledgeBase].

/// What to do with a pending deletion that matches no fact of the image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum MissingDelete {
    /// Log a warning and carry on.
    #[default]
    Ignore,
    /// Fail the sync with [`ChaseError::NoSuchFact`][crate::error::ChaseError::NoSuchFact].
    ///
    /// Deletions already applied by an earlier commit and kept queued
    /// (see [`ChaseConfig::clear_pending_on_commit`]) are not checked again.
    Reject,
}

/// Configuration for sync attempts.
///
/// # Example
///
/// ```
/// use tgd_chase::config::{ChaseConfig, MissingDelete};
/// use tgd_chase::kb::KnowledgeBase;
///
/// let config = ChaseConfig {
///     missing_delete: MissingDelete::Reject,
///     ..ChaseConfig::default()
/// };
/// let kb = KnowledgeBase::with_config(config);
/// assert!(kb.config().clear_pending_on_commit);
/// ```
#[derive(Debug, Clone)]
pub struct ChaseConfig {
    /// Clear pending local edits after a successful commit (default: true).
    /// When false, edits stay queued and are replayed into every following
    /// materialization until [`KnowledgeBase::clear_pending`][crate::kb::KnowledgeBase::clear_pending]
    /// is called.
    pub clear_pending_on_commit: bool,
    /// Handling of deletions with nothing to delete (default: [`MissingDelete::Ignore`]).
    pub missing_delete: MissingDelete,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            clear_pending_on_commit: true,
            missing_delete: MissingDelete::Ignore,
        }
    }
}
