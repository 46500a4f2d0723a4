//! Peer fact-bases and their materialized images.
//!
//! A peer keeps its last committed baseline (`staged`) apart from the edits
//! made since (`local_insert`, `local_delete`). The **image** of a peer is what
//! the peer would look like if its edits were applied: staged facts, plus
//! inserted facts not already present, minus the first matching occurrence of
//! every deleted fact.

use std::fmt;

use log::{debug, warn};

use crate::config::MissingDelete;
use crate::error::{ChaseError, Violation};
use crate::fact::{contains, position_of, Fact};
use crate::types::Side;

/// The committed facts of one peer together with its pending local edits.
///
/// # Invariants
///
/// - `staged` only changes on commit
/// - the first `applied_deletes` entries of `local_delete` were already
///   applied by a commit and are only kept because edits are durable
#[derive(Debug, Clone, Default)]
pub struct PeerState {
    pub(crate) staged: Vec<Fact>,
    pub(crate) local_insert: Vec<Fact>,
    pub(crate) local_delete: Vec<Fact>,
    pub(crate) applied_deletes: usize,
}

impl PeerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a peer whose committed baseline is `staged`.
    pub fn with_staged(staged: Vec<Fact>) -> Self {
        Self {
            staged,
            ..Self::default()
        }
    }

    pub fn staged(&self) -> &[Fact] {
        &self.staged
    }
    pub fn local_insert(&self) -> &[Fact] {
        &self.local_insert
    }
    pub fn local_delete(&self) -> &[Fact] {
        &self.local_delete
    }

    /// Queues a fact for insertion.
    pub fn insert(&mut self, fact: Fact) {
        self.local_insert.push(fact);
    }

    /// Queues a fact for deletion.
    pub fn delete(&mut self, fact: Fact) {
        self.local_delete.push(fact);
    }

    pub fn has_pending(&self) -> bool {
        !self.local_insert.is_empty() || !self.local_delete.is_empty()
    }

    pub fn clear_pending(&mut self) {
        self.local_insert.clear();
        self.local_delete.clear();
        self.applied_deletes = 0;
    }

    /// Marks every queued deletion as applied by a commit.
    pub(crate) fn mark_deletes_applied(&mut self) {
        self.applied_deletes = self.local_delete.len();
    }

    pub fn clear(&mut self) {
        self.staged.clear();
        self.clear_pending();
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, facts) in [
            ("staged", &self.staged),
            ("local insert", &self.local_insert),
            ("local delete", &self.local_delete),
        ] {
            writeln!(f, "{} ({}):", title, facts.len())?;
            for fact in facts {
                writeln!(f, "  {}", fact)?;
            }
        }
        Ok(())
    }
}

/// Materializes the image of `peer`.
///
/// Inserting a fact that is already present is a no-op.
/// Deleting a fact that is absent is handled according to `missing`.
///
/// # Errors
///
/// Returns [`ChaseError::NoSuchFact`] if a deletion has nothing to delete and
/// `missing` is [`MissingDelete::Reject`].
pub fn build_image(side: Side, peer: &PeerState, missing: MissingDelete) -> Result<Vec<Fact>, ChaseError> {
    let (image, unmatched) = materialize(peer);

    if let Some(fact) = unmatched.first() {
        match missing {
            MissingDelete::Ignore => {
                for fact in &unmatched {
                    warn!("build_image({}): nothing to delete for {}", side, fact);
                }
            }
            MissingDelete::Reject => {
                return Err(ChaseError::NoSuchFact {
                    side,
                    fact: (*fact).clone(),
                });
            }
        }
    }

    debug!(
        "build_image({}): {} staged, +{}, -{} => {} facts",
        side,
        peer.staged.len(),
        peer.local_insert.len(),
        peer.local_delete.len(),
        image.len()
    );
    Ok(image)
}

/// Applies the pending edits of `peer` to its baseline.
/// Also returns the deletions that matched nothing, except those already applied.
fn materialize(peer: &PeerState) -> (Vec<Fact>, Vec<&Fact>) {
    let mut image = peer.staged.clone();
    let mut unmatched = Vec::new();

    for fact in &peer.local_insert {
        if !contains(&image, fact) {
            image.push(fact.clone());
        }
    }
    for (k, fact) in peer.local_delete.iter().enumerate() {
        match position_of(&image, fact) {
            Some(i) => {
                image.remove(i);
            }
            None if k < peer.applied_deletes => {}
            None => unmatched.push(fact),
        }
    }

    (image, unmatched)
}

/// Checks a post-chase image of `peer` against its local edits.
///
/// The chase may add facts, but it may neither re-derive a fact the peer asked
/// to delete, nor lose a fact of the pre-chase image.
pub fn check_consistency(peer: &PeerState, result: &[Fact]) -> Result<(), Violation> {
    if let Some(fact) = result.iter().find(|f| contains(&peer.local_delete, f)) {
        debug!("check_consistency: re-derived deleted fact {}", fact);
        return Err(Violation::Deletion(fact.clone()));
    }

    let (base, _) = materialize(peer);
    if let Some(fact) = base.iter().find(|f| !contains(result, f)) {
        debug!("check_consistency: lost fact {}", fact);
        return Err(Violation::Insertion(fact.clone()));
    }

    Ok(())
}
