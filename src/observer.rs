//! Optional trace hooks for a sync attempt.
//!
//! Observers see every batch of synthesized facts and the outcome of every
//! round. They cannot influence the chase.

use crate::fact::Fact;
use crate::kb::RoundOutcome;
use crate::tgd::Tgd;

pub trait ChaseObserver {
    /// Called after `facts` were synthesized for `tgd` and before they are
    /// added to the working image.
    fn on_insert(&mut self, _tgd: &Tgd, _facts: &[Fact]) {}

    /// Called after each round with the current working images.
    fn on_round(&mut self, _round: usize, _outcome: &RoundOutcome, _source: &[Fact], _target: &[Fact]) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopObserver;

impl ChaseObserver for NoopObserver {}
