//! The knowledge base and its fixpoint driver.
//!
//! A [`KnowledgeBase`] owns both peers, the active dependency set (and its
//! inverses) and the labeled-null counter. All state changes go through it.
//!
//! A sync attempt proceeds as follows:
//!
//! ```text
//! Idle -> Materializing -> Rounding -> Committed
//!                              |  ^
//!                              +--+ (changed)
//!                              |
//!                              +-> RolledBack
//! ```
//!
//! 1. Both working images are materialized from the peers' staged facts and
//!    pending edits.
//! 2. Rounds are applied until a round changes nothing or a violation is found.
//!    A round applies every dependency from source to target, then every inverse
//!    from target to source, checking the written peer after each dependency.
//! 3. On success the working images become the new staged baselines.
//!    On violation they are discarded together with all pending edits.
//!
//! # Example
//!
//! ```
//! use tgd_chase::fact::Fact;
//! use tgd_chase::kb::{KnowledgeBase, SyncResult};
//! use tgd_chase::tgd::Atom;
//! use tgd_chase::types::Side;
//!
//! let mut kb = KnowledgeBase::new();
//! kb.define_dependencies(vec![(
//!     vec![Atom::new("T", ["x", "y"])],
//!     vec![Atom::new("U", ["x", "y", "z"])],
//! )])
//! .unwrap();
//! kb.local_insert(Side::Source, Fact::constants("T", ["1", "2"])).unwrap();
//!
//! assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
//! assert_eq!(kb.current_image(Side::Target)[0].to_string(), "U(1, 2, _1)");
//! ```

use std::fmt;

use log::{debug, info};

use crate::chase::{chase_alpha, NullGenerator};
use crate::config::ChaseConfig;
use crate::error::{ChaseError, Violation};
use crate::fact::Fact;
use crate::image::{build_image, check_consistency, PeerState};
use crate::observer::{ChaseObserver, NoopObserver};
use crate::tgd::{Atom, Tgd};
use crate::types::Side;

/// Result of applying every dependency once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    NoChange,
    Changed,
    Violation(Violation),
}

/// Result of a sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// The working images were committed as the new baselines.
    Committed,
    /// A violation was found; nothing was committed and pending edits were dropped.
    RolledBack(Violation),
}

/// Where a sync attempt currently is, or how the last one ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Materializing,
    Rounding,
    Committed,
    RolledBack,
}

/// Two peers, the dependencies relating them and the labeled-null counter.
///
/// # Invariants
///
/// - `inverses[i]` is the inverse of `tgds[i]`
/// - peer facts and pending edits never contain [`Cell::Unbound`][crate::cell::Cell::Unbound]
/// - working images are empty outside of [`run_sync_with`][Self::run_sync_with]
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    config: ChaseConfig,
    source: PeerState,
    target: PeerState,
    source_image: Vec<Fact>,
    target_image: Vec<Fact>,
    tgds: Vec<Tgd>,
    inverses: Vec<Tgd>,
    nulls: NullGenerator,
    phase: SyncPhase,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ChaseConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }

    /// Drops all facts, pending edits and dependencies, and restarts null numbering.
    /// The configuration is kept.
    pub fn reset(&mut self) {
        debug!("reset()");
        let config = std::mem::take(&mut self.config);
        *self = Self::with_config(config);
    }

    /// Replaces the active dependency set.
    ///
    /// Either all dependencies are accepted or none is: on error the previous
    /// set stays active.
    ///
    /// # Errors
    ///
    /// Returns [`ChaseError::InvalidDependency`] if some dependency has an empty side.
    pub fn define_dependencies(&mut self, dependencies: Vec<(Vec<Atom>, Vec<Atom>)>) -> Result<(), ChaseError> {
        let tgds = dependencies
            .into_iter()
            .map(|(lhs, rhs)| Tgd::new(lhs, rhs))
            .collect::<Result<Vec<_>, _>>()?;
        self.inverses = tgds.iter().map(Tgd::inverse).collect();
        self.tgds = tgds;
        for tgd in &self.tgds {
            debug!("define_dependencies: {}", tgd);
        }
        Ok(())
    }

    pub fn dependencies(&self) -> &[Tgd] {
        &self.tgds
    }

    pub fn inverses(&self) -> &[Tgd] {
        &self.inverses
    }

    pub fn peer(&self, side: Side) -> &PeerState {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    fn peer_mut(&mut self, side: Side) -> &mut PeerState {
        match side {
            Side::Source => &mut self.source,
            Side::Target => &mut self.target,
        }
    }

    /// Queues `fact` for insertion on `side`.
    ///
    /// The arity of the fact is not checked against the dependencies; facts of
    /// the wrong arity never match any atom.
    ///
    /// # Errors
    ///
    /// Returns [`ChaseError::UnboundCell`] if some cell of `fact` is unbound.
    pub fn local_insert(&mut self, side: Side, fact: Fact) -> Result<(), ChaseError> {
        debug!("local_insert({}, {})", side, fact);
        let fact = bound(side, fact)?;
        self.peer_mut(side).insert(fact);
        Ok(())
    }

    /// Queues `fact` for deletion on `side`.
    ///
    /// # Errors
    ///
    /// Returns [`ChaseError::UnboundCell`] if some cell of `fact` is unbound.
    pub fn local_delete(&mut self, side: Side, fact: Fact) -> Result<(), ChaseError> {
        debug!("local_delete({}, {})", side, fact);
        let fact = bound(side, fact)?;
        self.peer_mut(side).delete(fact);
        Ok(())
    }

    /// Drops the pending edits of `side` without touching its committed facts.
    pub fn clear_pending(&mut self, side: Side) {
        debug!("clear_pending({})", side);
        self.peer_mut(side).clear_pending();
    }

    /// The committed facts of `side`.
    pub fn current_image(&self, side: Side) -> &[Fact] {
        self.peer(side).staged()
    }

    /// Pending `(inserts, deletes)` of `side`.
    pub fn pending_edits(&self, side: Side) -> (&[Fact], &[Fact]) {
        let peer = self.peer(side);
        (peer.local_insert(), peer.local_delete())
    }

    /// The working image of `side`. Empty outside of a sync attempt.
    pub fn working_image(&self, side: Side) -> &[Fact] {
        match side {
            Side::Source => &self.source_image,
            Side::Target => &self.target_image,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Number of labeled nulls invented so far.
    pub fn null_count(&self) -> u64 {
        self.nulls.count()
    }

    /// Applies every dependency, then every inverse, once.
    ///
    /// Stops at the first dependency whose result violates the local edits of
    /// the peer it wrote to.
    pub fn apply_round(&mut self, observer: &mut dyn ChaseObserver) -> RoundOutcome {
        let mut changed = false;

        for tgd in &self.tgds {
            changed |= chase_alpha(
                &self.source_image,
                &mut self.target_image,
                &mut self.nulls,
                tgd,
                observer,
            );
            if let Err(violation) = check_consistency(&self.target, &self.target_image) {
                debug!("apply_round: {} on {} after {}", violation, Side::Target, tgd);
                return RoundOutcome::Violation(violation);
            }
        }

        for tgd in &self.inverses {
            changed |= chase_alpha(
                &self.target_image,
                &mut self.source_image,
                &mut self.nulls,
                tgd,
                observer,
            );
            if let Err(violation) = check_consistency(&self.source, &self.source_image) {
                debug!("apply_round: {} on {} after {}", violation, Side::Source, tgd);
                return RoundOutcome::Violation(violation);
            }
        }

        if changed {
            RoundOutcome::Changed
        } else {
            RoundOutcome::NoChange
        }
    }

    /// Runs a sync attempt without an observer.
    ///
    /// See [`run_sync_with`][Self::run_sync_with].
    pub fn run_sync(&mut self) -> Result<SyncResult, ChaseError> {
        self.run_sync_with(&mut NoopObserver)
    }

    /// Chases both peers to a fixpoint and commits, or rolls back on violation.
    ///
    /// # Errors
    ///
    /// Returns [`ChaseError::NoSuchFact`] when a pending deletion matches
    /// nothing and the configuration rejects such deletions. In that case
    /// nothing changes: the baselines and the pending edits are kept.
    pub fn run_sync_with(&mut self, observer: &mut dyn ChaseObserver) -> Result<SyncResult, ChaseError> {
        self.phase = SyncPhase::Materializing;
        if let Err(e) = self.materialize() {
            debug!("run_sync: materialization failed: {}", e);
            self.clear_images();
            self.phase = SyncPhase::Idle;
            return Err(e);
        }

        self.phase = SyncPhase::Rounding;
        let mut round = 0;
        loop {
            round += 1;
            let outcome = self.apply_round(observer);
            debug!(
                "run_sync: round {} => {:?} (|source| = {}, |target| = {})",
                round,
                outcome,
                self.source_image.len(),
                self.target_image.len()
            );
            observer.on_round(round, &outcome, &self.source_image, &self.target_image);

            match outcome {
                RoundOutcome::Changed => continue,
                RoundOutcome::NoChange => {
                    self.commit();
                    info!("run_sync: committed after {} rounds", round);
                    return Ok(SyncResult::Committed);
                }
                RoundOutcome::Violation(violation) => {
                    self.rollback();
                    info!("run_sync: rolled back after {} rounds: {}", round, violation);
                    return Ok(SyncResult::RolledBack(violation));
                }
            }
        }
    }

    fn materialize(&mut self) -> Result<(), ChaseError> {
        let missing = self.config.missing_delete;
        self.source_image = build_image(Side::Source, &self.source, missing)?;
        self.target_image = build_image(Side::Target, &self.target, missing)?;
        Ok(())
    }

    fn commit(&mut self) {
        self.source.staged = std::mem::take(&mut self.source_image);
        self.target.staged = std::mem::take(&mut self.target_image);
        if self.config.clear_pending_on_commit {
            self.source.clear_pending();
            self.target.clear_pending();
        } else {
            self.source.mark_deletes_applied();
            self.target.mark_deletes_applied();
        }
        self.phase = SyncPhase::Committed;
    }

    fn rollback(&mut self) {
        self.clear_images();
        self.source.clear_pending();
        self.target.clear_pending();
        self.phase = SyncPhase::RolledBack;
    }

    fn clear_images(&mut self) {
        self.source_image.clear();
        self.target_image.clear();
    }
}

fn bound(side: Side, fact: Fact) -> Result<Fact, ChaseError> {
    if fact.is_placeholder() {
        Err(ChaseError::UnboundCell { side, fact })
    } else {
        Ok(fact)
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dependencies ({}):", self.tgds.len())?;
        for tgd in &self.tgds {
            writeln!(f, "  {}", tgd)?;
        }
        for side in [Side::Source, Side::Target] {
            writeln!(f, "--- {} ---", side)?;
            write!(f, "{}", self.peer(side))?;
        }
        Ok(())
    }
}
