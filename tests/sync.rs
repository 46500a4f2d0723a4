//! End-to-end tests for sync attempts.
//!
//! Tests cover existential invention, joins, reference propagation,
//! minimization, idempotence and rollback.

use tgd_chase::cell::Cell;
use tgd_chase::error::{ChaseError, Violation};
use tgd_chase::fact::Fact;
use tgd_chase::kb::{KnowledgeBase, RoundOutcome, SyncPhase, SyncResult};
use tgd_chase::observer::ChaseObserver;
use tgd_chase::syntax::{parse_dependencies, parse_fact};
use tgd_chase::tgd::Tgd;
use tgd_chase::types::Side;

fn kb_with(rules: &str) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.define_dependencies(parse_dependencies(rules).unwrap()).unwrap();
    kb
}

fn fact(text: &str) -> Fact {
    parse_fact(text).unwrap()
}

fn facts(kb: &KnowledgeBase, side: Side) -> Vec<String> {
    kb.current_image(side).iter().map(|f| f.to_string()).collect()
}

#[derive(Default)]
struct Counter {
    inserts: usize,
    rounds: Vec<RoundOutcome>,
}

impl ChaseObserver for Counter {
    fn on_insert(&mut self, _tgd: &Tgd, facts: &[Fact]) {
        self.inserts += facts.len();
    }
    fn on_round(&mut self, _round: usize, outcome: &RoundOutcome, _source: &[Fact], _target: &[Fact]) {
        self.rounds.push(outcome.clone());
    }
}

// ─── Existential Invention ─────────────────────────────────────────────────────

#[test]
fn existential_invention() {
    let mut kb = kb_with("T(x, y) -> U(x, y, z)");
    kb.local_insert(Side::Source, fact("T(1, 2)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);

    let target = kb.current_image(Side::Target);
    assert_eq!(target.len(), 1);
    let u = &target[0];
    assert_eq!(u.relation, "U");
    assert_eq!(u.cells[0], Cell::constant("1"));
    assert_eq!(u.cells[1], Cell::constant("2"));
    assert!(u.cells[2].is_variable());

    // The inverse finds T(1, 2) already there.
    assert_eq!(facts(&kb, Side::Source), ["T(1, 2)"]);
    assert_eq!(kb.null_count(), 1);
}

#[test]
fn fresh_nulls_are_distinct() {
    let mut kb = kb_with("T(x) -> U(x, z)");
    kb.local_insert(Side::Source, fact("T(1)")).unwrap();
    kb.local_insert(Side::Source, fact("T(2)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Target), ["U(1, _1)", "U(2, _2)"]);
}

#[test]
fn shared_skolem_gets_one_null() {
    let mut kb = kb_with("A(x) -> B(x, z), C(z)");
    kb.local_insert(Side::Source, fact("A(1)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Target), ["B(1, _1)", "C(_1)"]);
}

// ─── Joins and References ──────────────────────────────────────────────────────

#[test]
fn join_enforcement() {
    let mut kb = kb_with("R(x, y), S(x, z) -> T(x, y, z)");
    kb.local_insert(Side::Source, fact("R(1, 1)")).unwrap();
    kb.local_insert(Side::Source, fact("S(2, 4)")).unwrap();

    let mut counter = Counter::default();
    assert_eq!(kb.run_sync_with(&mut counter).unwrap(), SyncResult::Committed);
    assert_eq!(counter.rounds, [RoundOutcome::NoChange]);
    assert_eq!(counter.inserts, 0);
    assert!(kb.current_image(Side::Target).is_empty());
}

#[test]
fn join_selects_matching_pairs() {
    let mut kb = kb_with("R(x, y), S(x, z) -> T(x, y, z)");
    for f in ["R(1, a)", "R(2, b)", "S(2, c)", "S(3, d)"] {
        kb.local_insert(Side::Source, fact(f)).unwrap();
    }

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Target), ["T(2, b, c)"]);
}

#[test]
fn reference_propagation() {
    let mut kb = kb_with("R(x, y), S(x, z, w) -> T(x, y, z), V(w, x)");
    kb.local_insert(Side::Source, fact("R(1, 1)")).unwrap();
    kb.local_insert(Side::Source, fact("S(1, 1, 4)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Target), ["T(1, 1, 1)", "V(4, 1)"]);
    assert_eq!(kb.null_count(), 0);
}

#[test]
fn self_join_on_one_relation() {
    let mut kb = kb_with("E(x, y), E(y, z) -> P(x, z)");
    kb.local_insert(Side::Source, fact("E(a, b)")).unwrap();
    kb.local_insert(Side::Source, fact("E(b, c)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Target), ["P(a, c)"]);
}

// ─── Minimization ──────────────────────────────────────────────────────────────

#[test]
fn existing_completion_suppresses_insertion() {
    let mut kb = kb_with("T(x, y) -> U(x, y, z)");
    kb.local_insert(Side::Source, fact("T(1, 2)")).unwrap();
    kb.local_insert(Side::Target, fact("U(1, 2, 7)")).unwrap();
    kb.local_insert(Side::Target, fact("U(1, 2, 8)")).unwrap();

    let mut counter = Counter::default();
    assert_eq!(kb.run_sync_with(&mut counter).unwrap(), SyncResult::Committed);
    assert_eq!(counter.inserts, 0);
    assert_eq!(facts(&kb, Side::Target), ["U(1, 2, 7)", "U(1, 2, 8)"]);
}

#[test]
fn partially_existing_completion_adds_only_missing_fact() {
    let mut kb = kb_with("R(x, y), S(x, z, w) -> T(x, y, z), V(w, x)");
    kb.local_insert(Side::Source, fact("R(1, 1)")).unwrap();
    kb.local_insert(Side::Source, fact("S(1, 1, 4)")).unwrap();
    kb.local_insert(Side::Target, fact("V(4, 1)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Target), ["V(4, 1)", "T(1, 1, 1)"]);
}

// ─── Fixpoint ──────────────────────────────────────────────────────────────────

#[test]
fn idempotence() {
    let mut kb = kb_with(
        "
        U(x, y, z) -> T(x, y, z)
        R(x, y), S(x, z, w) -> T(x, y, z), V(w, x)
        ",
    );
    for f in ["R(1, 1)", "R(3, 2)", "S(1, 1, 4)", "S(1, 2, 4)", "U(3, 2, 3)"] {
        kb.local_insert(Side::Source, fact(f)).unwrap();
    }
    kb.local_insert(Side::Target, fact("V(5, 3)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    let source = facts(&kb, Side::Source);
    let target = facts(&kb, Side::Target);
    let nulls = kb.null_count();

    let mut counter = Counter::default();
    assert_eq!(kb.run_sync_with(&mut counter).unwrap(), SyncResult::Committed);
    assert_eq!(counter.rounds, [RoundOutcome::NoChange]);
    assert_eq!(counter.inserts, 0);
    assert_eq!(facts(&kb, Side::Source), source);
    assert_eq!(facts(&kb, Side::Target), target);
    assert_eq!(kb.null_count(), nulls);
}

#[test]
fn inverse_writes_back_to_source() {
    let mut kb = kb_with("R(x, y), S(x, z, w) -> T(x, y, z), V(w, x)");
    kb.local_insert(Side::Target, fact("T(3, 2, 7)")).unwrap();
    kb.local_insert(Side::Target, fact("V(5, 3)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Source), ["R(3, 2)", "S(3, 7, 5)"]);
    assert_eq!(facts(&kb, Side::Target), ["T(3, 2, 7)", "V(5, 3)"]);
}

#[test]
fn inverse_invents_nulls_on_source() {
    let mut kb = kb_with("T(x, y, z) -> U(x, y)");
    kb.local_insert(Side::Target, fact("U(1, 2)")).unwrap();

    let mut counter = Counter::default();
    assert_eq!(kb.run_sync_with(&mut counter).unwrap(), SyncResult::Committed);
    assert_eq!(facts(&kb, Side::Source), ["T(1, 2, _1)"]);
    assert_eq!(facts(&kb, Side::Target), ["U(1, 2)"]);
    assert_eq!(counter.rounds, [RoundOutcome::Changed, RoundOutcome::NoChange]);
}

// ─── Violations and Rollback ───────────────────────────────────────────────────

#[test]
fn deletion_violation_rolls_back() {
    let mut kb = kb_with("T(x, y) -> U(x, y)");
    kb.local_insert(Side::Source, fact("T(1, 2)")).unwrap();
    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);

    let source_before = facts(&kb, Side::Source);
    let target_before = facts(&kb, Side::Target);
    assert_eq!(target_before, ["U(1, 2)"]);

    kb.local_insert(Side::Source, fact("T(5, 6)")).unwrap();
    kb.local_delete(Side::Target, fact("U(1, 2)")).unwrap();

    assert_eq!(
        kb.run_sync().unwrap(),
        SyncResult::RolledBack(Violation::Deletion(fact("U(1, 2)")))
    );
    assert_eq!(kb.phase(), SyncPhase::RolledBack);
    assert_eq!(facts(&kb, Side::Source), source_before);
    assert_eq!(facts(&kb, Side::Target), target_before);
    for side in [Side::Source, Side::Target] {
        let (inserts, deletes) = kb.pending_edits(side);
        assert!(inserts.is_empty());
        assert!(deletes.is_empty());
        assert!(kb.working_image(side).is_empty());
    }
}

#[test]
fn deletion_violation_through_inverse() {
    let mut kb = kb_with("T(x, y) -> U(x, y)");
    kb.local_insert(Side::Target, fact("U(1, 2)")).unwrap();
    kb.local_delete(Side::Source, fact("T(1, 2)")).unwrap();

    assert_eq!(
        kb.run_sync().unwrap(),
        SyncResult::RolledBack(Violation::Deletion(fact("T(1, 2)")))
    );
    assert!(kb.current_image(Side::Source).is_empty());
    assert!(kb.current_image(Side::Target).is_empty());
}

#[test]
fn consistent_deletion_commits() {
    let mut kb = kb_with("T(x, y) -> U(x, y)");
    kb.local_insert(Side::Source, fact("T(1, 2)")).unwrap();
    kb.run_sync().unwrap();

    kb.local_delete(Side::Source, fact("T(1, 2)")).unwrap();
    kb.local_delete(Side::Target, fact("U(1, 2)")).unwrap();

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert!(kb.current_image(Side::Source).is_empty());
    assert!(kb.current_image(Side::Target).is_empty());
}

#[test]
fn sync_after_rollback_starts_from_baseline() {
    let mut kb = kb_with("T(x, y) -> U(x, y)");
    kb.local_insert(Side::Source, fact("T(1, 2)")).unwrap();
    kb.local_delete(Side::Target, fact("U(1, 2)")).unwrap();
    assert!(matches!(kb.run_sync().unwrap(), SyncResult::RolledBack(_)));

    assert_eq!(kb.run_sync().unwrap(), SyncResult::Committed);
    assert!(kb.current_image(Side::Source).is_empty());
    assert!(kb.current_image(Side::Target).is_empty());
}

// ─── Local Edits ───────────────────────────────────────────────────────────────

#[test]
fn unbound_fact_is_refused_and_sync_terminates() {
    let mut kb = kb_with("T(x, y) -> U(x, y)");
    let partial = fact("T(1, ?)");
    assert!(matches!(
        kb.local_insert(Side::Source, partial),
        Err(ChaseError::UnboundCell { side: Side::Source, .. })
    ));
    kb.local_insert(Side::Source, fact("T(1, 2)")).unwrap();

    let mut counter = Counter::default();
    assert_eq!(kb.run_sync_with(&mut counter).unwrap(), SyncResult::Committed);
    assert_eq!(counter.rounds, [RoundOutcome::Changed, RoundOutcome::NoChange]);
    assert_eq!(facts(&kb, Side::Target), ["U(1, 2)"]);
}
