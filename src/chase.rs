//! The chase step for a single dependency.
//!
//! Applying a dependency `L -> R` from a source image to a target image is a
//! two-phase backtracking search:
//!
//! 1. **alpha**: enumerate every assignment of source facts to the atoms of `L`
//!    (one atom at a time, in pattern order) and keep those whose join
//!    attributes agree;
//! 2. **beta**: for each surviving assignment, enumerate the completions of `R`
//!    where every atom is either an existing target fact or a placeholder, and
//!    keep those consistent with the left assignment.
//!
//! Completions that are subsumed by a more complete one are dropped. Every
//! remaining completion that still contains placeholders is turned into new
//! facts: reference attributes are copied from the left assignment, skolem
//! attributes reuse a value already present in the completion or receive a
//! fresh labeled null.

use std::borrow::{Borrow, Cow};

use log::debug;

use crate::cell::Cell;
use crate::fact::Fact;
use crate::observer::ChaseObserver;
use crate::tgd::{Atom, Tgd};
use crate::types::Occurrence;

/// Source of fresh labeled nulls `_1`, `_2`, ...
#[derive(Debug, Default, Clone)]
pub struct NullGenerator {
    counter: u64,
}

impl NullGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nulls invented so far.
    pub fn count(&self) -> u64 {
        self.counter
    }

    pub fn fresh(&mut self) -> Cell {
        self.counter += 1;
        Cell::Variable(format!("_{}", self.counter))
    }
}

fn fits(fact: &Fact, atom: &Atom) -> bool {
    fact.relation == atom.relation && fact.arity() == atom.arity()
}

fn cell_at<F: Borrow<Fact>>(facts: &[F], occ: Occurrence) -> &Cell {
    &facts[occ.atom].borrow().cells[occ.column]
}

/// Returns `true` if all bound cells are pairwise [equal][Cell::equal_to] to the
/// first bound one. Unbound cells agree with everything.
fn agree<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> bool {
    let mut bound: Option<&Cell> = None;
    for cell in cells {
        match bound {
            Some(b) => {
                if !b.equal_to(cell) {
                    return false;
                }
            }
            None if !cell.is_unbound() => bound = Some(cell),
            None => {}
        }
    }
    true
}

/// Applies `tgd` once to every match of its left pattern in `source`,
/// inserting the missing consequences into `target`.
///
/// Facts inserted for one match are visible to the matches tried after it.
///
/// Returns `true` if anything was inserted.
pub fn chase_alpha(
    source: &[Fact],
    target: &mut Vec<Fact>,
    nulls: &mut NullGenerator,
    tgd: &Tgd,
    observer: &mut dyn ChaseObserver,
) -> bool {
    debug!("chase_alpha({}): |source| = {}, |target| = {}", tgd, source.len(), target.len());
    let mut binding = Vec::with_capacity(tgd.lhs().len());
    alpha(source, target, nulls, tgd, observer, &mut binding)
}

fn alpha<'a>(
    source: &'a [Fact],
    target: &mut Vec<Fact>,
    nulls: &mut NullGenerator,
    tgd: &Tgd,
    observer: &mut dyn ChaseObserver,
    binding: &mut Vec<&'a Fact>,
) -> bool {
    let depth = binding.len();
    if depth == tgd.lhs().len() {
        if !joins_agree(tgd, binding) {
            return false;
        }
        return fire(target, nulls, tgd, observer, binding);
    }

    let atom = &tgd.lhs()[depth];
    let mut inserted = false;
    for fact in source.iter().filter(|f| fits(f, atom)) {
        binding.push(fact);
        inserted |= alpha(source, target, nulls, tgd, observer, binding);
        binding.pop();
    }
    inserted
}

fn joins_agree(tgd: &Tgd, binding: &[&Fact]) -> bool {
    tgd.join_attrs().iter().all(|attr| {
        agree(
            tgd.left_occurrences(attr)
                .iter()
                .map(|&occ| cell_at(binding, occ)),
        )
    })
}

fn fire(
    target: &mut Vec<Fact>,
    nulls: &mut NullGenerator,
    tgd: &Tgd,
    observer: &mut dyn ChaseObserver,
    binding: &[&Fact],
) -> bool {
    if binding.iter().all(|f| f.is_all_nulls()) {
        debug!("fire: left match consists of labeled nulls only");
    }

    let raw = chase_beta(target, tgd, binding);
    let raw_len = raw.len();
    let completions = minimize(raw);
    debug!("fire: {} completions, {} after minimization", raw_len, completions.len());

    let mut new_facts = Vec::new();
    for completion in &completions {
        if completion.iter().all(|f| !f.is_placeholder()) {
            continue;
        }
        let facts = synthesize(tgd, binding, completion, nulls);
        for fact in &facts {
            debug!("fire: inserting {}", fact);
        }
        observer.on_insert(tgd, &facts);
        new_facts.extend(facts);
    }

    let inserted = !new_facts.is_empty();
    target.extend(new_facts);
    inserted
}

/// Enumerates the completions of the right pattern of `tgd` in `target` that
/// are consistent with the left match `left`.
///
/// Each completion holds one fact per right atom: either an existing target
/// fact or a [placeholder][Fact::placeholder] standing for a missing one.
pub fn chase_beta(target: &[Fact], tgd: &Tgd, left: &[&Fact]) -> Vec<Vec<Fact>> {
    let mut completions = Vec::new();
    let mut partial = Vec::with_capacity(tgd.rhs().len());
    beta(target, tgd, left, &mut partial, &mut completions);
    completions
}

fn beta<'a>(
    target: &'a [Fact],
    tgd: &Tgd,
    left: &[&Fact],
    partial: &mut Vec<Cow<'a, Fact>>,
    completions: &mut Vec<Vec<Fact>>,
) {
    let depth = partial.len();
    if depth == tgd.rhs().len() {
        if completion_agrees(tgd, left, partial) {
            completions.push(partial.iter().map(|f| f.clone().into_owned()).collect());
        }
        return;
    }

    let atom = &tgd.rhs()[depth];
    for fact in target.iter().filter(|f| fits(f, atom)) {
        partial.push(Cow::Borrowed(fact));
        beta(target, tgd, left, partial, completions);
        partial.pop();
    }

    partial.push(Cow::Owned(Fact::placeholder(atom.relation.as_str(), atom.arity())));
    beta(target, tgd, left, partial, completions);
    partial.pop();
}

fn completion_agrees(tgd: &Tgd, left: &[&Fact], right: &[Cow<'_, Fact>]) -> bool {
    let on_right = move |attr: &String| {
        tgd.right_occurrences(attr)
            .iter()
            .map(move |&occ| cell_at(right, occ))
    };

    // References agree among the right atoms.
    if !tgd.ref_attrs().iter().all(|attr| agree(on_right(attr))) {
        return false;
    }
    // So do skolems.
    if !tgd.skolem_attrs().iter().all(|attr| agree(on_right(attr))) {
        return false;
    }
    // References agree across the two sides.
    tgd.ref_attrs().iter().all(|attr| {
        let Some(&first) = tgd.left_occurrences(attr).first() else {
            return true;
        };
        let value = cell_at(left, first);
        match on_right(attr).find(|c| !c.is_unbound()) {
            Some(bound) => bound.equal_to(value),
            None => true,
        }
    })
}

/// Returns `true` if every non-placeholder fact of `specific` is matched by a
/// non-placeholder fact at the same position of `general`.
pub fn is_subsumed(specific: &[Fact], general: &[Fact]) -> bool {
    specific.len() == general.len()
        && specific
            .iter()
            .zip(general)
            .all(|(s, g)| s.is_placeholder() || (!g.is_placeholder() && s.matches(g)))
}

/// Drops every completion subsumed by another surviving completion.
///
/// Of two identical completions, the first one is kept.
pub fn minimize(completions: Vec<Vec<Fact>>) -> Vec<Vec<Fact>> {
    let n = completions.len();
    let mut dropped = vec![false; n];
    for i in 0..n {
        if dropped[i] {
            continue;
        }
        for j in 0..n {
            if j != i && !dropped[j] && is_subsumed(&completions[j], &completions[i]) {
                dropped[j] = true;
            }
        }
    }
    completions
        .into_iter()
        .zip(dropped)
        .filter_map(|(c, d)| (!d).then_some(c))
        .collect()
}

fn synthesize(tgd: &Tgd, left: &[&Fact], completion: &[Fact], nulls: &mut NullGenerator) -> Vec<Fact> {
    let mut fresh: Vec<Option<Fact>> = completion
        .iter()
        .map(|f| f.is_placeholder().then(|| Fact::placeholder(f.relation.as_str(), f.arity())))
        .collect();

    for attr in tgd.skolem_attrs() {
        let occurrences = tgd.right_occurrences(attr);
        let existing = occurrences
            .iter()
            .find(|occ| !completion[occ.atom].is_placeholder())
            .map(|&occ| cell_at(completion, occ).clone());
        let value = existing.unwrap_or_else(|| nulls.fresh());
        assign(&mut fresh, occurrences, &value);
    }

    for attr in tgd.ref_attrs() {
        let Some(&first) = tgd.left_occurrences(attr).first() else {
            continue;
        };
        let value = cell_at(left, first).clone();
        assign(&mut fresh, tgd.right_occurrences(attr), &value);
    }

    fresh.into_iter().flatten().collect()
}

fn assign(fresh: &mut [Option<Fact>], occurrences: &[Occurrence], value: &Cell) {
    for occ in occurrences {
        if let Some(fact) = &mut fresh[occ.atom] {
            fact.cells[occ.column] = value.clone();
        }
    }
}
