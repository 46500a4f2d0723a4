//! Tuple-generating dependencies.
//!
//! A dependency `L -> R` says: whenever facts matching every atom of `L` exist
//! (with consistent values for shared attributes), facts matching every atom of
//! `R` must exist too. Attributes that occur only in `R` are existentially
//! quantified and may be filled with freshly invented labeled nulls.
//!
//! Construction analyses the two patterns once:
//!
//! - **join** attributes occur at least twice on the left and must bind to the
//!   same value everywhere,
//! - **reference** attributes occur on both sides and are copied from the left
//!   match onto the right consequence,
//! - **skolem** attributes occur only on the right.
//!
//! Attribute occurrences are recorded per atom index, so a pattern may mention
//! the same relation more than once.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ChaseError;
use crate::types::Occurrence;

/// A relation name with an ordered list of attribute variables.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Atom {
    pub relation: String,
    pub attrs: Vec<String>,
}

impl Atom {
    pub fn new<I, S>(relation: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            relation: relation.into(),
            attrs: attrs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.attrs.len()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.relation, self.attrs.join(", "))
    }
}

type Occurrences = BTreeMap<String, Vec<Occurrence>>;

fn occurrences(pattern: &[Atom]) -> Occurrences {
    let mut map = Occurrences::new();
    for (i, atom) in pattern.iter().enumerate() {
        for (j, attr) in atom.attrs.iter().enumerate() {
            map.entry(attr.clone()).or_default().push(Occurrence::new(i, j));
        }
    }
    map
}

/// A compiled dependency `L -> R`.
///
/// # Invariants
///
/// - both `lhs` and `rhs` are non-empty
/// - every attribute of `rhs` is either a reference or a skolem attribute
/// - occurrence lists are in pattern order, attribute lists in lexicographic order
#[derive(Debug, Clone)]
pub struct Tgd {
    lhs: Vec<Atom>,
    rhs: Vec<Atom>,
    left: Occurrences,
    right: Occurrences,
    join_attrs: Vec<String>,
    ref_attrs: Vec<String>,
    skolem_attrs: Vec<String>,
}

impl Tgd {
    /// Compiles a dependency from its two patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ChaseError::InvalidDependency`] if either pattern is empty.
    pub fn new(lhs: Vec<Atom>, rhs: Vec<Atom>) -> Result<Self, ChaseError> {
        if lhs.is_empty() || rhs.is_empty() {
            let side = if lhs.is_empty() { "left" } else { "right" };
            return Err(ChaseError::InvalidDependency(format!(
                "empty {} pattern in {} -> {}",
                side,
                Pattern(&lhs),
                Pattern(&rhs)
            )));
        }
        Ok(Self::compile(lhs, rhs))
    }

    fn compile(lhs: Vec<Atom>, rhs: Vec<Atom>) -> Self {
        let left = occurrences(&lhs);
        let right = occurrences(&rhs);

        let join_attrs: Vec<String> = left
            .iter()
            .filter(|(_, occ)| occ.len() > 1)
            .map(|(attr, _)| attr.clone())
            .collect();
        let (ref_attrs, skolem_attrs): (Vec<String>, Vec<String>) = right
            .keys()
            .cloned()
            .partition(|attr| left.contains_key(attr));

        Self {
            lhs,
            rhs,
            left,
            right,
            join_attrs,
            ref_attrs,
            skolem_attrs,
        }
    }

    /// Returns the dependency with its two sides swapped.
    pub fn inverse(&self) -> Self {
        Self::compile(self.rhs.clone(), self.lhs.clone())
    }

    pub fn lhs(&self) -> &[Atom] {
        &self.lhs
    }
    pub fn rhs(&self) -> &[Atom] {
        &self.rhs
    }

    pub fn join_attrs(&self) -> &[String] {
        &self.join_attrs
    }
    pub fn ref_attrs(&self) -> &[String] {
        &self.ref_attrs
    }
    pub fn skolem_attrs(&self) -> &[String] {
        &self.skolem_attrs
    }

    /// All places where `attr` occurs in the left pattern, in pattern order.
    pub fn left_occurrences(&self, attr: &str) -> &[Occurrence] {
        self.left.get(attr).map_or(&[][..], Vec::as_slice)
    }

    /// All places where `attr` occurs in the right pattern, in pattern order.
    pub fn right_occurrences(&self, attr: &str) -> &[Occurrence] {
        self.right.get(attr).map_or(&[][..], Vec::as_slice)
    }

    /// Column of `attr` in the left atom with index `atom`.
    pub fn left_position(&self, atom: usize, attr: &str) -> Option<usize> {
        self.lhs.get(atom)?.attrs.iter().position(|a| a == attr)
    }

    /// Column of `attr` in the right atom with index `atom`.
    pub fn right_position(&self, atom: usize, attr: &str) -> Option<usize> {
        self.rhs.get(atom)?.attrs.iter().position(|a| a == attr)
    }
}

struct Pattern<'a>(&'a [Atom]);

impl fmt::Display for Pattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, atom) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", atom)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tgd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", Pattern(&self.lhs), Pattern(&self.rhs))
    }
}
