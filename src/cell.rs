//! Cell values stored in facts.
//!
//! A [`Cell`] is one of three things:
//!
//! - a **constant** supplied by a peer,
//! - a **labeled null** (`Variable`) invented by the chase for an existentially
//!   quantified attribute,
//! - **unbound**, a placeholder that has not received a value yet.
//!
//! Partially built facts are compared with [`Cell::equal_to`], which treats
//! `Unbound` as a wildcard. Structural equality (`==`) stays exact, so a
//! placeholder is never confused with a concrete value in hash sets or asserts.

use std::fmt;

/// The value at one attribute position of a [`Fact`][crate::fact::Fact].
///
/// # Invariants
///
/// - `Variable` holds a labeled null; the chase names them `_1`, `_2`, ...
/// - `Unbound` only appears in partial facts built during the search
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Cell {
    Constant(String),
    Variable(String),
    #[default]
    Unbound,
}

impl Cell {
    pub fn constant(value: impl Into<String>) -> Self {
        Cell::Constant(value.into())
    }

    pub fn variable(label: impl Into<String>) -> Self {
        Cell::Variable(label.into())
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self, Cell::Unbound)
    }
    pub fn is_variable(&self) -> bool {
        matches!(self, Cell::Variable(_))
    }
    pub fn is_constant(&self) -> bool {
        matches!(self, Cell::Constant(_))
    }

    /// Wildcard-aware equality.
    ///
    /// `Unbound` is equal to every cell, including another `Unbound`.
    /// Otherwise both cells must be of the same variant and carry the same payload:
    /// `Variable("1")` and `Constant("1")` are different.
    ///
    /// Note that this relation is reflexive and symmetric but not transitive.
    pub fn equal_to(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Unbound, _) | (_, Cell::Unbound) => true,
            (Cell::Constant(a), Cell::Constant(b)) => a == b,
            (Cell::Variable(a), Cell::Variable(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Constant(value) => write!(f, "{}", value),
            Cell::Variable(label) => write!(f, "{}", label),
            Cell::Unbound => write!(f, "?"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::constant(value)
    }
}
