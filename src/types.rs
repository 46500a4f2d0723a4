///! Small shared types.
///!
///! This module provides the identifiers used to address the two peers of a
///! knowledge base and the columns of atoms inside a dependency.
use std::fmt;

/// One of the two peers whose fact-bases are kept in sync.
///
/// Dependencies are always stated from the source to the target; their
/// inverses run in the opposite direction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    /// Returns the other peer.
    pub fn opposite(self) -> Self {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// A column of a particular atom in a dependency pattern.
///
/// # Invariants
///
/// - `atom` indexes the pattern the occurrence was derived from
/// - `column` is smaller than the arity of that atom
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Occurrence {
    pub atom: usize,
    pub column: usize,
}

impl Occurrence {
    pub fn new(atom: usize, column: usize) -> Self {
        Occurrence { atom, column }
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.atom, self.column)
    }
}
