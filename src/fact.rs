//! Facts: relation name plus one cell per attribute position.

use std::fmt;

use crate::cell::Cell;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Fact {
    pub relation: String,
    pub cells: Vec<Cell>,
}

impl Fact {
    pub fn new(relation: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            relation: relation.into(),
            cells,
        }
    }

    /// Creates a fact made of constants only.
    ///
    /// ```
    /// use tgd_chase::fact::Fact;
    ///
    /// let f = Fact::constants("R", ["1", "2"]);
    /// assert_eq!(f.to_string(), "R(1, 2)");
    /// ```
    pub fn constants<I, S>(relation: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(relation, values.into_iter().map(Cell::constant).collect())
    }

    /// Creates a fact with `arity` unbound cells, standing for "not yet present".
    pub fn placeholder(relation: impl Into<String>, arity: usize) -> Self {
        Self::new(relation, vec![Cell::Unbound; arity])
    }

    pub fn arity(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if at least one cell is unbound.
    pub fn is_placeholder(&self) -> bool {
        self.cells.iter().any(Cell::is_unbound)
    }

    /// Returns `true` if every cell is a labeled null.
    pub fn is_all_nulls(&self) -> bool {
        self.cells.iter().all(Cell::is_variable)
    }

    /// Wildcard-aware fact equality: same relation, same arity and
    /// position-wise [`Cell::equal_to`].
    ///
    /// A placeholder fact therefore matches many concrete facts.
    pub fn matches(&self, other: &Fact) -> bool {
        self.relation == other.relation
            && self.cells.len() == other.cells.len()
            && self.cells.iter().zip(&other.cells).all(|(a, b)| a.equal_to(b))
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.relation)?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cell)?;
        }
        write!(f, ")")
    }
}

/// Returns the position of the first fact in `facts` matching `fact`.
pub fn position_of(facts: &[Fact], fact: &Fact) -> Option<usize> {
    facts.iter().position(|f| f.matches(fact))
}

/// Returns `true` if some fact in `facts` matches `fact`.
pub fn contains(facts: &[Fact], fact: &Fact) -> bool {
    position_of(facts, fact).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_placeholder() {
        let p = Fact::placeholder("U", 3);
        assert!(p.is_placeholder());
        assert_eq!(p.arity(), 3);
        assert_eq!(p.to_string(), "U(?, ?, ?)");

        let f = Fact::constants("U", ["1", "2", "3"]);
        assert!(!f.is_placeholder());
    }

    #[test]
    fn test_placeholder_matches_concrete() {
        let p = Fact::placeholder("U", 2);
        let f = Fact::constants("U", ["1", "2"]);
        let g = Fact::constants("U", ["3", "4"]);
        assert!(p.matches(&f));
        assert!(p.matches(&g));
        assert!(!f.matches(&g));
        assert_ne!(p, f);
    }

    #[test]
    fn test_matches_requires_relation_and_arity() {
        let f = Fact::constants("R", ["1", "2"]);
        assert!(!f.matches(&Fact::constants("S", ["1", "2"])));
        assert!(!f.matches(&Fact::constants("R", ["1"])));
        assert!(!Fact::placeholder("R", 3).matches(&f));
    }

    #[test]
    fn test_partial_placeholder() {
        let p = Fact::new("T", vec![Cell::constant("1"), Cell::Unbound]);
        assert!(p.is_placeholder());
        assert!(p.matches(&Fact::constants("T", ["1", "9"])));
        assert!(!p.matches(&Fact::constants("T", ["2", "9"])));
    }

    #[test]
    fn test_all_nulls() {
        let f = Fact::new("T", vec![Cell::variable("_1"), Cell::variable("_2")]);
        assert!(f.is_all_nulls());
        let g = Fact::new("T", vec![Cell::variable("_1"), Cell::constant("2")]);
        assert!(!g.is_all_nulls());
    }

    #[test]
    fn test_position_of_first_match() {
        let facts = vec![
            Fact::constants("R", ["1", "1"]),
            Fact::constants("R", ["1", "2"]),
            Fact::constants("R", ["1", "2"]),
        ];
        assert_eq!(position_of(&facts, &Fact::constants("R", ["1", "2"])), Some(1));
        assert_eq!(position_of(&facts, &Fact::placeholder("R", 2)), Some(0));
        assert!(!contains(&facts, &Fact::constants("R", ["2", "2"])));
    }
}
