//! Text syntax for dependencies and facts.
//!
//! ```text
//! dependency := pattern "->" pattern
//! pattern    := atom ("," atom)*
//! atom       := name "(" [name ("," name)*] ")"
//! fact       := name "(" [cell ("," cell)*] ")"
//! cell       := "?"            # unbound
//!             | "_" label      # labeled null
//!             | constant
//! ```
//!
//! Names may contain letters, digits, `_`, `'` and `.`. Constants run up to the
//! next `,` or `)` and are trimmed.
//!
//! An unbound cell (`?`) only describes a partial fact, such as a placeholder
//! printed while tracing the chase. Peer facts must be fully bound:
//! [`KnowledgeBase::local_insert`][crate::kb::KnowledgeBase::local_insert]
//! refuses facts containing `?`. In multi-line input, blank lines and lines
//! starting with `#` are skipped.
//!
//! Parsing a dependency does not validate it: an empty pattern is reported by
//! [`KnowledgeBase::define_dependencies`][crate::kb::KnowledgeBase::define_dependencies].

use thiserror::Error;

use crate::cell::Cell;
use crate::fact::Fact;
use crate::tgd::Atom;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} at column {column}, found end of input")]
    UnexpectedEnd { expected: &'static str, column: usize },
    #[error("expected {expected} at column {column}, found '{found}'")]
    Unexpected {
        expected: &'static str,
        found: char,
        column: usize,
    },
    #[error("empty cell at column {column}")]
    EmptyCell { column: usize },
    #[error("missing '->' in dependency")]
    MissingArrow,
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn column(&self) -> usize {
        self.text[..self.pos].chars().count() + 1
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.text.len()
    }

    fn error(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::Unexpected {
                expected,
                found,
                column: self.column(),
            },
            None => ParseError::UnexpectedEnd {
                expected,
                column: self.column(),
            },
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn name(&mut self) -> Result<&'a str, ParseError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '\'' | '.')))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("a name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn token(&mut self) -> Result<&'a str, ParseError> {
        self.skip_ws();
        let column = self.column();
        let rest = self.rest();
        let len = rest.find(&[',', ')'][..]).unwrap_or(rest.len());
        let token = rest[..len].trim();
        if token.is_empty() {
            return Err(ParseError::EmptyCell { column });
        }
        self.pos += len;
        Ok(token)
    }

    /// Parses `name(item, ...)`.
    fn application<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(&'a str, Vec<T>), ParseError> {
        let name = self.name()?;
        self.expect('(', "'('")?;
        let mut items = Vec::new();
        if !self.eat(')') {
            loop {
                items.push(item(self)?);
                if self.eat(')') {
                    break;
                }
                self.expect(',', "',' or ')'")?;
            }
        }
        Ok((name, items))
    }

    fn atom(&mut self) -> Result<Atom, ParseError> {
        let (relation, attrs) = self.application(|c| c.name())?;
        Ok(Atom::new(relation, attrs))
    }

    fn pattern(&mut self) -> Result<Vec<Atom>, ParseError> {
        let mut atoms = Vec::new();
        if self.at_end() {
            return Ok(atoms);
        }
        loop {
            atoms.push(self.atom()?);
            if !self.eat(',') {
                break;
            }
        }
        Ok(atoms)
    }

    fn fact(&mut self) -> Result<Fact, ParseError> {
        let (relation, cells) = self.application(|c| c.token().map(parse_cell))?;
        Ok(Fact::new(relation, cells))
    }

    fn finish<T>(&mut self, value: T) -> Result<T, ParseError> {
        if self.at_end() {
            Ok(value)
        } else {
            Err(self.error("end of input"))
        }
    }
}

/// Interprets a single cell token.
///
/// `?` yields [`Cell::Unbound`], which is only meaningful in partial facts.
pub fn parse_cell(token: &str) -> Cell {
    if token == "?" {
        Cell::Unbound
    } else if token.starts_with('_') {
        Cell::variable(token)
    } else {
        Cell::constant(token)
    }
}

pub fn parse_atom(text: &str) -> Result<Atom, ParseError> {
    let mut cursor = Cursor::new(text);
    let atom = cursor.atom()?;
    cursor.finish(atom)
}

/// Parses a comma-separated list of atoms. Empty input yields an empty pattern.
pub fn parse_pattern(text: &str) -> Result<Vec<Atom>, ParseError> {
    let mut cursor = Cursor::new(text);
    let pattern = cursor.pattern()?;
    cursor.finish(pattern)
}

/// Parses `lhs -> rhs` into its two patterns.
///
/// ```
/// use tgd_chase::syntax::parse_dependency;
///
/// let (lhs, rhs) = parse_dependency("R(x, y), S(x, z) -> T(x, y, z)").unwrap();
/// assert_eq!(lhs.len(), 2);
/// assert_eq!(rhs[0].to_string(), "T(x, y, z)");
/// ```
pub fn parse_dependency(text: &str) -> Result<(Vec<Atom>, Vec<Atom>), ParseError> {
    let (lhs, rhs) = text.split_once("->").ok_or(ParseError::MissingArrow)?;
    let lhs = parse_pattern(lhs)?;
    let rhs = parse_pattern(rhs).map_err(|e| shift(e, lhs_width(text)))?;
    Ok((lhs, rhs))
}

fn lhs_width(text: &str) -> usize {
    text.find("->").map_or(0, |i| text[..i].chars().count() + 2)
}

fn shift(error: ParseError, by: usize) -> ParseError {
    match error {
        ParseError::UnexpectedEnd { expected, column } => ParseError::UnexpectedEnd {
            expected,
            column: column + by,
        },
        ParseError::Unexpected {
            expected,
            found,
            column,
        } => ParseError::Unexpected {
            expected,
            found,
            column: column + by,
        },
        ParseError::EmptyCell { column } => ParseError::EmptyCell { column: column + by },
        other => other,
    }
}

pub fn parse_fact(text: &str) -> Result<Fact, ParseError> {
    let mut cursor = Cursor::new(text);
    let fact = cursor.fact()?;
    cursor.finish(fact)
}

fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn at_line(line: usize) -> impl Fn(ParseError) -> ParseError {
    move |e| ParseError::AtLine {
        line,
        source: Box::new(e),
    }
}

/// Parses one dependency per line.
pub fn parse_dependencies(text: &str) -> Result<Vec<(Vec<Atom>, Vec<Atom>)>, ParseError> {
    lines(text)
        .map(|(n, line)| parse_dependency(line).map_err(at_line(n)))
        .collect()
}

/// Parses one fact per line.
pub fn parse_facts(text: &str) -> Result<Vec<Fact>, ParseError> {
    lines(text)
        .map(|(n, line)| parse_fact(line).map_err(at_line(n)))
        .collect()
}
