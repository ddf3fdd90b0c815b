//! Numerical constraints over set and repetition indices
//!
//! A constraint such as `first+1..last-1` or `2,4,6` is evaluated against an
//! actual index together with the `first` and `last` bounds of the scope it
//! applies to. Bounds are supplied at evaluation time so that `last` always
//! reflects the exercise being played.

use crate::parser::{self, ParseError};
use std::fmt;
use std::str::FromStr;

/// One end of a constraint term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// A literal index
    Number(u32),
    /// `first`, shifted by the offset
    First(i64),
    /// `last`, shifted by the offset
    Last(i64),
}

impl Bound {
    /// Resolve against concrete bounds
    pub fn resolve(self, first: u32, last: u32) -> i64 {
        match self {
            Bound::Number(n) => i64::from(n),
            Bound::First(offset) => i64::from(first) + offset,
            Bound::Last(offset) => i64::from(last) + offset,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (keyword, offset) = match *self {
            Bound::Number(n) => return write!(f, "{}", n),
            Bound::First(offset) => ("first", offset),
            Bound::Last(offset) => ("last", offset),
        };
        match offset {
            0 => write!(f, "{}", keyword),
            o if o > 0 => write!(f, "{}+{}", keyword, o),
            o => write!(f, "{}{}", keyword, o),
        }
    }
}

/// A single alternative of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintTerm {
    /// Matches exactly one index
    Single(Bound),
    /// Matches every index in the inclusive range
    Range(Bound, Bound),
}

impl ConstraintTerm {
    /// Whether `actual` satisfies this term
    pub fn matches(&self, actual: u32, first: u32, last: u32) -> bool {
        let actual = i64::from(actual);
        match *self {
            ConstraintTerm::Single(bound) => actual == bound.resolve(first, last),
            ConstraintTerm::Range(from, to) => {
                from.resolve(first, last) <= actual && actual <= to.resolve(first, last)
            }
        }
    }

    /// Inclusive span of indices this term accepts within `first..=last`
    fn span(&self, first: u32, last: u32) -> Option<(u32, u32)> {
        let (from, to) = match *self {
            ConstraintTerm::Single(bound) => {
                let index = bound.resolve(first, last);
                (index, index)
            }
            ConstraintTerm::Range(from, to) => (from.resolve(first, last), to.resolve(first, last)),
        };
        let from = u32::try_from(from.max(i64::from(first))).ok()?;
        let to = u32::try_from(to.min(i64::from(last))).ok()?;
        (from <= to).then_some((from, to))
    }
}

impl fmt::Display for ConstraintTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintTerm::Single(bound) => write!(f, "{}", bound),
            ConstraintTerm::Range(from, to) => write!(f, "{}..{}", from, to),
        }
    }
}

/// Comma separated alternatives, combined with logical OR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericalConstraint {
    terms: Vec<ConstraintTerm>,
}

impl NumericalConstraint {
    /// Create a constraint from its alternatives
    pub fn new(terms: Vec<ConstraintTerm>) -> Self {
        Self { terms }
    }

    /// Parse constraint text such as `first..last` or `2, 4, 6`
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parser::parse_constraint(text)
    }

    /// Alternatives in declaration order
    pub fn terms(&self) -> &[ConstraintTerm] {
        &self.terms
    }

    /// Whether `actual` satisfies any alternative
    pub fn matches(&self, actual: u32, first: u32, last: u32) -> bool {
        self.terms
            .iter()
            .any(|term| term.matches(actual, first, last))
    }

    /// How many indices in `first..=last` satisfy the constraint
    ///
    /// Overlapping alternatives are counted once.
    pub fn count_matches(&self, first: u32, last: u32) -> u64 {
        let mut spans: Vec<(u32, u32)> = self
            .terms
            .iter()
            .filter_map(|term| term.span(first, last))
            .collect();
        spans.sort_unstable();

        let mut count = 0;
        let mut covered: Option<u32> = None;
        for (from, to) in spans {
            let from = match covered {
                Some(end) if end >= to => continue,
                Some(end) if end >= from => end + 1,
                _ => from,
            };
            count += u64::from(to - from) + 1;
            covered = Some(to);
        }
        count
    }
}

impl FromStr for NumericalConstraint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NumericalConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}
