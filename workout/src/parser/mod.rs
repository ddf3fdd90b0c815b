//! Grammar for workout documents
//!
//! A document is a list of programs. Each program is a level one heading
//! followed by exercises; each exercise is a level two heading, a
//! `*<sets> sets x <reps> reps` line and optional event matchers with the
//! actions they fire:
//!
//! ```text
//! # Monday
//!
//! ## Push ups
//!
//! *3 sets x 10 reps
//!
//! * before:
//!     say 'Get ready'
//! * after set first..last-1:
//!     wait for 1m
//! * during rep:
//!     metronome at 0s*, 1s, 1s
//! ```
//!
//! Keywords are case-insensitive. Parsing is all-or-nothing: the first
//! failure is reported as a [`ParseError`] with its position and no partial
//! result is returned.

mod actions;
mod constraint;
mod exercise;
mod lexical;
mod program;

use crate::constraint::NumericalConstraint;
use crate::program::ExercisePrograms;
use crate::services::Services;
use chumsky::prelude::*;
use std::time::Duration;
use thiserror::Error;

/// Extra state shared by every parser in the grammar
pub(crate) type Extra<'src> = extra::Err<Rich<'src, char>>;

/// A positional parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Byte offset of the failure in the input
    pub offset: usize,
    /// One-based line of the failure
    pub line: usize,
    /// One-based column of the failure, counted in characters
    pub column: usize,
    /// What the grammar expected and what it found
    pub message: String,
}

impl ParseError {
    /// Build an error at `offset` within `input`
    pub fn at(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before.chars().rev().take_while(|c| *c != '\n').count() + 1;

        Self {
            offset,
            line,
            column,
            message: message.into(),
        }
    }

    fn from_rich(input: &str, errors: Vec<Rich<'_, char>>) -> Self {
        match errors.into_iter().next() {
            Some(error) => Self::at(input, error.span().start, error.to_string()),
            None => Self::at(input, 0, "invalid input"),
        }
    }
}

/// Parse a whole document into its programs
///
/// Empty or whitespace-only input yields an empty collection.
pub fn parse_programs(input: &str, services: &Services) -> Result<ExercisePrograms, ParseError> {
    program::programs(services.clone())
        .parse(input)
        .into_result()
        .map_err(|errors| ParseError::from_rich(input, errors))
}

/// Parse a numerical constraint such as `first+1..last-1` or `2, 4, 6`
pub fn parse_constraint(text: &str) -> Result<NumericalConstraint, ParseError> {
    constraint::constraint()
        .then_ignore(end())
        .parse(text)
        .into_result()
        .map_err(|errors| ParseError::from_rich(text, errors))
}

/// Parse a duration such as `30s`, `1m30s` or `500 ms`
pub fn parse_duration(text: &str) -> Result<Duration, ParseError> {
    lexical::duration()
        .padded_by(lexical::horizontal_whitespace())
        .then_ignore(end())
        .parse(text)
        .into_result()
        .map_err(|errors| ParseError::from_rich(text, errors))
}
