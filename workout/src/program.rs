//! Exercise programs and the parse entry points

use crate::actions::ActionResult;
use crate::context::ExecutionContext;
use crate::exercise::Exercise;
use crate::parser::{self, ParseError};
use crate::services::Services;
use crate::Result;
use std::time::Duration;

/// A named, ordered list of exercises
#[derive(Debug, Clone)]
pub struct ExerciseProgram {
    name: String,
    exercises: Vec<Exercise>,
    duration: Duration,
}

impl ExerciseProgram {
    /// Create a program
    pub fn new(name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        let duration = exercises
            .iter()
            .map(Exercise::duration)
            .fold(Duration::ZERO, Duration::saturating_add);
        Self {
            name: name.into(),
            exercises,
            duration,
        }
    }

    /// Program name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exercises in playback order
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Sum of the exercise durations
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Play every exercise in order
    ///
    /// Exercises entirely covered by the remaining skip-ahead are bypassed
    /// without raising any of their events.
    pub async fn execute(&self, context: &mut ExecutionContext) -> ActionResult<()> {
        tracing::info!(
            "Starting program '{}' ({} exercises, {:?})",
            self.name,
            self.exercises.len(),
            self.duration
        );

        for (index, exercise) in self.exercises.iter().enumerate() {
            context.check_cancelled()?;
            context.set_current_exercise_index(index as u32 + 1);

            if context.can_skip(exercise.duration()) {
                tracing::debug!("Skipping exercise '{}'", exercise.name());
                context.skip(exercise.duration());
                continue;
            }

            exercise.execute(context).await?;
        }

        tracing::info!("Finished program '{}'", self.name);
        Ok(())
    }
}

/// Every program parsed from one document
#[derive(Debug, Clone, Default)]
pub struct ExercisePrograms {
    programs: Vec<ExerciseProgram>,
}

impl ExercisePrograms {
    /// Create from parsed programs
    pub fn new(programs: Vec<ExerciseProgram>) -> Self {
        Self { programs }
    }

    /// Parse a document, failing with [`crate::WorkoutError::Parse`] on invalid input
    pub fn parse(input: &str, services: &Services) -> Result<Self> {
        Ok(Self::try_parse(input, services)?)
    }

    /// Parse a document, returning the positional failure on invalid input
    pub fn try_parse(input: &str, services: &Services) -> std::result::Result<Self, ParseError> {
        parser::parse_programs(input, services)
    }

    /// Programs in document order
    pub fn programs(&self) -> &[ExerciseProgram] {
        &self.programs
    }

    /// Find a program by name, ignoring ASCII case
    pub fn find(&self, name: &str) -> Option<&ExerciseProgram> {
        self.programs
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
    }

    /// Number of programs
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether the document held no programs
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
