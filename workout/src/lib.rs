//! # Workout
//!
//! Compiles workout documents into timed action trees and plays them back.
//!
//! ## Features
//!
//! - **Grammar**: Markdown-like programs, exercises and event matchers
//! - **Action tree**: sequences, metronomes, waits, audio and speech cues
//! - **Playback**: cooperative cancellation and skip-ahead over any subtree
//! - **Events**: actions bound to exercise, set and repetition boundaries,
//!   optionally filtered by constraints such as `first+1..last-1`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workout::prelude::*;
//! use workout::services::{TokioDelayService, TracingLogger};
//!
//! # struct Speaker;
//! # #[async_trait::async_trait]
//! # impl workout::services::SpeechService for Speaker {
//! #     async fn say(&self, _: &str) -> workout::services::ServiceResult<()> { Ok(()) }
//! # }
//! # #[async_trait::async_trait]
//! # impl workout::services::AudioService for Speaker {
//! #     async fn play(&self, _: &str) -> workout::services::ServiceResult<()> { Ok(()) }
//! # }
//! # async fn run() -> workout::Result<()> {
//! let services = Services::new(
//!     Arc::new(Speaker),
//!     Arc::new(TokioDelayService),
//!     Arc::new(TracingLogger),
//!     Arc::new(Speaker),
//! );
//!
//! let document = std::fs::read_to_string("monday.md")?;
//! let programs = ExercisePrograms::parse(&document, &services)?;
//!
//! if let Some(program) = programs.find("Monday") {
//!     let mut context = ExecutionContext::new();
//!     program.execute(&mut context).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Action tree nodes and their execution
pub mod actions;

/// Shared helpers
pub mod common;

/// Configuration loading
pub mod config;

/// Numerical constraints over set and repetition indices
pub mod constraint;

/// Run state threaded through playback
pub mod context;

/// Lifecycle events and matchers
pub mod events;

/// Exercises and their event hooks
pub mod exercise;

/// Grammar for workout documents
pub mod parser;

/// Programs and document-level entry points
pub mod program;

/// Collaborator contracts
pub mod services;

#[cfg(test)]
mod actions_tests;

pub use actions::{
    Action, ActionError, ActionResult, AudioAction, DoNotAwaitAction, MetronomeAction,
    MetronomeTick, MetronomeTickType, SayAction, SequenceAction, WaitAction,
};
pub use config::{Config, ConfigError};
pub use constraint::{Bound, ConstraintTerm, NumericalConstraint};
pub use context::{CurrentExercise, ExecutionContext};
pub use events::{Event, EventKind, EventMatcher};
pub use exercise::{Exercise, MatcherWithAction};
pub use parser::{parse_duration, ParseError};
pub use program::{ExerciseProgram, ExercisePrograms};
pub use services::Services;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types used throughout the library
pub mod error {
    use crate::actions::ActionError;
    use crate::config::ConfigError;
    use crate::parser::ParseError;
    use thiserror::Error;

    /// Main error type for the library
    #[derive(Debug, Error)]
    pub enum WorkoutError {
        /// IO operation failed
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        /// A document did not match the grammar
        #[error("Parse error: {0}")]
        Parse(#[from] ParseError),

        /// A constructor precondition was violated
        #[error("Invalid argument '{argument}': {reason}")]
        InvalidArgument {
            /// Name of the offending argument
            argument: &'static str,
            /// What was wrong with it
            reason: String,
        },

        /// Invalid configuration
        #[error("Configuration error: {0}")]
        Config(#[from] ConfigError),

        /// Playback failed
        #[error("Action error: {0}")]
        Action(ActionError),

        /// Playback was cancelled
        #[error("Playback was cancelled")]
        Cancelled,
    }

    impl From<ActionError> for WorkoutError {
        fn from(error: ActionError) -> Self {
            match error {
                ActionError::Cancelled => WorkoutError::Cancelled,
                other => WorkoutError::Action(other),
            }
        }
    }

    /// Result type alias
    pub type Result<T> = std::result::Result<T, WorkoutError>;
}

pub use error::{Result, WorkoutError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionError, ExecutionContext, Exercise, ExerciseProgram, ExercisePrograms,
        NumericalConstraint, Result, Services, WorkoutError,
    };
}

/// Test utilities module for testing support
#[doc(hidden)]
pub mod test_utils;
