//! Mutable state threaded through a single playback run

use crate::actions::{ActionError, ActionResult};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Bounds of the exercise currently being played
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentExercise {
    /// Exercise name
    pub name: String,
    /// Number of sets in the exercise
    pub set_count: u32,
    /// Number of repetitions per set
    pub repetition_count: u32,
}

/// Run state for one playback of an action tree
///
/// Owned by the run that executes the root action and handed down by mutable
/// reference. Skip-ahead only ever decreases; progress only ever increases.
#[derive(Debug)]
pub struct ExecutionContext {
    cancellation: CancellationToken,
    skip_ahead: Duration,
    progress: watch::Sender<Duration>,
    current_exercise: Option<CurrentExercise>,
    current_exercise_index: u32,
    current_set: u32,
    current_repetition: u32,
}

impl ExecutionContext {
    /// Create a context with no skip-ahead and a fresh cancellation token
    pub fn new() -> Self {
        let (progress, _) = watch::channel(Duration::ZERO);
        Self {
            cancellation: CancellationToken::new(),
            skip_ahead: Duration::ZERO,
            progress,
            current_exercise: None,
            current_exercise_index: 0,
            current_set: 0,
            current_repetition: 0,
        }
    }

    /// Fast-forward the run by `skip_ahead`
    pub fn with_skip_ahead(mut self, skip_ahead: Duration) -> Self {
        self.skip_ahead = skip_ahead;
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Context for a detached task: shares cancellation and indices, but
    /// keeps its own skip-ahead and progress so it cannot disturb this run
    pub fn detached(&self) -> Self {
        let (progress, _) = watch::channel(Duration::ZERO);
        Self {
            cancellation: self.cancellation.child_token(),
            skip_ahead: Duration::ZERO,
            progress,
            current_exercise: self.current_exercise.clone(),
            current_exercise_index: self.current_exercise_index,
            current_set: self.current_set,
            current_repetition: self.current_repetition,
        }
    }

    /// Token observed by every sequence step and delay
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Request cancellation of the run
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail with [`ActionError::Cancelled`] if cancellation has been requested
    pub fn check_cancelled(&self) -> ActionResult<()> {
        if self.is_cancelled() {
            Err(ActionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Remaining fast-forward amount
    pub fn skip_ahead(&self) -> Duration {
        self.skip_ahead
    }

    /// Whether the child with `duration` is entirely covered by the remaining skip-ahead
    pub fn can_skip(&self, duration: Duration) -> bool {
        !self.skip_ahead.is_zero() && self.skip_ahead >= duration
    }

    /// Consume up to `duration` of skip-ahead, returning the amount consumed
    pub fn consume_skip_ahead(&mut self, duration: Duration) -> Duration {
        let consumed = self.skip_ahead.min(duration);
        self.skip_ahead -= consumed;
        consumed
    }

    /// Bypass `duration` without executing: consumes skip-ahead and counts it as progress
    pub fn skip(&mut self, duration: Duration) {
        let consumed = self.consume_skip_ahead(duration);
        self.add_progress(consumed);
    }

    /// Total duration executed or skipped so far
    pub fn progress(&self) -> Duration {
        *self.progress.borrow()
    }

    /// Record executed time
    pub fn add_progress(&mut self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        self.progress
            .send_modify(|progress| *progress = progress.saturating_add(duration));
    }

    /// Observe progress while the run is in flight
    pub fn subscribe_progress(&self) -> watch::Receiver<Duration> {
        self.progress.subscribe()
    }

    /// Exercise currently being played, if any
    pub fn current_exercise(&self) -> Option<&CurrentExercise> {
        self.current_exercise.as_ref()
    }

    /// One-based position of the current exercise within its program
    pub fn current_exercise_index(&self) -> u32 {
        self.current_exercise_index
    }

    /// One-based index of the current set, zero before the first set
    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    /// One-based index of the current repetition, zero before the first repetition
    pub fn current_repetition(&self) -> u32 {
        self.current_repetition
    }

    /// Record the one-based position of the next exercise within its program
    pub fn set_current_exercise_index(&mut self, index: u32) {
        self.current_exercise_index = index;
    }

    /// Enter an exercise, resetting set and repetition indices
    pub fn set_current_exercise(&mut self, exercise: CurrentExercise) {
        self.current_exercise = Some(exercise);
        self.current_set = 0;
        self.current_repetition = 0;
    }

    /// Enter a set, resetting the repetition index
    pub fn set_current_set(&mut self, set: u32) {
        self.current_set = set;
        self.current_repetition = 0;
    }

    /// Enter a repetition
    pub fn set_current_repetition(&mut self, repetition: u32) {
        self.current_repetition = repetition;
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
