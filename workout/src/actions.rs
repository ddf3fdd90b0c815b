//! Action tree execution system
//!
//! Every node has a duration fixed at construction and an asynchronous,
//! cancellable `execute`. Composite nodes honour skip-ahead by bypassing any
//! child whose whole duration is covered by the remaining skip; leaves that
//! take time consume any partial remainder themselves.

use crate::context::ExecutionContext;
use crate::services::{
    AudioService, DelayService, LoggerService, MetronomeClips, ServiceError, Services,
    SpeechService,
};
use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during action execution
#[derive(Debug, Error)]
pub enum ActionError {
    /// The run was cancelled before it completed
    #[error("execution was cancelled")]
    Cancelled,
    /// A directly awaited collaborator failed
    #[error("service error: {0}")]
    Service(ServiceError),
}

impl From<ServiceError> for ActionError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Cancelled => ActionError::Cancelled,
            other => ActionError::Service(other),
        }
    }
}

/// Result type for action operations
pub type ActionResult<T> = Result<T, ActionError>;

/// A node of the action tree
#[derive(Debug, Clone)]
pub enum Action {
    /// Ordered children
    Sequence(SequenceAction),
    /// Timed clicks and bells
    Metronome(MetronomeAction),
    /// Fixed pause
    Wait(WaitAction),
    /// Awaited audio clip
    Audio(AudioAction),
    /// Awaited speech
    Say(SayAction),
    /// Detached execution of another action
    DoNotAwait(DoNotAwaitAction),
}

impl Action {
    /// Time this action accounts for on the run's timeline
    pub fn duration(&self) -> Duration {
        match self {
            Action::Sequence(action) => action.duration(),
            Action::Metronome(action) => action.duration(),
            Action::Wait(action) => action.duration(),
            Action::Audio(_) | Action::Say(_) | Action::DoNotAwait(_) => Duration::ZERO,
        }
    }

    /// Execute the action against the run's context
    pub fn execute<'a>(
        &'a self,
        context: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ActionResult<()>> {
        tracing::trace!("Executing {} action: {}", self.action_type(), self.description());
        match self {
            Action::Sequence(action) => action.execute(context).boxed(),
            Action::Metronome(action) => action.execute(context).boxed(),
            Action::Wait(action) => action.execute(context).boxed(),
            Action::Audio(action) => action.execute(context).boxed(),
            Action::Say(action) => action.execute(context).boxed(),
            Action::DoNotAwait(action) => {
                let result = action.execute(context);
                futures_util::future::ready(result).boxed()
            }
        }
    }

    /// Human readable summary
    pub fn description(&self) -> String {
        match self {
            Action::Sequence(action) => format!(
                "Sequence of {} actions ({:?})",
                action.children().len(),
                action.duration()
            ),
            Action::Metronome(action) => format!(
                "Metronome with {} ticks ({:?})",
                action.ticks().len(),
                action.duration()
            ),
            Action::Wait(action) => format!("Wait for {:?}", action.duration()),
            Action::Audio(action) => format!("Play '{}'", action.clip()),
            Action::Say(action) => format!("Say '{}'", action.text()),
            Action::DoNotAwait(action) => {
                format!("Without waiting: {}", action.inner().description())
            }
        }
    }

    /// Short type tag
    pub fn action_type(&self) -> &'static str {
        match self {
            Action::Sequence(_) => "sequence",
            Action::Metronome(_) => "metronome",
            Action::Wait(_) => "wait",
            Action::Audio(_) => "audio",
            Action::Say(_) => "say",
            Action::DoNotAwait(_) => "do_not_await",
        }
    }
}

/// Run `children` in order under the skip/cancel protocol
///
/// Cancellation is checked before every child. A child entirely covered by the
/// remaining skip-ahead is not executed; its duration is consumed and counted
/// as progress instead.
pub(crate) async fn execute_children<'a, I>(
    children: I,
    context: &mut ExecutionContext,
) -> ActionResult<()>
where
    I: IntoIterator<Item = &'a Action>,
    I::IntoIter: Send,
{
    for child in children {
        context.check_cancelled()?;

        let duration = child.duration();
        if context.can_skip(duration) {
            context.skip(duration);
            continue;
        }

        child.execute(context).await?;
    }

    Ok(())
}

/// Ordered children; duration is the sum of the children's durations
#[derive(Debug, Clone, Default)]
pub struct SequenceAction {
    children: Vec<Action>,
    duration: Duration,
}

impl SequenceAction {
    /// Create a sequence from its children
    pub fn new(children: Vec<Action>) -> Self {
        let duration = children
            .iter()
            .map(Action::duration)
            .fold(Duration::ZERO, Duration::saturating_add);
        Self { children, duration }
    }

    /// Children in execution order
    pub fn children(&self) -> &[Action] {
        &self.children
    }

    /// Sum of the children's durations
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Execute each child in order
    pub async fn execute(&self, context: &mut ExecutionContext) -> ActionResult<()> {
        execute_children(&self.children, context).await
    }
}

impl From<SequenceAction> for Action {
    fn from(action: SequenceAction) -> Self {
        Action::Sequence(action)
    }
}

/// Kind of cue played by a metronome tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetronomeTickType {
    /// Regular click
    Click,
    /// Accented bell
    Bell,
}

/// One metronome cue and the pause preceding it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetronomeTick {
    /// Cue to play
    pub tick_type: MetronomeTickType,
    /// Pause before the cue
    pub period_before: Duration,
}

impl MetronomeTick {
    /// Create a tick
    pub fn new(tick_type: MetronomeTickType, period_before: Duration) -> Self {
        Self {
            tick_type,
            period_before,
        }
    }
}

/// Waits before each tick, then fires its cue without waiting for playback
#[derive(Debug, Clone)]
pub struct MetronomeAction {
    ticks: Vec<MetronomeTick>,
    inner: SequenceAction,
}

impl MetronomeAction {
    /// Build the metronome from `ticks` using the given collaborators
    pub fn new(services: &Services, ticks: Vec<MetronomeTick>) -> Self {
        let inner = SequenceAction::new(Self::inner_actions(
            &services.audio,
            &services.delay,
            &services.logger,
            &services.clips,
            &ticks,
        ));
        Self { ticks, inner }
    }

    fn inner_actions(
        audio: &Arc<dyn AudioService>,
        delay: &Arc<dyn DelayService>,
        logger: &Arc<dyn LoggerService>,
        clips: &MetronomeClips,
        ticks: &[MetronomeTick],
    ) -> Vec<Action> {
        let mut actions = Vec::with_capacity(ticks.len() * 2);
        for tick in ticks {
            actions.push(Action::Wait(WaitAction::new(
                Arc::clone(delay),
                tick.period_before,
            )));

            let clip = match tick.tick_type {
                MetronomeTickType::Click => &clips.click,
                MetronomeTickType::Bell => &clips.bell,
            };
            actions.push(Action::DoNotAwait(DoNotAwaitAction::new(
                Arc::clone(logger),
                Action::Audio(AudioAction::new(Arc::clone(audio), clip.clone())),
            )));
        }
        actions
    }

    /// Ticks in playback order
    pub fn ticks(&self) -> &[MetronomeTick] {
        &self.ticks
    }

    /// Interleaved waits and cues
    pub fn inner(&self) -> &SequenceAction {
        &self.inner
    }

    /// Sum of the tick periods
    pub fn duration(&self) -> Duration {
        self.inner.duration()
    }

    /// Play the ticks
    pub async fn execute(&self, context: &mut ExecutionContext) -> ActionResult<()> {
        self.inner.execute(context).await
    }
}

/// Fixed pause delegated to the delay collaborator
#[derive(Clone)]
pub struct WaitAction {
    delay: Arc<dyn DelayService>,
    period: Duration,
}

impl WaitAction {
    /// Create a wait of `period`
    pub fn new(delay: Arc<dyn DelayService>, period: Duration) -> Self {
        Self { delay, period }
    }

    /// Length of the pause
    pub fn duration(&self) -> Duration {
        self.period
    }

    /// Delay for the period, shortened by any remaining skip-ahead
    pub async fn execute(&self, context: &mut ExecutionContext) -> ActionResult<()> {
        let skipped = context.consume_skip_ahead(self.period);
        context.add_progress(skipped);

        let remaining = self.period - skipped;
        if remaining.is_zero() {
            return Ok(());
        }

        self.delay
            .delay(remaining, context.cancellation())
            .await?;
        context.add_progress(remaining);
        Ok(())
    }
}

impl fmt::Debug for WaitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitAction")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

/// Plays one audio clip and waits for playback to finish
#[derive(Clone)]
pub struct AudioAction {
    audio: Arc<dyn AudioService>,
    clip: String,
}

impl AudioAction {
    /// Create an action playing `clip`
    pub fn new(audio: Arc<dyn AudioService>, clip: impl Into<String>) -> Self {
        Self {
            audio,
            clip: clip.into(),
        }
    }

    /// Clip identifier
    pub fn clip(&self) -> &str {
        &self.clip
    }

    /// Play the clip
    pub async fn execute(&self, _context: &mut ExecutionContext) -> ActionResult<()> {
        self.audio.play(&self.clip).await?;
        Ok(())
    }
}

impl fmt::Debug for AudioAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioAction")
            .field("clip", &self.clip)
            .finish_non_exhaustive()
    }
}

/// Speaks a phrase and waits for speech to finish
#[derive(Clone)]
pub struct SayAction {
    speech: Arc<dyn SpeechService>,
    text: String,
}

impl SayAction {
    /// Create an action speaking `text`
    pub fn new(speech: Arc<dyn SpeechService>, text: impl Into<String>) -> Self {
        Self {
            speech,
            text: text.into(),
        }
    }

    /// Phrase to speak
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Speak the phrase
    pub async fn execute(&self, _context: &mut ExecutionContext) -> ActionResult<()> {
        self.speech.say(&self.text).await?;
        Ok(())
    }
}

impl fmt::Debug for SayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SayAction")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

/// Launches another action as a detached task
///
/// Reports zero duration. Failures of the inner action go to the logger and
/// never reach the caller.
#[derive(Clone)]
pub struct DoNotAwaitAction {
    logger: Arc<dyn LoggerService>,
    inner: Arc<Action>,
}

impl DoNotAwaitAction {
    /// Wrap `inner`
    pub fn new(logger: Arc<dyn LoggerService>, inner: Action) -> Self {
        Self {
            logger,
            inner: Arc::new(inner),
        }
    }

    /// Wrapped action
    pub fn inner(&self) -> &Action {
        &self.inner
    }

    /// Schedule the inner action and return immediately
    pub fn execute(&self, context: &ExecutionContext) -> ActionResult<()> {
        let inner = Arc::clone(&self.inner);
        let logger = Arc::clone(&self.logger);
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                self.logger.error(&format!(
                    "Cannot detach action '{}': {}",
                    inner.description(),
                    e
                ));
                return Ok(());
            }
        };
        let mut detached = context.detached();

        runtime.spawn(async move {
            if let Err(e) = inner.execute(&mut detached).await {
                logger.error(&format!(
                    "Failed to execute detached action '{}': {}",
                    inner.description(),
                    e
                ));
            }
        });

        Ok(())
    }
}

impl fmt::Debug for DoNotAwaitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoNotAwaitAction")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
