//! Collaborator contracts consumed by the action tree
//!
//! Audio playback, speech, delays and logging live outside this crate. Actions
//! receive concrete collaborators at parse time through the [`Services`] record,
//! so nothing is looked up while a program is running.

use crate::config::Config;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Clip played for a metronome click unless configured otherwise
pub const DEFAULT_CLICK_CLIP: &str = "Audio/MetronomeClick.mp3";

/// Clip played for a metronome bell unless configured otherwise
pub const DEFAULT_BELL_CLIP: &str = "Audio/MetronomeBell.mp3";

/// Errors reported by collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The operation observed cancellation before completing
    #[error("operation was cancelled")]
    Cancelled,
    /// The collaborator could not find or open what it was asked to use
    #[error("resource unavailable: {0}")]
    Unavailable(String),
    /// Any other collaborator failure
    #[error("service failed: {0}")]
    Failed(String),
}

/// Result type for collaborator operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Plays audio clips
#[async_trait::async_trait]
pub trait AudioService: Send + Sync {
    /// Play the clip and resolve once playback has finished
    async fn play(&self, clip: &str) -> ServiceResult<()>;
}

/// Speaks text aloud
#[async_trait::async_trait]
pub trait SpeechService: Send + Sync {
    /// Speak the text and resolve once speech has finished
    async fn say(&self, text: &str) -> ServiceResult<()>;
}

/// Suspends execution for a period
#[async_trait::async_trait]
pub trait DelayService: Send + Sync {
    /// Wait for `duration`, returning [`ServiceError::Cancelled`] if the token fires first
    async fn delay(&self, duration: Duration, cancellation: &CancellationToken)
        -> ServiceResult<()>;
}

/// Receives diagnostic messages. Implementations must never panic.
pub trait LoggerService: Send + Sync {
    /// Record an informational message
    fn info(&self, message: &str);

    /// Record an error message
    fn error(&self, message: &str);
}

/// Delay service backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelayService;

#[async_trait::async_trait]
impl DelayService for TokioDelayService {
    async fn delay(
        &self,
        duration: Duration,
        cancellation: &CancellationToken,
    ) -> ServiceResult<()> {
        if duration.is_zero() {
            return Ok(());
        }

        tokio::select! {
            _ = cancellation.cancelled() => Err(ServiceError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

/// Logger that forwards to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl LoggerService for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Audio clip identifiers used by metronome ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetronomeClips {
    /// Clip for a regular click
    pub click: String,
    /// Clip for an accented bell
    pub bell: String,
}

impl Default for MetronomeClips {
    fn default() -> Self {
        Self {
            click: DEFAULT_CLICK_CLIP.to_string(),
            bell: DEFAULT_BELL_CLIP.to_string(),
        }
    }
}

/// Concrete collaborators threaded into every action built by the parser
#[derive(Clone)]
pub struct Services {
    /// Audio playback
    pub audio: Arc<dyn AudioService>,
    /// Timed delays
    pub delay: Arc<dyn DelayService>,
    /// Diagnostics sink
    pub logger: Arc<dyn LoggerService>,
    /// Text to speech
    pub speech: Arc<dyn SpeechService>,
    /// Clips used by metronome ticks
    pub clips: MetronomeClips,
    /// Whether exercises speak their name before starting
    pub announce_exercises: bool,
}

impl Services {
    /// Create a collaborator record with default clips and announcements enabled
    pub fn new(
        audio: Arc<dyn AudioService>,
        delay: Arc<dyn DelayService>,
        logger: Arc<dyn LoggerService>,
        speech: Arc<dyn SpeechService>,
    ) -> Self {
        Self {
            audio,
            delay,
            logger,
            speech,
            clips: MetronomeClips::default(),
            announce_exercises: true,
        }
    }

    /// Replace the metronome clips
    pub fn with_clips(mut self, clips: MetronomeClips) -> Self {
        self.clips = clips;
        self
    }

    /// Enable or disable exercise name announcements
    pub fn with_announcements(mut self, announce: bool) -> Self {
        self.announce_exercises = announce;
        self
    }

    /// Apply clip identifiers and announcement settings from configuration
    pub fn with_config(self, config: &Config) -> Self {
        self.with_clips(MetronomeClips {
            click: config.metronome_click_clip.clone(),
            bell: config.metronome_bell_clip.clone(),
        })
        .with_announcements(config.announce_exercises)
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("clips", &self.clips)
            .field("announce_exercises", &self.announce_exercises)
            .finish_non_exhaustive()
    }
}
