//! Recording collaborators for tests
//!
//! [`TestServices`] hands out a [`Services`] record whose audio, speech and
//! delay collaborators append to one shared call log instead of touching
//! real devices or timers. Delays return immediately, so tests exercise the
//! full timeline without sleeping.
//!
//! ```
//! use workout::test_utils::{Call, TestServices};
//! use workout::ExercisePrograms;
//!
//! let test = TestServices::new();
//! let programs = ExercisePrograms::parse("# P\n\n## E\n\n*1 set x 1 rep\n", &test.services())
//!     .unwrap();
//! assert_eq!(programs.len(), 1);
//! assert!(test.calls().is_empty());
//! # let _ = Call::Say(String::new());
//! ```

use crate::services::{
    AudioService, DelayService, LoggerService, ServiceError, ServiceResult, Services,
    SpeechService,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A collaborator invocation, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// A delay that ran to completion
    Delay(Duration),
    /// A clip that was played
    Play(String),
    /// A phrase that was spoken
    Say(String),
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    delays_started: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Recorder {
    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }
}

#[derive(Debug, Clone, Default)]
struct Behaviour {
    fail_audio: bool,
    fail_speech: bool,
    fail_delay: bool,
    cancel_after_delays: Option<(usize, CancellationToken)>,
}

struct RecordingAudio {
    recorder: Arc<Recorder>,
    behaviour: Behaviour,
}

#[async_trait::async_trait]
impl AudioService for RecordingAudio {
    async fn play(&self, clip: &str) -> ServiceResult<()> {
        tokio::task::yield_now().await;
        if self.behaviour.fail_audio {
            return Err(ServiceError::Unavailable(clip.to_string()));
        }
        self.recorder.record(Call::Play(clip.to_string()));
        Ok(())
    }
}

struct RecordingSpeech {
    recorder: Arc<Recorder>,
    behaviour: Behaviour,
}

#[async_trait::async_trait]
impl SpeechService for RecordingSpeech {
    async fn say(&self, text: &str) -> ServiceResult<()> {
        if self.behaviour.fail_speech {
            return Err(ServiceError::Failed(format!("cannot say '{}'", text)));
        }
        self.recorder.record(Call::Say(text.to_string()));
        Ok(())
    }
}

struct RecordingDelay {
    recorder: Arc<Recorder>,
    behaviour: Behaviour,
}

#[async_trait::async_trait]
impl DelayService for RecordingDelay {
    async fn delay(
        &self,
        duration: Duration,
        cancellation: &CancellationToken,
    ) -> ServiceResult<()> {
        tokio::task::yield_now().await;
        if cancellation.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        if self.behaviour.fail_delay {
            return Err(ServiceError::Failed("delay failed".to_string()));
        }

        let started = self.recorder.delays_started.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((limit, token)) = &self.behaviour.cancel_after_delays {
            if started > *limit {
                token.cancel();
                return Err(ServiceError::Cancelled);
            }
        }

        self.recorder.record(Call::Delay(duration));
        Ok(())
    }
}

struct RecordingLogger {
    recorder: Arc<Recorder>,
}

impl LoggerService for RecordingLogger {
    fn info(&self, message: &str) {
        lock(&self.recorder.infos).push(message.to_string());
    }

    fn error(&self, message: &str) {
        lock(&self.recorder.errors).push(message.to_string());
    }
}

/// Factory for [`Services`] backed by recording collaborators
#[derive(Debug, Clone, Default)]
pub struct TestServices {
    recorder: Arc<Recorder>,
    behaviour: Behaviour,
}

impl TestServices {
    /// Collaborators that succeed and record every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Audio playback fails with [`ServiceError::Unavailable`]
    pub fn with_failing_audio(mut self) -> Self {
        self.behaviour.fail_audio = true;
        self
    }

    /// Speech fails with [`ServiceError::Failed`]
    pub fn with_failing_speech(mut self) -> Self {
        self.behaviour.fail_speech = true;
        self
    }

    /// Delays fail with [`ServiceError::Failed`]
    pub fn with_failing_delay(mut self) -> Self {
        self.behaviour.fail_delay = true;
        self
    }

    /// Let `completed` delays finish, then cancel `token` when the next one starts
    pub fn cancel_after_delays(mut self, completed: usize, token: CancellationToken) -> Self {
        self.behaviour.cancel_after_delays = Some((completed, token));
        self
    }

    /// Collaborator record sharing this factory's call log
    pub fn services(&self) -> Services {
        Services::new(
            Arc::new(RecordingAudio {
                recorder: Arc::clone(&self.recorder),
                behaviour: self.behaviour.clone(),
            }),
            Arc::new(RecordingDelay {
                recorder: Arc::clone(&self.recorder),
                behaviour: self.behaviour.clone(),
            }),
            Arc::new(RecordingLogger {
                recorder: Arc::clone(&self.recorder),
            }),
            Arc::new(RecordingSpeech {
                recorder: Arc::clone(&self.recorder),
                behaviour: self.behaviour.clone(),
            }),
        )
    }

    /// Every recorded call in order
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.recorder.calls).clone()
    }

    /// Completed delays in order
    pub fn delays(&self) -> Vec<Duration> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delay(duration) => Some(duration),
                _ => None,
            })
            .collect()
    }

    /// Played clips in order
    pub fn plays(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Play(clip) => Some(clip),
                _ => None,
            })
            .collect()
    }

    /// Spoken phrases in order
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Say(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Messages passed to [`LoggerService::info`]
    pub fn logged_infos(&self) -> Vec<String> {
        lock(&self.recorder.infos).clone()
    }

    /// Messages passed to [`LoggerService::error`]
    pub fn logged_errors(&self) -> Vec<String> {
        lock(&self.recorder.errors).clone()
    }
}

/// Poll `condition` until it holds or a second has passed
///
/// Detached tasks finish on their own schedule; tests use this to wait for
/// their side effects.
pub async fn eventually<F>(condition: F) -> bool
where
    F: Fn() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
