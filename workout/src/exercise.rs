//! Exercises and the event-bound actions they play

use crate::actions::{execute_children, Action, ActionResult, SayAction, SequenceAction};
use crate::context::{CurrentExercise, ExecutionContext};
use crate::events::{Event, EventMatcher, EventScope};
use crate::services::{LoggerService, Services};
use crate::{Result, WorkoutError};
use std::fmt;
use std::iter;
use std::sync::Arc;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// An event matcher paired with the actions it fires
///
/// The actions are always held in a single sequence so every matcher has
/// exactly one action with a well-defined duration.
#[derive(Debug, Clone)]
pub struct MatcherWithAction {
    matcher: EventMatcher,
    action: Action,
}

impl MatcherWithAction {
    /// Bind `actions` to `matcher`
    pub fn new(matcher: EventMatcher, actions: Vec<Action>) -> Self {
        Self {
            matcher,
            action: Action::Sequence(SequenceAction::new(actions)),
        }
    }

    /// Event matcher
    pub fn matcher(&self) -> &EventMatcher {
        &self.matcher
    }

    /// Sequence fired when the matcher accepts an event
    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// A named exercise with set and repetition counts and its event hooks
#[derive(Clone)]
pub struct Exercise {
    name: String,
    set_count: u32,
    repetition_count: u32,
    matchers_with_actions: Vec<MatcherWithAction>,
    announcement: Option<Action>,
    logger: Arc<dyn LoggerService>,
    duration: Duration,
}

impl Exercise {
    /// Create an exercise; counts must be positive and the name non-empty
    pub fn new(
        services: &Services,
        name: impl Into<String>,
        set_count: u32,
        repetition_count: u32,
        matchers_with_actions: Vec<MatcherWithAction>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WorkoutError::InvalidArgument {
                argument: "name",
                reason: "exercise name must not be empty".to_string(),
            });
        }
        if set_count == 0 {
            return Err(WorkoutError::InvalidArgument {
                argument: "set_count",
                reason: format!("exercise '{}' must have at least one set", name),
            });
        }
        if repetition_count == 0 {
            return Err(WorkoutError::InvalidArgument {
                argument: "repetition_count",
                reason: format!("exercise '{}' must have at least one repetition", name),
            });
        }

        let announcement = services
            .announce_exercises
            .then(|| Action::Say(SayAction::new(Arc::clone(&services.speech), name.clone())));

        let mut exercise = Self {
            name,
            set_count,
            repetition_count,
            matchers_with_actions,
            announcement,
            logger: Arc::clone(&services.logger),
            duration: Duration::ZERO,
        };
        exercise.duration = exercise.compute_duration()?;
        Ok(exercise)
    }

    /// Exercise name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sets
    pub fn set_count(&self) -> u32 {
        self.set_count
    }

    /// Number of repetitions per set
    pub fn repetition_count(&self) -> u32 {
        self.repetition_count
    }

    /// Matchers in declaration order
    pub fn matchers_with_actions(&self) -> &[MatcherWithAction] {
        &self.matchers_with_actions
    }

    /// Total duration of every action fired over the whole exercise
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Bounds published to the context while this exercise plays
    pub fn bounds(&self) -> CurrentExercise {
        CurrentExercise {
            name: self.name.clone(),
            set_count: self.set_count,
            repetition_count: self.repetition_count,
        }
    }

    /// Every event raised by this exercise, in order
    ///
    /// Events are produced on demand; the timeline is never held in memory.
    pub fn events(&self) -> impl Iterator<Item = Event> {
        let repetition_count = self.repetition_count;
        let sets = (1..=self.set_count).flat_map(move |set| {
            let repetitions = (1..=repetition_count).flat_map(move |repetition| {
                [
                    Event::BeforeRepetition { set, repetition },
                    Event::DuringRepetition { set, repetition },
                    Event::AfterRepetition { set, repetition },
                ]
            });
            iter::once(Event::BeforeSet { set })
                .chain(repetitions)
                .chain(iter::once(Event::AfterSet { set }))
        });

        iter::once(Event::BeforeExercise)
            .chain(sets)
            .chain(iter::once(Event::AfterExercise))
    }

    /// Actions whose matcher accepts `event`, in declaration order
    pub fn matching_actions(&self, event: &Event, context: &ExecutionContext) -> Vec<&Action> {
        self.matchers_with_actions
            .iter()
            .filter(|m| m.matcher.matches(event, context))
            .map(|m| &m.action)
            .collect()
    }

    /// How many events of the whole exercise fire `matcher`
    fn firings(&self, matcher: &EventMatcher) -> u64 {
        let sets = u64::from(self.set_count);
        let repetitions = u64::from(self.repetition_count);
        match matcher {
            EventMatcher::Typed(kind) => match kind.scope() {
                EventScope::Exercise => 1,
                EventScope::Set => sets,
                EventScope::Repetition => sets * repetitions,
            },
            EventMatcher::Numbered { kind, constraint } => match kind.scope() {
                EventScope::Exercise => 0,
                EventScope::Set => constraint.count_matches(1, self.set_count),
                EventScope::Repetition => sets * constraint.count_matches(1, self.repetition_count),
            },
        }
    }

    fn compute_duration(&self) -> Result<Duration> {
        self.matchers_with_actions
            .iter()
            .try_fold(Duration::ZERO, |total, m| {
                repeated(m.action.duration(), self.firings(&m.matcher))
                    .and_then(|fired| total.checked_add(fired))
            })
            .ok_or_else(|| WorkoutError::InvalidArgument {
                argument: "repetition_count",
                reason: format!("exercise '{}' is too long to play", self.name),
            })
    }

    /// Raise every event in order, running the actions bound to each
    pub async fn execute(&self, context: &mut ExecutionContext) -> ActionResult<()> {
        context.set_current_exercise(self.bounds());
        self.logger.info(&format!(
            "Starting exercise '{}' ({} sets x {} reps)",
            self.name, self.set_count, self.repetition_count
        ));

        for event in self.events() {
            event.apply_to(context);
            tracing::debug!(
                "Exercise '{}': {:?} (set {}, rep {})",
                self.name,
                event,
                context.current_set(),
                context.current_repetition()
            );

            if event == Event::BeforeExercise {
                if let Some(announcement) = &self.announcement {
                    execute_children(iter::once(announcement), context).await?;
                }
            }

            let actions = self.matching_actions(&event, context);
            execute_children(actions, context).await?;
        }

        self.logger.info(&format!("Finished exercise '{}'", self.name));
        Ok(())
    }
}

/// `duration` played `times` times, or `None` past `Duration::MAX`
fn repeated(duration: Duration, times: u64) -> Option<Duration> {
    let nanos = duration.as_nanos().checked_mul(u128::from(times))?;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    let subsec = u32::try_from(nanos % NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, subsec))
}

impl fmt::Debug for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exercise")
            .field("name", &self.name)
            .field("set_count", &self.set_count)
            .field("repetition_count", &self.repetition_count)
            .field("matchers_with_actions", &self.matchers_with_actions)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}
