//! Lifecycle events raised while an exercise plays, and matchers that select
//! the actions bound to them

use crate::constraint::NumericalConstraint;
use crate::context::ExecutionContext;
use std::fmt;

/// Kind of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Before the first set of an exercise
    BeforeExercise,
    /// After the last set of an exercise
    AfterExercise,
    /// Before a set
    BeforeSet,
    /// After a set
    AfterSet,
    /// Before a repetition
    BeforeRepetition,
    /// While a repetition is performed
    DuringRepetition,
    /// After a repetition
    AfterRepetition,
}

/// Which index a numbered event is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Whole exercise
    Exercise,
    /// Set index
    Set,
    /// Repetition index
    Repetition,
}

impl EventKind {
    /// Scope of the event
    pub fn scope(self) -> EventScope {
        match self {
            EventKind::BeforeExercise | EventKind::AfterExercise => EventScope::Exercise,
            EventKind::BeforeSet | EventKind::AfterSet => EventScope::Set,
            EventKind::BeforeRepetition
            | EventKind::DuringRepetition
            | EventKind::AfterRepetition => EventScope::Repetition,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::BeforeExercise => "before",
            EventKind::AfterExercise => "after",
            EventKind::BeforeSet => "before set",
            EventKind::AfterSet => "after set",
            EventKind::BeforeRepetition => "before rep",
            EventKind::DuringRepetition => "during rep",
            EventKind::AfterRepetition => "after rep",
        };
        f.write_str(name)
    }
}

/// An event instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Exercise is about to start
    BeforeExercise,
    /// Exercise has finished
    AfterExercise,
    /// Set `set` is about to start
    BeforeSet {
        /// One-based set index
        set: u32,
    },
    /// Set `set` has finished
    AfterSet {
        /// One-based set index
        set: u32,
    },
    /// Repetition `repetition` of set `set` is about to start
    BeforeRepetition {
        /// One-based set index
        set: u32,
        /// One-based repetition index
        repetition: u32,
    },
    /// Repetition `repetition` of set `set` is being performed
    DuringRepetition {
        /// One-based set index
        set: u32,
        /// One-based repetition index
        repetition: u32,
    },
    /// Repetition `repetition` of set `set` has finished
    AfterRepetition {
        /// One-based set index
        set: u32,
        /// One-based repetition index
        repetition: u32,
    },
}

impl Event {
    /// Kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Event::BeforeExercise => EventKind::BeforeExercise,
            Event::AfterExercise => EventKind::AfterExercise,
            Event::BeforeSet { .. } => EventKind::BeforeSet,
            Event::AfterSet { .. } => EventKind::AfterSet,
            Event::BeforeRepetition { .. } => EventKind::BeforeRepetition,
            Event::DuringRepetition { .. } => EventKind::DuringRepetition,
            Event::AfterRepetition { .. } => EventKind::AfterRepetition,
        }
    }

    /// Move the context's indices to where this event occurs
    pub fn apply_to(&self, context: &mut ExecutionContext) {
        match *self {
            Event::BeforeExercise | Event::AfterExercise => {}
            Event::BeforeSet { set } | Event::AfterSet { set } => {
                if context.current_set() != set {
                    context.set_current_set(set);
                }
            }
            Event::BeforeRepetition { set, repetition }
            | Event::DuringRepetition { set, repetition }
            | Event::AfterRepetition { set, repetition } => {
                if context.current_set() != set {
                    context.set_current_set(set);
                }
                context.set_current_repetition(repetition);
            }
        }
    }
}

/// Selects the events an action is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventMatcher {
    /// Every event of the kind
    Typed(EventKind),
    /// Events of the kind whose current index satisfies the constraint
    Numbered {
        /// Event kind; always a set or repetition kind
        kind: EventKind,
        /// Constraint over the current set or repetition index
        constraint: NumericalConstraint,
    },
}

impl EventMatcher {
    /// Kind this matcher listens for
    pub fn kind(&self) -> EventKind {
        match self {
            EventMatcher::Typed(kind) => *kind,
            EventMatcher::Numbered { kind, .. } => *kind,
        }
    }

    /// Whether `event` fires this matcher given the run's current indices
    ///
    /// Numbered matchers evaluate their constraint with `first` = 1 and `last`
    /// taken from the exercise in the context at the time of the call.
    pub fn matches(&self, event: &Event, context: &ExecutionContext) -> bool {
        match self {
            EventMatcher::Typed(kind) => event.kind() == *kind,
            EventMatcher::Numbered { kind, constraint } => {
                if event.kind() != *kind {
                    return false;
                }
                let Some(exercise) = context.current_exercise() else {
                    return false;
                };
                let (actual, last) = match kind.scope() {
                    EventScope::Set => (context.current_set(), exercise.set_count),
                    EventScope::Repetition => {
                        (context.current_repetition(), exercise.repetition_count)
                    }
                    EventScope::Exercise => return false,
                };
                constraint.matches(actual, 1, last)
            }
        }
    }
}

impl fmt::Display for EventMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventMatcher::Typed(kind) => write!(f, "{}", kind),
            EventMatcher::Numbered { kind, constraint } => write!(f, "{} {}", kind, constraint),
        }
    }
}
