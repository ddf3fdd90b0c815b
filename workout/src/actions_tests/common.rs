//! Builders shared by the action tests

use crate::actions::{Action, AudioAction, SayAction, SequenceAction, WaitAction};
use crate::test_utils::TestServices;
use std::time::Duration;

pub fn wait(test: &TestServices, millis: u64) -> Action {
    Action::Wait(WaitAction::new(
        test.services().delay,
        Duration::from_millis(millis),
    ))
}

pub fn say(test: &TestServices, text: &str) -> Action {
    Action::Say(SayAction::new(test.services().speech, text))
}

pub fn play(test: &TestServices, clip: &str) -> Action {
    Action::Audio(AudioAction::new(test.services().audio, clip))
}

pub fn sequence(children: Vec<Action>) -> Action {
    Action::Sequence(SequenceAction::new(children))
}
