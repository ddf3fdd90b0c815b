//! Test modules for the action tree
//!
//! - `sequence_action_tests` - ordering, duration sums, skip-ahead and cancellation
//! - `metronome_action_tests` - tick expansion and clip selection
//! - `wait_action_tests` - partial skips and delay failures
//! - `leaf_action_tests` - audio and speech cues
//! - `do_not_await_action_tests` - detached execution and error routing

use crate::actions::*;
use crate::context::ExecutionContext;
use crate::test_utils::{eventually, Call, TestServices};
use std::time::Duration;

mod common;




mod sequence_action_tests;

mod wait_action_tests;
