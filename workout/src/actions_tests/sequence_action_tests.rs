//! Tests for sequence ordering, skip-ahead and cancellation

use super::common::*;
use super::*;
use crate::services::ServiceError;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

fn run(action: &Action, context: &mut ExecutionContext) -> ActionResult<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(action.execute(context))
}

/// Delays a sequence of waits should produce under `skip_ahead`
fn expected_delays(durations: &[u64], skip_ahead: u64) -> Vec<Duration> {
    let mut remaining = skip_ahead;
    let mut delays = Vec::new();
    for &duration in durations {
        if remaining > 0 && remaining >= duration {
            remaining -= duration;
            continue;
        }
        let partial = remaining.min(duration);
        remaining -= partial;
        if duration > partial {
            delays.push(Duration::from_millis(duration - partial));
        }
    }
    delays
}

#[tokio::test]
async fn test_empty_sequence_is_a_no_op() {
    let action = sequence(vec![]);
    let mut context = ExecutionContext::new();

    assert_eq!(action.duration(), Duration::ZERO);
    action.execute(&mut context).await.unwrap();
    assert_eq!(context.progress(), Duration::ZERO);
}

#[tokio::test]
async fn test_children_run_in_order() {
    let test = TestServices::new();
    let action = sequence(vec![
        say(&test, "ready"),
        wait(&test, 100),
        sequence(vec![play(&test, "bell.mp3"), wait(&test, 50)]),
        say(&test, "done"),
    ]);

    action.execute(&mut ExecutionContext::new()).await.unwrap();

    assert_eq!(
        test.calls(),
        vec![
            Call::Say("ready".to_string()),
            Call::Delay(Duration::from_millis(100)),
            Call::Play("bell.mp3".to_string()),
            Call::Delay(Duration::from_millis(50)),
            Call::Say("done".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_skip_ahead_bypasses_covered_prefix() {
    let test = TestServices::new();
    let action = sequence(vec![
        say(&test, "one"),
        wait(&test, 100),
        wait(&test, 200),
        say(&test, "two"),
        wait(&test, 300),
        say(&test, "three"),
    ]);
    let mut context = ExecutionContext::new().with_skip_ahead(Duration::from_millis(350));

    action.execute(&mut context).await.unwrap();

    // The skip covers 100 + 200 and the zero-length cues between them; the
    // last wait absorbs the remaining 50ms.
    assert_eq!(
        test.calls(),
        vec![
            Call::Delay(Duration::from_millis(250)),
            Call::Say("three".to_string()),
        ]
    );
    assert_eq!(context.skip_ahead(), Duration::ZERO);
    assert_eq!(context.progress(), Duration::from_millis(600));
}

#[tokio::test]
async fn test_nested_sequence_is_skipped_whole() {
    let test = TestServices::new();
    let action = sequence(vec![
        sequence(vec![wait(&test, 100), say(&test, "inner")]),
        wait(&test, 100),
    ]);
    let mut context = ExecutionContext::new().with_skip_ahead(Duration::from_millis(100));

    action.execute(&mut context).await.unwrap();

    assert_eq!(test.calls(), vec![Call::Delay(Duration::from_millis(100))]);
}

#[tokio::test]
async fn test_cancelled_context_runs_nothing() {
    let test = TestServices::new();
    let action = sequence(vec![say(&test, "never"), wait(&test, 10)]);
    let mut context = ExecutionContext::new();
    context.cancel();

    let result = action.execute(&mut context).await;

    assert!(matches!(result, Err(ActionError::Cancelled)));
    assert!(test.calls().is_empty());
}

#[tokio::test]
async fn test_cancellation_stops_remaining_children() {
    let token = CancellationToken::new();
    let test = TestServices::new().cancel_after_delays(1, token.clone());
    let action = sequence(vec![
        wait(&test, 10),
        wait(&test, 20),
        say(&test, "never"),
        wait(&test, 30),
    ]);
    let mut context = ExecutionContext::new().with_cancellation(token);

    let result = action.execute(&mut context).await;

    assert!(matches!(result, Err(ActionError::Cancelled)));
    assert_eq!(test.calls(), vec![Call::Delay(Duration::from_millis(10))]);
    assert_eq!(context.progress(), Duration::from_millis(10));
}

#[tokio::test]
async fn test_awaited_failure_aborts_the_sequence() {
    let test = TestServices::new().with_failing_delay();
    let action = sequence(vec![wait(&test, 10), say(&test, "never")]);

    let result = action.execute(&mut ExecutionContext::new()).await;

    assert!(matches!(
        result,
        Err(ActionError::Service(ServiceError::Failed(_)))
    ));
    assert!(test.spoken().is_empty());
}

proptest! {
    #[test]
    fn test_duration_is_sum_of_children(durations in prop::collection::vec(0u64..5_000, 0..12)) {
        let test = TestServices::new();
        let children = durations.iter().map(|d| wait(&test, *d)).collect();
        let action = sequence(children);

        prop_assert_eq!(action.duration(), Duration::from_millis(durations.iter().sum()));
    }

    #[test]
    fn test_skip_ahead_consumes_exactly_the_skipped_prefix(
        durations in prop::collection::vec(0u64..1_000, 0..8),
        skip_fraction in 0.0f64..1.2,
    ) {
        let total: u64 = durations.iter().sum();
        let skip_ahead = (total as f64 * skip_fraction) as u64;
        let test = TestServices::new();
        let action = sequence(durations.iter().map(|d| wait(&test, *d)).collect());
        let mut context = ExecutionContext::new()
            .with_skip_ahead(Duration::from_millis(skip_ahead));

        run(&action, &mut context).unwrap();

        prop_assert_eq!(test.delays(), expected_delays(&durations, skip_ahead));
        prop_assert_eq!(context.progress(), Duration::from_millis(total));
        prop_assert_eq!(
            context.skip_ahead(),
            Duration::from_millis(skip_ahead.saturating_sub(total))
        );
    }
}
