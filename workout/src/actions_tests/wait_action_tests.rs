//! Tests for the wait action

use super::common::*;
use super::*;
use crate::services::{ServiceError, TokioDelayService};
use std::sync::Arc;
use std::time::Instant;

#[tokio::test]
async fn test_wait_delays_for_its_period() {
    let test = TestServices::new();
    let action = wait(&test, 1_500);
    let mut context = ExecutionContext::new();

    action.execute(&mut context).await.unwrap();

    assert_eq!(test.delays(), vec![Duration::from_millis(1_500)]);
    assert_eq!(context.progress(), Duration::from_millis(1_500));
    assert_eq!(action.action_type(), "wait");
}

#[tokio::test]
async fn test_partial_skip_shortens_the_delay() {
    let test = TestServices::new();
    let action = Action::Wait(WaitAction::new(
        test.services().delay,
        Duration::from_secs(10),
    ));
    let mut context = ExecutionContext::new().with_skip_ahead(Duration::from_secs(4));

    action.execute(&mut context).await.unwrap();

    assert_eq!(test.delays(), vec![Duration::from_secs(6)]);
    assert_eq!(context.skip_ahead(), Duration::ZERO);
    assert_eq!(context.progress(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_zero_wait_never_calls_the_delay() {
    let test = TestServices::new().with_failing_delay();
    let action = wait(&test, 0);

    action.execute(&mut ExecutionContext::new()).await.unwrap();

    assert!(test.calls().is_empty());
}

#[tokio::test]
async fn test_delay_failure_propagates() {
    let test = TestServices::new().with_failing_delay();
    let action = wait(&test, 10);
    let mut context = ExecutionContext::new();

    let result = action.execute(&mut context).await;

    assert!(matches!(
        result,
        Err(ActionError::Service(ServiceError::Failed(_)))
    ));
    assert_eq!(context.progress(), Duration::ZERO);
}

#[tokio::test]
async fn test_real_delay_is_interrupted_by_cancellation() {
    let action = Action::Wait(WaitAction::new(
        Arc::new(TokioDelayService),
        Duration::from_secs(30),
    ));
    let mut context = ExecutionContext::new();
    let token = context.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let start = Instant::now();
    let result = action.execute(&mut context).await;

    assert!(matches!(result, Err(ActionError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(context.progress(), Duration::ZERO);
}
