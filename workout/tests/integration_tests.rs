use std::time::Duration;
use tokio_util::sync::CancellationToken;
use workout::prelude::*;
use workout::test_utils::{eventually, Call, TestServices};
use workout::{Config, EventKind, EventMatcher};

const DOCUMENT: &str = "\
# Full body

## Squats

*3 sets x 2 reps

* before:
    say 'Feet shoulder width'
* before set 3:
    say 'Last set'
* during rep:
    wait for 2s
* after set first..last-1:
    wait for 1m

## Push ups

*2 sets x 1 rep

* before sets:
    metronome at 0s*, 1s
* after:
    say 'Done'

# Stretch

## Hamstrings

*1 set x 1 rep

* during rep:
    wait for 30s
";

fn programs(test: &TestServices) -> ExercisePrograms {
    ExercisePrograms::parse(DOCUMENT, &test.services()).unwrap()
}

#[test]
fn test_document_structure() {
    let test = TestServices::new();
    let programs = programs(&test);

    assert_eq!(programs.len(), 2);
    let full_body = programs.find("full body").unwrap();
    let squats = &full_body.exercises()[0];

    assert_eq!(squats.name(), "Squats");
    assert_eq!((squats.set_count(), squats.repetition_count()), (3, 2));
    assert_eq!(
        squats.matchers_with_actions()[1].matcher(),
        &EventMatcher::Numbered {
            kind: EventKind::BeforeSet,
            constraint: NumericalConstraint::parse("3").unwrap(),
        }
    );

    // 6 reps * 2s + 2 rests * 60s; push ups: 2 sets * 1s
    assert_eq!(squats.duration(), Duration::from_secs(132));
    assert_eq!(full_body.exercises()[1].duration(), Duration::from_secs(2));
    assert_eq!(full_body.duration(), Duration::from_secs(134));
}

#[tokio::test]
async fn test_program_playback_order() {
    let test = TestServices::new();
    let programs = programs(&test);
    let full_body = programs.find("Full body").unwrap();
    let mut context = ExecutionContext::new();

    full_body.execute(&mut context).await.unwrap();

    assert_eq!(
        test.spoken(),
        vec![
            "Squats".to_string(),
            "Feet shoulder width".to_string(),
            "Last set".to_string(),
            "Push ups".to_string(),
            "Done".to_string(),
        ]
    );

    let squat_calls: Vec<Call> = test
        .calls()
        .into_iter()
        .take_while(|call| *call != Call::Say("Push ups".to_string()))
        .collect();
    assert_eq!(
        squat_calls,
        vec![
            Call::Say("Squats".to_string()),
            Call::Say("Feet shoulder width".to_string()),
            Call::Delay(Duration::from_secs(2)),
            Call::Delay(Duration::from_secs(2)),
            Call::Delay(Duration::from_secs(60)),
            Call::Delay(Duration::from_secs(2)),
            Call::Delay(Duration::from_secs(2)),
            Call::Delay(Duration::from_secs(60)),
            Call::Say("Last set".to_string()),
            Call::Delay(Duration::from_secs(2)),
            Call::Delay(Duration::from_secs(2)),
        ]
    );

    assert!(eventually(|| test.plays().len() == 4).await);
    assert_eq!(context.progress(), full_body.duration());
    assert_eq!(context.current_exercise_index(), 2);
}

#[tokio::test]
async fn test_resume_with_skip_ahead() {
    let test = TestServices::new();
    let programs = programs(&test);
    let full_body = programs.find("Full body").unwrap();
    let mut context = ExecutionContext::new().with_skip_ahead(Duration::from_secs(100));

    full_body.execute(&mut context).await.unwrap();

    // 100s lands inside the second rest: 2 + 2 + 60 + 2 + 2 = 68, 32s in
    assert_eq!(
        test.calls()
            .into_iter()
            .take_while(|call| *call != Call::Say("Push ups".to_string()))
            .collect::<Vec<_>>(),
        vec![
            Call::Delay(Duration::from_secs(28)),
            Call::Say("Last set".to_string()),
            Call::Delay(Duration::from_secs(2)),
            Call::Delay(Duration::from_secs(2)),
        ]
    );
    assert_eq!(context.progress(), full_body.duration());
}

#[tokio::test]
async fn test_cancellation_surfaces_as_cancelled() {
    let token = CancellationToken::new();
    let test = TestServices::new().cancel_after_delays(3, token.clone());
    let programs = programs(&test);
    let mut context = ExecutionContext::new().with_cancellation(token);

    let result: workout::Result<()> = programs.programs()[0]
        .execute(&mut context)
        .await
        .map_err(WorkoutError::from);

    assert!(matches!(result, Err(WorkoutError::Cancelled)));
    assert_eq!(test.delays().len(), 3);
    assert!(!test.spoken().contains(&"Last set".to_string()));
}

#[test]
fn test_try_parse_reports_position() {
    let test = TestServices::new();
    let error = ExercisePrograms::try_parse("# P\n\n## E\n\n*2 sets of 3 reps\n", &test.services())
        .unwrap_err();

    assert!(error.line >= 5, "{}", error);
    assert!(error.offset <= 31);
}

#[test]
fn test_configuration_shapes_parsed_actions() {
    let test = TestServices::new();
    let config = Config {
        metronome_click_clip: "click.ogg".to_string(),
        metronome_bell_clip: "bell.ogg".to_string(),
        announce_exercises: false,
    };
    let services = test.services().with_config(&config);

    let programs = ExercisePrograms::parse(DOCUMENT, &services).unwrap();
    let push_ups = &programs.programs()[0].exercises()[1];
    let Action::Sequence(actions) = push_ups.matchers_with_actions()[0].action() else {
        panic!("matcher actions are always a sequence");
    };
    let Action::Metronome(metronome) = &actions.children()[0] else {
        panic!("expected a metronome");
    };

    assert_eq!(
        metronome.inner().children()[1].description(),
        "Without waiting: Play 'bell.ogg'"
    );
}

#[tokio::test]
async fn test_announcements_can_be_disabled() {
    let test = TestServices::new();
    let services = test.services().with_announcements(false);
    let programs = ExercisePrograms::parse(DOCUMENT, &services).unwrap();

    programs
        .find("stretch")
        .unwrap()
        .execute(&mut ExecutionContext::new())
        .await
        .unwrap();

    assert!(test.spoken().is_empty());
    assert_eq!(test.delays(), vec![Duration::from_secs(30)]);
}
