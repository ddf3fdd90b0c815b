//! Action statements: `wait for`, `say` and `metronome at`

use super::lexical::{
    blank_lines, duration, horizontal_whitespace, keyword, required_horizontal_whitespace,
};
use super::Extra;
use crate::actions::{
    Action, MetronomeAction, MetronomeTick, MetronomeTickType, SayAction, WaitAction,
};
use crate::services::Services;
use chumsky::prelude::*;
use std::sync::Arc;

fn quoted_text<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let single = none_of("'\r\n")
        .repeated()
        .to_slice()
        .delimited_by(just('\''), just('\''));
    let double = none_of("\"\r\n")
        .repeated()
        .to_slice()
        .delimited_by(just('"'), just('"'));

    single.or(double).map(|text: &str| text.to_string())
}

fn tick<'src>() -> impl Parser<'src, &'src str, MetronomeTick, Extra<'src>> + Clone {
    duration()
        .then(just('*').or_not())
        .map(|(period_before, bell)| {
            let tick_type = if bell.is_some() {
                MetronomeTickType::Bell
            } else {
                MetronomeTickType::Click
            };
            MetronomeTick::new(tick_type, period_before)
        })
}

/// A single statement
pub(crate) fn action<'src>(
    services: Services,
) -> impl Parser<'src, &'src str, Action, Extra<'src>> + Clone {
    let delay = Arc::clone(&services.delay);
    let wait = keyword("wait")
        .then(required_horizontal_whitespace())
        .then(keyword("for"))
        .then(required_horizontal_whitespace())
        .ignore_then(duration())
        .map(move |period| Action::Wait(WaitAction::new(Arc::clone(&delay), period)));

    let speech = Arc::clone(&services.speech);
    let say = keyword("say")
        .then(required_horizontal_whitespace())
        .ignore_then(quoted_text())
        .map(move |text| Action::Say(SayAction::new(Arc::clone(&speech), text)));

    let metronome = keyword("metronome")
        .then(required_horizontal_whitespace())
        .then(keyword("at"))
        .then(required_horizontal_whitespace())
        .ignore_then(
            tick()
                .separated_by(just(',').padded_by(horizontal_whitespace()))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .map(move |ticks| Action::Metronome(MetronomeAction::new(&services, ticks)));

    choice((wait, say, metronome))
}

/// Indented statement lines, one per line, with an optional `*` bullet
///
/// Blank lines between statements are allowed. The list ends at the first
/// line that is not indented.
pub(crate) fn action_list<'src>(
    services: Services,
) -> impl Parser<'src, &'src str, Vec<Action>, Extra<'src>> + Clone {
    let line = required_horizontal_whitespace()
        .ignore_then(just('*').then(required_horizontal_whitespace()).or_not())
        .ignore_then(action(services))
        .then_ignore(horizontal_whitespace());

    line.separated_by(blank_lines())
        .at_least(1)
        .collect::<Vec<_>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MetronomeClips;
    use crate::test_utils::TestServices;
    use std::time::Duration;

    fn parse_action(text: &str) -> Option<Action> {
        let test = TestServices::new();
        action(test.services())
            .then_ignore(end())
            .parse(text)
            .into_result()
            .ok()
    }

    #[test]
    fn test_wait() {
        let action = parse_action("Wait For 45s").unwrap();
        assert!(matches!(&action, Action::Wait(_)));
        assert_eq!(action.duration(), Duration::from_secs(45));
    }

    #[test]
    fn test_say_accepts_either_quote() {
        for text in ["say 'Last set'", "say \"Last set\""] {
            match parse_action(text) {
                Some(Action::Say(say)) => assert_eq!(say.text(), "Last set"),
                other => panic!("unexpected parse of {:?}: {:?}", text, other),
            }
        }
        assert!(parse_action("say Last set").is_none());
        assert!(parse_action("say 'unterminated").is_none());
    }

    #[test]
    fn test_metronome_ticks() {
        let Some(Action::Metronome(metronome)) = parse_action("metronome at 0s*, 1s,2s") else {
            panic!("expected a metronome");
        };
        let ticks: Vec<(MetronomeTickType, Duration)> = metronome
            .ticks()
            .iter()
            .map(|tick| (tick.tick_type, tick.period_before))
            .collect();

        assert_eq!(
            ticks,
            vec![
                (MetronomeTickType::Bell, Duration::ZERO),
                (MetronomeTickType::Click, Duration::from_secs(1)),
                (MetronomeTickType::Click, Duration::from_secs(2)),
            ]
        );
        assert_eq!(metronome.duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_metronome_uses_configured_clips() {
        let test = TestServices::new();
        let services = test.services().with_clips(MetronomeClips {
            click: "tick.wav".to_string(),
            bell: "ding.wav".to_string(),
        });
        let Ok(Action::Metronome(metronome)) = action(services)
            .parse("metronome at 1s*")
            .into_result()
        else {
            panic!("expected a metronome");
        };

        let Action::DoNotAwait(cue) = &metronome.inner().children()[1] else {
            panic!("expected a detached cue");
        };
        assert_eq!(cue.inner().description(), "Play 'ding.wav'");
    }

    #[test]
    fn test_action_list_stops_at_unindented_line() {
        let test = TestServices::new();
        let parser = action_list(test.services()).then_ignore(
            blank_lines().then(just("* after:")).then(any().repeated()),
        );
        let actions = parser
            .parse("    wait for 1s\n\n    * say 'go'  \n* after:\n    wait for 2s")
            .into_result()
            .unwrap();

        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn test_unknown_statement_is_rejected() {
        assert!(parse_action("jump for 5s").is_none());
        assert!(parse_action("wait 5s").is_none());
    }
}
