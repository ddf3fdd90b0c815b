//! Exercise blocks and their event matchers

use super::actions::action_list;
use super::constraint::constraint;
use super::lexical::{
    blank_lines, heading, horizontal_whitespace, keyword, line_break, plural_keyword,
    positive_number, required_horizontal_whitespace,
};
use super::Extra;
use crate::events::{EventKind, EventMatcher};
use crate::exercise::{Exercise, MatcherWithAction};
use crate::services::Services;
use chumsky::prelude::*;
use chumsky::Boxed;

/// `before set`, `during reps` and the like
fn scoped_event<'src>(
    preposition: &'static str,
    noun: &'static str,
) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    keyword(preposition)
        .then(required_horizontal_whitespace())
        .then(plural_keyword(noun))
        .ignored()
}

fn matcher_header<'src, N>(name: N) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone
where
    N: Parser<'src, &'src str, (), Extra<'src>> + Clone,
{
    just('*')
        .then(horizontal_whitespace())
        .ignore_then(name)
}

fn matcher_colon<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just(':')
        .padded_by(horizontal_whitespace())
        .then(line_break())
        .ignored()
}

fn typed_matcher<'src, N>(
    name: N,
    kind: EventKind,
    services: Services,
) -> impl Parser<'src, &'src str, MatcherWithAction, Extra<'src>> + Clone
where
    N: Parser<'src, &'src str, (), Extra<'src>> + Clone,
{
    matcher_header(name)
        .then(matcher_colon())
        .ignore_then(action_list(services))
        .map(move |actions| MatcherWithAction::new(EventMatcher::Typed(kind), actions))
}

fn numbered_matcher<'src, N>(
    name: N,
    kind: EventKind,
    services: Services,
) -> impl Parser<'src, &'src str, MatcherWithAction, Extra<'src>> + Clone
where
    N: Parser<'src, &'src str, (), Extra<'src>> + Clone,
{
    matcher_header(name)
        .then(required_horizontal_whitespace())
        .ignore_then(constraint())
        .then_ignore(matcher_colon())
        .then(action_list(services))
        .map(move |(constraint, actions)| {
            MatcherWithAction::new(EventMatcher::Numbered { kind, constraint }, actions)
        })
}

/// Any of the twelve matcher forms
///
/// Typed forms are tried first, in the order the events fire, followed by
/// the numbered forms.
pub(crate) fn matcher_with_action<'src>(
    services: Services,
) -> Boxed<'src, 'src, &'src str, MatcherWithAction, Extra<'src>> {
    choice((
        typed_matcher(keyword("before"), EventKind::BeforeExercise, services.clone()),
        typed_matcher(keyword("after"), EventKind::AfterExercise, services.clone()),
        typed_matcher(scoped_event("before", "set"), EventKind::BeforeSet, services.clone()),
        typed_matcher(scoped_event("after", "set"), EventKind::AfterSet, services.clone()),
        typed_matcher(
            scoped_event("before", "rep"),
            EventKind::BeforeRepetition,
            services.clone(),
        ),
        typed_matcher(
            scoped_event("during", "rep"),
            EventKind::DuringRepetition,
            services.clone(),
        ),
        typed_matcher(
            scoped_event("after", "rep"),
            EventKind::AfterRepetition,
            services.clone(),
        ),
        numbered_matcher(scoped_event("before", "set"), EventKind::BeforeSet, services.clone()),
        numbered_matcher(scoped_event("after", "set"), EventKind::AfterSet, services.clone()),
        numbered_matcher(
            scoped_event("before", "rep"),
            EventKind::BeforeRepetition,
            services.clone(),
        ),
        numbered_matcher(
            scoped_event("during", "rep"),
            EventKind::DuringRepetition,
            services.clone(),
        ),
        numbered_matcher(scoped_event("after", "rep"), EventKind::AfterRepetition, services),
    ))
    .boxed()
}

/// `*<sets> sets x <reps> reps`
fn counts<'src>() -> impl Parser<'src, &'src str, (u32, u32), Extra<'src>> + Clone {
    just('*')
        .ignore_then(horizontal_whitespace())
        .ignore_then(positive_number())
        .then_ignore(horizontal_whitespace())
        .then_ignore(plural_keyword("set"))
        .then_ignore(horizontal_whitespace())
        .then_ignore(keyword("x"))
        .then_ignore(horizontal_whitespace())
        .then(positive_number())
        .then_ignore(horizontal_whitespace())
        .then_ignore(plural_keyword("rep"))
        .then_ignore(horizontal_whitespace())
}

/// `## Name`, the counts line and any matchers
pub(crate) fn exercise<'src>(
    services: Services,
) -> Boxed<'src, 'src, &'src str, Exercise, Extra<'src>> {
    let matchers = matcher_with_action(services.clone())
        .separated_by(blank_lines())
        .at_least(1)
        .collect::<Vec<_>>();

    heading(2)
        .then_ignore(blank_lines())
        .then(counts())
        .then(blank_lines().ignore_then(matchers).or_not())
        .try_map(move |((name, (set_count, repetition_count)), matchers), span| {
            Exercise::new(
                &services,
                name,
                set_count,
                repetition_count,
                matchers.unwrap_or_default(),
            )
            .map_err(|e| Rich::custom(span, e.to_string()))
        })
        .boxed()
}
