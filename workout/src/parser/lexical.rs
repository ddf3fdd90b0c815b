//! Tokens shared across the grammar

use super::Extra;
use chumsky::prelude::*;
use std::time::Duration;

/// Zero or more spaces or tabs
pub(crate) fn horizontal_whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone
{
    one_of(" \t").repeated()
}

/// One or more spaces or tabs
pub(crate) fn required_horizontal_whitespace<'src>(
) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t").repeated().at_least(1)
}

/// Trailing horizontal whitespace and a line break
///
/// Never consumes the indentation of the following line.
pub(crate) fn line_break<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    horizontal_whitespace().then(text::newline()).ignored()
}

/// One or more line breaks, so blank lines are allowed
pub(crate) fn blank_lines<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    line_break().repeated().at_least(1)
}

fn word<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic())
        .repeated()
        .at_least(1)
        .to_slice()
}

/// A whole word equal to `expected`, ignoring ASCII case
pub(crate) fn keyword<'src>(
    expected: &'static str,
) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    word().try_map(move |found: &str, span| {
        if found.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(Rich::custom(
                span,
                format!("expected '{}', found '{}'", expected, found),
            ))
        }
    })
}

/// A whole word equal to `singular` or its plural with a trailing `s`
pub(crate) fn plural_keyword<'src>(
    singular: &'static str,
) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    word().try_map(move |found: &str, span| {
        let stem = found
            .strip_suffix('s')
            .or_else(|| found.strip_suffix('S'))
            .unwrap_or(found);
        if found.eq_ignore_ascii_case(singular) || stem.eq_ignore_ascii_case(singular) {
            Ok(())
        } else {
            Err(Rich::custom(
                span,
                format!("expected '{}' or '{}s', found '{}'", singular, singular, found),
            ))
        }
    })
}

/// A decimal integer
pub(crate) fn number<'src>() -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    text::int(10).try_map(|digits: &str, span| {
        digits
            .parse::<u32>()
            .map_err(|e| Rich::custom(span, format!("invalid number '{}': {}", digits, e)))
    })
}

/// A decimal integer greater than zero
pub(crate) fn positive_number<'src>() -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    number().try_map(|value, span| {
        if value == 0 {
            Err(Rich::custom(span, "count must be greater than zero"))
        } else {
            Ok(value)
        }
    })
}

/// `# Name`, `## Name` and so on, yielding the trimmed name
pub(crate) fn heading<'src>(
    level: usize,
) -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    just('#')
        .repeated()
        .exactly(level)
        .ignore_then(required_horizontal_whitespace())
        .ignore_then(none_of("\r\n").repeated().at_least(1).to_slice())
        .try_map(|name: &str, span| {
            let name = name.trim();
            if name.is_empty() {
                Err(Rich::custom(span, "heading must have a name"))
            } else {
                Ok(name.to_string())
            }
        })
}

fn unit_millis(unit: &str) -> Option<u64> {
    let millis = match unit.to_ascii_lowercase().as_str() {
        "ms" | "millis" | "millisecond" | "milliseconds" => 1,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000,
        _ => return None,
    };
    Some(millis)
}

/// A duration made of one or more `<number><unit>` components, e.g. `1m 30s`
pub(crate) fn duration<'src>() -> impl Parser<'src, &'src str, Duration, Extra<'src>> + Clone {
    let component = number()
        .then_ignore(horizontal_whitespace())
        .then(word())
        .try_map(|(value, unit): (u32, &str), span| match unit_millis(unit) {
            Some(millis) => Ok(Duration::from_millis(u64::from(value) * millis)),
            None => Err(Rich::custom(
                span,
                format!("unknown duration unit '{}'", unit),
            )),
        });

    component
        .clone()
        .then(
            horizontal_whitespace()
                .ignore_then(component)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .try_map(|(first, rest): (Duration, Vec<Duration>), span| {
            rest.into_iter()
                .try_fold(first, |total, part| total.checked_add(part))
                .ok_or_else(|| Rich::custom(span, "duration is too long"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts<'src, O>(
        parser: impl Parser<'src, &'src str, O, Extra<'src>>,
        input: &'src str,
    ) -> Option<O> {
        parser.then_ignore(end()).parse(input).into_result().ok()
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert!(accepts(keyword("before"), "BeFoRe").is_some());
        assert!(accepts(keyword("before"), "beforehand").is_none());
        assert!(accepts(plural_keyword("set"), "Sets").is_some());
        assert!(accepts(plural_keyword("set"), "set").is_some());
        assert!(accepts(plural_keyword("set"), "setss").is_none());
    }

    #[test]
    fn test_heading_level_must_match() {
        assert_eq!(accepts(heading(2), "## Push ups  "), Some("Push ups".to_string()));
        assert!(accepts(heading(2), "### Push ups").is_none());
        assert!(accepts(heading(1), "#Push ups").is_none());
        assert!(accepts(heading(1), "#   ").is_none());
    }

    #[test]
    fn test_positive_number_rejects_zero() {
        assert_eq!(accepts(positive_number(), "12"), Some(12));
        assert!(accepts(positive_number(), "0").is_none());
    }

    #[test]
    fn test_blank_lines_keep_next_indentation() {
        let parser = blank_lines().ignore_then(required_horizontal_whitespace());
        assert!(accepts(parser, "  \n\n    ").is_some());
    }
}
