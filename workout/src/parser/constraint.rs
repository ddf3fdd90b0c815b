//! Numerical constraints: `first`, `last`, offsets, ranges and lists

use super::lexical::{horizontal_whitespace, keyword, number};
use super::Extra;
use crate::constraint::{Bound, ConstraintTerm, NumericalConstraint};
use chumsky::prelude::*;

fn offset<'src>() -> impl Parser<'src, &'src str, i64, Extra<'src>> + Clone {
    one_of("+-")
        .then(number())
        .map(|(sign, value)| {
            if sign == '-' {
                -i64::from(value)
            } else {
                i64::from(value)
            }
        })
        .or_not()
        .map(Option::unwrap_or_default)
}

fn bound<'src>() -> impl Parser<'src, &'src str, Bound, Extra<'src>> + Clone {
    choice((
        number().map(Bound::Number),
        keyword("first").ignore_then(offset()).map(Bound::First),
        keyword("last").ignore_then(offset()).map(Bound::Last),
    ))
}

fn term<'src>() -> impl Parser<'src, &'src str, ConstraintTerm, Extra<'src>> + Clone {
    bound()
        .then(just("..").ignore_then(bound()).or_not())
        .map(|(from, to)| match to {
            Some(to) => ConstraintTerm::Range(from, to),
            None => ConstraintTerm::Single(from),
        })
}

/// `term (, term)*` where a term is a bound or an inclusive `bound..bound`
pub(crate) fn constraint<'src>(
) -> impl Parser<'src, &'src str, NumericalConstraint, Extra<'src>> + Clone {
    term()
        .separated_by(just(',').padded_by(horizontal_whitespace()))
        .at_least(1)
        .collect::<Vec<_>>()
        .map(NumericalConstraint::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(text: &str) -> Vec<ConstraintTerm> {
        constraint()
            .then_ignore(end())
            .parse(text)
            .into_result()
            .unwrap()
            .terms()
            .to_vec()
    }

    #[test]
    fn test_bounds_with_offsets() {
        assert_eq!(
            terms("first+1..last-2"),
            vec![ConstraintTerm::Range(Bound::First(1), Bound::Last(-2))]
        );
        assert_eq!(
            terms("last"),
            vec![ConstraintTerm::Single(Bound::Last(0))]
        );
    }

    #[test]
    fn test_list_keeps_order() {
        assert_eq!(
            terms("4 ,1..2"),
            vec![
                ConstraintTerm::Single(Bound::Number(4)),
                ConstraintTerm::Range(Bound::Number(1), Bound::Number(2)),
            ]
        );
    }
}
