//! Program headings and the document of programs

use super::exercise::exercise;
use super::lexical::{blank_lines, heading};
use super::Extra;
use crate::program::{ExerciseProgram, ExercisePrograms};
use crate::services::Services;
use chumsky::prelude::*;

/// `# Name` followed by its exercises
pub(crate) fn program<'src>(
    services: Services,
) -> impl Parser<'src, &'src str, ExerciseProgram, Extra<'src>> + Clone {
    heading(1)
        .then(
            blank_lines()
                .ignore_then(exercise(services))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(name, exercises)| ExerciseProgram::new(name, exercises))
}

/// The whole document; surrounding whitespace is ignored
pub(crate) fn programs<'src>(
    services: Services,
) -> impl Parser<'src, &'src str, ExercisePrograms, Extra<'src>> + Clone {
    program(services)
        .separated_by(blank_lines())
        .collect::<Vec<_>>()
        .padded_by(text::whitespace())
        .then_ignore(end())
        .map(ExercisePrograms::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestServices;

    #[test]
    fn test_program_without_exercises() {
        let test = TestServices::new();
        let programs = programs(test.services())
            .parse("\n\n# Rest day\n\n")
            .into_result()
            .unwrap();

        assert_eq!(programs.len(), 1);
        assert_eq!(programs.programs()[0].name(), "Rest day");
        assert!(programs.programs()[0].exercises().is_empty());
    }

    #[test]
    fn test_exercise_heading_needs_a_program() {
        let test = TestServices::new();
        let result = programs(test.services())
            .parse("## Orphan\n\n*1 set x 1 rep\n")
            .into_result();

        assert!(result.is_err());
    }
}
