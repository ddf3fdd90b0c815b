//! Parse command implementation

use crate::cli::OutputFormat;
use crate::console::{self, format_duration};
use crate::error::{CliResult, IntoCliResult};
use colored::*;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::Path;
use workout::{Config, Exercise, ExerciseProgram, ExercisePrograms};

#[derive(Debug, Serialize)]
struct DocumentSummary {
    programs: Vec<ProgramSummary>,
}

#[derive(Debug, Serialize)]
struct ProgramSummary {
    name: String,
    duration: String,
    duration_ms: u64,
    exercises: Vec<ExerciseSummary>,
}

#[derive(Debug, Serialize)]
struct ExerciseSummary {
    name: String,
    sets: u32,
    repetitions: u32,
    duration: String,
    duration_ms: u64,
    matchers: Vec<String>,
}

impl From<&Exercise> for ExerciseSummary {
    fn from(exercise: &Exercise) -> Self {
        Self {
            name: exercise.name().to_string(),
            sets: exercise.set_count(),
            repetitions: exercise.repetition_count(),
            duration: format_duration(exercise.duration()),
            duration_ms: exercise.duration().as_millis() as u64,
            matchers: exercise
                .matchers_with_actions()
                .iter()
                .map(|m| m.matcher().to_string())
                .collect(),
        }
    }
}

impl From<&ExerciseProgram> for ProgramSummary {
    fn from(program: &ExerciseProgram) -> Self {
        Self {
            name: program.name().to_string(),
            duration: format_duration(program.duration()),
            duration_ms: program.duration().as_millis() as u64,
            exercises: program.exercises().iter().map(ExerciseSummary::from).collect(),
        }
    }
}

/// Read and parse a document, reporting positions against the file name
pub fn load_programs(
    file: &Path,
    config: &Config,
    progress: ProgressBar,
) -> CliResult<ExercisePrograms> {
    let document = std::fs::read_to_string(file)
        .cli_validation_error()
        .map_err(|e| e.context(format!("Failed to read '{}'", file.display())))?;

    let services = console::services(config, progress);
    ExercisePrograms::try_parse(&document, &services)
        .cli_validation_error()
        .map_err(|e| e.context(file.display()))
}

/// Main entry point for the parse command
pub fn run_parse_command(file: &Path, format: OutputFormat, config: &Config) -> CliResult<()> {
    let programs = load_programs(file, config, ProgressBar::hidden())?;
    let summary = DocumentSummary {
        programs: programs.programs().iter().map(ProgramSummary::from).collect(),
    };
    tracing::debug!("Parsed {} programs from {}", summary.programs.len(), file.display());

    match format {
        OutputFormat::Text => print_text(&summary),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary).cli_general_error()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&summary).cli_general_error()?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

fn print_text(summary: &DocumentSummary) {
    if summary.programs.is_empty() {
        println!("{}", "No programs found".yellow());
        return;
    }

    for program in &summary.programs {
        println!("{} ({})", program.name.bold(), program.duration);
        for exercise in &program.exercises {
            println!(
                "  {}: {} x {} ({})",
                exercise.name.bold(),
                plural(exercise.sets, "set"),
                plural(exercise.repetitions, "rep"),
                exercise.duration
            );
            for matcher in &exercise.matchers {
                println!("    {}", matcher.dimmed());
            }
        }
    }
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::EXIT_ERROR;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn document(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_summary_from_program() {
        let file = document(
            "# Legs\n\n## Lunges\n\n*2 sets x 3 reps\n\n* during rep:\n    wait for 2s\n",
        );
        let programs =
            load_programs(file.path(), &Config::default(), ProgressBar::hidden()).unwrap();

        let summary = ProgramSummary::from(&programs.programs()[0]);

        assert_eq!(summary.name, "Legs");
        assert_eq!(summary.duration, "12s");
        assert_eq!(summary.duration_ms, 12_000);
        assert_eq!(summary.exercises[0].sets, 2);
        assert_eq!(summary.exercises[0].matchers, vec!["during rep".to_string()]);
    }

    #[test]
    fn test_parse_error_is_a_validation_error() {
        let file = document("# Legs\n\n## Lunges\n\n*0 sets x 3 reps\n");

        let error = load_programs(file.path(), &Config::default(), ProgressBar::hidden())
            .unwrap_err();

        assert_eq!(error.exit_code, EXIT_ERROR);
        assert!(error.message.contains("line 5"), "{}", error.message);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let error = load_programs(
            Path::new("/nonexistent/monday.md"),
            &Config::default(),
            ProgressBar::hidden(),
        )
        .unwrap_err();

        assert_eq!(error.exit_code, EXIT_ERROR);
        assert!(error.message.starts_with("Failed to read"));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "set"), "1 set");
        assert_eq!(plural(3, "rep"), "3 reps");
    }
}
