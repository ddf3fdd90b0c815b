use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::io;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(name = "workout")]
#[command(version)]
#[command(about = "Parse and play workout programs written in Markdown")]
#[command(long_about = "
workout compiles Markdown-like workout documents into timed action trees and
plays them back with spoken cues, metronome clicks and rests.

Example usage:
  workout parse monday.md                 # Show programs, exercises and durations
  workout run monday.md --program Legs    # Play one program
  workout run monday.md --skip-ahead 5m   # Resume five minutes in
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file to use instead of the discovered workout.yaml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a workout document and print its structure
    #[command(long_about = "
Parses a workout document and prints every program with its exercises,
set and repetition counts, event matchers and computed durations.

Parse errors are reported with their line and column and exit with code 2.

Examples:
  workout parse monday.md
  workout parse monday.md --format json
")]
    Parse {
        /// Workout document to parse
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Play a program from a workout document
    #[command(long_about = "
Plays one program from a workout document. Speech and audio cues are printed
to the console while rests and metronome periods are timed in real time.

Press Ctrl+C to stop; a cancelled run exits with code 1.

Examples:
  workout run monday.md                      # First program in the document
  workout run monday.md --program \"Full body\"
  workout run monday.md --skip-ahead 1m30s   # Resume 90 seconds in
")]
    Run {
        /// Workout document to play
        file: PathBuf,

        /// Name of the program to play (case-insensitive); defaults to the first
        #[arg(short, long)]
        program: Option<String>,

        /// Start this far into the program, e.g. 90s or 1m30s
        #[arg(long, value_name = "DURATION")]
        skip_ahead: Option<String>,

        /// Do not render a progress bar
        #[arg(long)]
        no_progress: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    #[allow(dead_code)]
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(args)
    }

    pub fn is_tty() -> bool {
        io::stdout().is_terminal()
    }

    pub fn should_use_color() -> bool {
        Self::is_tty() && std::env::var("NO_COLOR").is_err()
    }
}
