use std::path::PathBuf;
use std::process;
mod cli;
mod console;
mod error;
mod exit_codes;
mod parse;
mod run;

use clap::CommandFactory;
use cli::{Cli, Commands, OutputFormat};
use error::{handle_cli_result, CliResult, IntoCliResult};
use exit_codes::EXIT_SUCCESS;
use workout::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Fast path for help
    if cli.command.is_none() {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Failed to print help: {}", e);
        }
        process::exit(EXIT_SUCCESS);
    }

    use tracing::Level;

    let log_level = if cli.quiet {
        Level::ERROR
    } else if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level)
        .init();

    if !Cli::should_use_color() {
        colored::control::set_override(false);
    }

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => process::exit(handle_cli_result::<()>(Err(e))),
    };

    let exit_code = match cli.command {
        Some(Commands::Parse { file, format }) => {
            tracing::info!("Parsing {}", file.display());
            run_parse(file, format, &config)
        }
        Some(Commands::Run {
            file,
            program,
            skip_ahead,
            no_progress,
        }) => {
            tracing::info!("Running {}", file.display());
            let options = run::RunOptions {
                program,
                skip_ahead,
                no_progress,
            };
            run_run(file, options, &config).await
        }
        None => {
            // This case is handled early above
            unreachable!()
        }
    };

    process::exit(exit_code);
}

/// Explicit file if given, otherwise defaults, environment and discovered YAML
fn load_config(path: Option<&PathBuf>) -> CliResult<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .cli_validation_error()
            .map_err(|e| e.context(path.display()))?,
        None => Config::new(),
    };
    config.validate().cli_validation_error()?;
    Ok(config)
}

fn run_parse(file: PathBuf, format: OutputFormat, config: &Config) -> i32 {
    handle_cli_result(parse::run_parse_command(&file, format, config))
}

async fn run_run(file: PathBuf, options: run::RunOptions, config: &Config) -> i32 {
    handle_cli_result(run::run_run_command(&file, options, config).await)
}
