//! Run command implementation for playing a program

use crate::cli::Cli;
use crate::console::{format_duration, progress_bar};
use crate::error::{CliError, CliResult, IntoCliResult};
use crate::exit_codes::{EXIT_ERROR, EXIT_WARNING};
use crate::parse::load_programs;
use colored::*;
use indicatif::ProgressBar;
use is_terminal::IsTerminal;
use std::path::Path;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use workout::{parse_duration, ActionError, Config, ExecutionContext};

/// Options for a single playback
#[derive(Debug, Default)]
pub struct RunOptions {
    pub program: Option<String>,
    pub skip_ahead: Option<String>,
    pub no_progress: bool,
}

/// Main entry point for the run command
pub async fn run_run_command(file: &Path, options: RunOptions, config: &Config) -> CliResult<()> {
    let skip_ahead = options
        .skip_ahead
        .as_deref()
        .map(parse_duration)
        .transpose()
        .cli_validation_error()
        .map_err(|e| e.context("Invalid --skip-ahead"))?
        .unwrap_or_default();

    let visible = !options.no_progress && std::io::stderr().is_terminal();
    let bar = progress_bar(Duration::ZERO, visible);
    let programs = load_programs(file, config, bar.clone())?;

    let program = match options.program.as_deref() {
        Some(name) => programs
            .find(name)
            .ok_or_else(|| CliError::new(format!("No program named '{}'", name), EXIT_ERROR))?,
        None => programs
            .programs()
            .first()
            .ok_or_else(|| CliError::new("Document contains no programs", EXIT_ERROR))?,
    };

    if Cli::should_use_color() {
        println!("{} {}", "▶".green(), program.name().bold());
    } else {
        println!("Playing {}", program.name());
    }
    bar.set_length(program.duration().as_millis() as u64);
    bar.set_message(format_duration(program.duration()));

    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    let mut context = ExecutionContext::new()
        .with_cancellation(cancellation)
        .with_skip_ahead(skip_ahead);
    let progress = tokio::spawn(track_progress(context.subscribe_progress(), bar.clone()));

    tracing::info!(
        "Playing '{}' ({}), skipping {}",
        program.name(),
        format_duration(program.duration()),
        format_duration(skip_ahead)
    );
    let result = program.execute(&mut context).await;

    let elapsed = context.progress();
    drop(context);
    let _ = progress.await;
    bar.finish_and_clear();

    match result {
        Ok(()) => {
            println!("Finished {} ({})", program.name(), format_duration(elapsed));
            Ok(())
        }
        Err(ActionError::Cancelled) => Err(CliError::new(
            format!("Playback cancelled after {}", format_duration(elapsed)),
            EXIT_WARNING,
        )),
        Err(error) => Err(CliError::general(error)),
    }
}

/// Cancel `cancellation` on Ctrl+C or SIGTERM
fn spawn_interrupt_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install terminate handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl+C, stopping playback"),
            _ = terminate => tracing::info!("Received terminate signal, stopping playback"),
        }
        cancellation.cancel();
    });
}

/// Mirror context progress onto the bar until the context is dropped
async fn track_progress(mut progress: watch::Receiver<Duration>, bar: ProgressBar) {
    while progress.changed().await.is_ok() {
        let position = *progress.borrow_and_update();
        bar.set_position(position.as_millis() as u64);
    }
}
