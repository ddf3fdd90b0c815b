//! Terminal collaborators
//!
//! Speech and audio cues are printed instead of played, routed through the
//! progress bar so the two never garble each other.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use workout::services::{
    AudioService, ServiceResult, Services, SpeechService, TokioDelayService, TracingLogger,
};
use workout::Config;

/// Prints cues to stdout above the progress bar
#[derive(Clone)]
pub struct Console {
    progress: ProgressBar,
}

impl Console {
    pub fn new(progress: ProgressBar) -> Self {
        Self { progress }
    }

    fn line(&self, line: String) {
        self.progress.suspend(|| println!("{}", line));
    }
}

#[async_trait::async_trait]
impl SpeechService for Console {
    async fn say(&self, text: &str) -> ServiceResult<()> {
        self.line(format!("{} {}", "🗣".bold(), text.bold()));
        Ok(())
    }
}

#[async_trait::async_trait]
impl AudioService for Console {
    async fn play(&self, clip: &str) -> ServiceResult<()> {
        self.line(format!("{} {}", "♪".cyan(), clip.dimmed()));
        Ok(())
    }
}

/// Collaborators for a terminal run, shaped by `config`
pub fn services(config: &Config, progress: ProgressBar) -> Services {
    let console = Arc::new(Console::new(progress));
    Services::new(
        console.clone(),
        Arc::new(TokioDelayService),
        Arc::new(TracingLogger),
        console,
    )
    .with_config(config)
}

/// Bar measuring playback in milliseconds, hidden when `visible` is false
pub fn progress_bar(total: Duration, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total.as_millis() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// Render a duration the way the grammar writes it, e.g. `1m30s`
pub fn format_duration(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    if total_millis == 0 {
        return "0s".to_string();
    }

    let hours = total_millis / 3_600_000;
    let minutes = total_millis / 60_000 % 60;
    let seconds = total_millis / 1_000 % 60;
    let millis = total_millis % 1_000;

    let mut out = String::new();
    for (value, unit) in [(hours, "h"), (minutes, "m"), (seconds, "s"), (millis, "ms")] {
        if value > 0 {
            out.push_str(&format!("{}{}", value, unit));
        }
    }
    out
}
