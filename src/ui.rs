//! Terminal output: spinner while watching a job, colored results.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::job::{JobRecord, JobState};

/// Spinner shown while a job is being watched.
///
/// Finished jobs print in green, failures in red, state changes in yellow.
pub struct WatchProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl WatchProgress {
    pub fn start(id: &str, state: JobState) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{id}: {state}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    pub fn update_state(&self, id: &str, from: JobState, to: JobState) {
        self.pb.println(format!(
            "  {} {from} → {to}",
            self.yellow.apply_to("↻")
        ));
        self.pb.set_message(format!("{id}: {to}"));
    }

    /// Clears the spinner and prints how the job ended.
    pub fn complete(&self, state: JobState, error_message: Option<&str>) {
        self.pb.finish_and_clear();
        match state {
            JobState::Finished => {
                println!("  {} Render finished", self.green.apply_to("✓"));
            }
            JobState::Failure => {
                println!(
                    "  {} Render failed: {}",
                    self.red.apply_to("✗"),
                    error_message.unwrap_or("no error message")
                );
            }
            other => println!("  Stopped watching in state {other}"),
        }
    }
}

pub fn print_record(record: &JobRecord) {
    let header = Style::new().cyan().bold();
    println!("{}", header.apply_to("─── Render Job ───"));
    println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
}
