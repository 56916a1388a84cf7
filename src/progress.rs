//! Progress indicators for rollcall CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while talking to Slack. Hidden in quiet mode.
pub fn spinner(quiet: bool, message: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Remove the spinner line.
pub fn finish_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
