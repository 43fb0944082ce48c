//! Progress indicators for the permsync CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a batch of Drive requests is in flight
///
/// Hidden when `quiet` is set so scripted runs only see report lines.
pub fn spinner(msg: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
