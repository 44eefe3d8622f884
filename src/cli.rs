use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Prints a colorful banner at the start of the CLI.
pub fn print_banner() {
    eprintln!(
        "{} {}",
        "repo-scribe".bold().green(),
        env!("CARGO_PKG_VERSION").blue()
    );
}

/// Helper to print an info message.
pub fn print_info(message: &str) {
    eprintln!("{}", message.green());
}

/// Helper to print a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

/// Helper to print an error message.
pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

/// Spinner shown while the background transcription runs
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
