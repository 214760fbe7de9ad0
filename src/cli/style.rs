//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark used for completed stages
pub const CHECK: &str = "✓";

/// Cross used for failures
pub const CROSS: &str = "✗";

/// Semantic colors for CLI output, applied only when stdout supports them
pub trait Stylize {
    /// Bold
    fn emphasis(&self) -> String;
    /// Dimmed
    fn muted(&self) -> String;
    /// Cyan
    fn accent(&self) -> String;
    /// Green
    fn success(&self) -> String;
    /// Yellow
    fn warn(&self) -> String;
    /// Red
    fn error(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }

    fn error(&self) -> String {
        self.if_supports_color(Stream::Stderr, |t| t.red())
            .to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Spinner used while waiting on a status check
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"])
}
