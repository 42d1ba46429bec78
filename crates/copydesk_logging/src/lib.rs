#![deny(missing_docs)]
//! Shared logging utilities for the copydesk workspace.
//!
//! This crate provides the `desk_*` logging macros used across the codebase,
//! a helper for logging bounded previews of model output, the terminal/file
//! logger used by the binary, and a minimal test initializer.

mod destination;

pub use destination::{initialize, LogDestination, LOG_FILE};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! desk_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! desk_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! desk_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! desk_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! desk_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
///
/// Model responses can be tens of kilobytes; log lines only carry the head.
pub fn log_preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::log_preview;

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(log_preview("hello", 10), "hello");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        let thai = "การตลาดออนไลน์";
        let preview = log_preview(thai, 3);
        assert_eq!(preview.chars().count(), 3);
        assert!(thai.starts_with(preview));
    }
}
