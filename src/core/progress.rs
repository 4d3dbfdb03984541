//! Progress reporting utilities using indicatif.
//!
//! The only long-running step is waiting on the linter during `measure`, so
//! this is a spinner that stays hidden when stderr is not a terminal.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Style templates for progress indicators.
pub mod styles {
    use super::*;

    /// Spinner style for indeterminate operations.
    pub fn spinner() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

/// Check if stderr is a TTY (for deciding whether to show progress).
pub fn is_tty() -> bool {
    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}

/// Create a spinner for indeterminate operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_tty() {
        spinner_with_tick(message)
    } else {
        ProgressBar::hidden()
    }
}

fn spinner_with_tick(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(styles::spinner());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
