//! Progress indicators shared by the commands that load tracks.
//!
//! Loading happens before the player takes over the terminal, so these are
//! the status shown while tracks are fetched and decoded; they are cleared
//! once loading completes.

use crate::constants::SPINNER_CHARS;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a standard progress spinner with consistent styling.
///
/// # Example
///
/// ```ignore
/// use wavebars::utils::progress::create_progress_spinner;
///
/// let spinner = create_progress_spinner();
/// spinner.set_message("Decoding track...");
/// // ... do work ...
/// spinner.finish_and_clear();
/// ```
pub fn create_progress_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is valid")
            .tick_strings(SPINNER_CHARS),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Create the progress bar shown while a catalog of `total` tracks loads.
pub fn create_load_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} Loading [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress template is valid")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_spinner() {
        let spinner = create_progress_spinner();
        spinner.set_message("Test message");
        spinner.finish_and_clear();
    }

    #[test]
    fn test_create_load_progress() {
        let pb = create_load_progress(3);
        assert_eq!(pb.length(), Some(3));
        pb.inc(1);
        assert_eq!(pb.position(), 1);
        pb.finish_and_clear();
    }
}
