//! Terminal helpers shared across install commands.

use std::path::PathBuf;

use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use ohsdk::manager::{ArchivePicker, InstallResult, ProgressSink, ProgressUpdate, PROGRESS_MAX};

/// Progress bar driven by pipeline increments.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(u64::from(PROGRESS_MAX));
        let style = ProgressStyle::default_bar()
            .template("[{bar:50.cyan/blue}] {pos:>3}%  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        Self { bar }
    }

    /// Clear the bar so the summary prints on a clean line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn report(&self, update: &ProgressUpdate) {
        self.bar.set_message(update.message.clone());
        self.bar.inc(u64::from(update.increment));
    }
}

/// Asks on the terminal for a command-line tools archive downloaded by hand.
pub struct PromptArchivePicker;

impl ArchivePicker for PromptArchivePicker {
    fn pick_archive(&self, component: &str) -> Option<PathBuf> {
        println!(
            "{} No download URL is configured for the {} on this platform.",
            style("!").yellow().bold(),
            component
        );
        println!("  Download the archive from the OpenHarmony developer site first.");

        let proceed = Confirm::new()
            .with_prompt("Install from an archive you already downloaded?")
            .default(true)
            .interact()
            .ok()?;
        if !proceed {
            return None;
        }

        let path: String = Input::new()
            .with_prompt("Path to the .zip archive")
            .validate_with(|input: &String| -> Result<(), &str> {
                if PathBuf::from(input.trim()).is_file() {
                    Ok(())
                } else {
                    Err("no such file")
                }
            })
            .interact_text()
            .ok()?;

        Some(PathBuf::from(path.trim()))
    }
}

/// Print the outcome of an install.
pub fn print_install_result(result: &InstallResult) {
    println!(
        "{} Installed {} to {}",
        style("✓").green().bold(),
        result.kind,
        result.install_path.display()
    );
    if result.bytes_downloaded > 0 {
        println!("  Downloaded: {}", format_bytes(result.bytes_downloaded));
    }
    println!("  Files:      {}", result.files_extracted);
}

/// Print a successful removal.
pub fn print_removed(what: &str) {
    println!("{} Removed {}", style("✓").green().bold(), what);
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
