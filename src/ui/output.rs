use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

/// Width of a full (100%) distribution bar, in cells
pub const BAR_WIDTH: usize = 30;

pub fn header(text: &str) {
    println!("{} {}", Icons::STATS, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(theme().dim.clone()), value);
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Horizontal bar for a percentage in `[0, 100]`, padded to `BAR_WIDTH`
pub fn bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    let solid = "█".repeat(filled);
    let empty = "░".repeat(BAR_WIDTH - filled);
    format!("{}{}", solid.style(theme().bar.clone()), empty.style(theme().dim.clone()))
}
