//! Astral-style CLI output formatting.
//!
//! Human output goes to stdout with colored symbols; `--json` switches every
//! helper to one JSON object per line (`{"type": ..., "payload": ...}`).
//! Diagnostics from `tracing` go to stderr and never mix with this output.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream, Style};
use serde_json::json;

use super::command::ColorChoice;
use crate::application::{DiagnosticLine, Report};
use crate::domain::DeviceIndex;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

fn regular_output_suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!(
        "{}",
        json!({
            "type": kind,
            "payload": payload,
        })
    );
}

/// Style `text` when the target stream supports color.
fn paint(text: impl Display, style: Style, stream: Stream) -> String {
    text.if_supports_color(stream, |t| t.style(style)).to_string()
}

fn out(text: impl Display, style: Style) -> String {
    paint(text, style, Stream::Stdout)
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig, color: ColorChoice) {
    write_config(config);
    match color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();

    if config.json {
        emit_json_line(
            "field",
            json!({
                "label": label,
                "value": value,
            }),
        );
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {:<12} {}", out(label, Style::new().dimmed()), value);
}

pub fn success(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {} {}", out("✓", Style::new().green()), message);
}

/// Print an error line to stderr. Never suppressed.
pub fn error(message: &str) {
    let config = read_config();

    if config.json {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }

    eprintln!(
        "  {} {}",
        paint("×", Style::new().red(), Stream::Stderr),
        message
    );
}

pub fn section(title: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!();
    println!("{}", out(title, Style::new().bold()));
}

/// Print a note/hint.
pub fn note(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {}", out(message, Style::new().dimmed()));
}

/// Print one per-device diagnostic line.
///
/// Failures are printed even in quiet mode; the operator must be able to
/// tell which device failed.
pub fn result_line(line: &DiagnosticLine) {
    let config = read_config();

    if config.json {
        emit_json_line("result", json!(line));
        return;
    }
    if line.success && regular_output_suppressed(config) {
        return;
    }

    let Some(index) = &line.index else {
        error(&line.detail);
        return;
    };
    let namespace = line
        .namespace
        .as_ref()
        .map(|ns| format!(" {}", out(format!("({ns})"), Style::new().dimmed())))
        .unwrap_or_default();

    if line.success {
        println!(
            "  {} device {}{}",
            out("✓", Style::new().green()),
            out(index, Style::new().cyan()),
            namespace
        );
    } else {
        println!(
            "  {} device {}{}: {}",
            out("×", Style::new().red()),
            out(index, Style::new().cyan()),
            namespace,
            line.detail
        );
    }
}

/// Print the overall status of a report.
pub fn summary(action: &str, report: &Report) {
    let config = read_config();

    if config.json {
        emit_json_line(
            "summary",
            json!({
                "action": action,
                "status": report.status,
                "failed": report.failed_indices(),
            }),
        );
        return;
    }

    if report.is_success() {
        if regular_output_suppressed(config) {
            return;
        }
        println!();
        println!(
            "  {} {action} succeeded on {} device(s)",
            out("✓", Style::new().green().bold()),
            report.lines.len()
        );
    } else {
        let failed: Vec<String> = report
            .failed_indices()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!();
        if failed.is_empty() {
            println!("  {} {action} failed", out("×", Style::new().red().bold()));
        } else {
            println!(
                "  {} {action} failed on device(s) {}",
                out("×", Style::new().red().bold()),
                failed.join(",")
            );
        }
    }
}

/// Print one line from a tailed log stream.
pub fn log_line(index: &DeviceIndex, line: &str) {
    let config = read_config();

    if config.json {
        emit_json_line(
            "log",
            json!({
                "index": index,
                "line": line,
            }),
        );
        return;
    }

    println!("{} {}", out(format!("[{index}]"), Style::new().cyan()), line);
}

const BRAILLE_SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Create and start a progress spinner with braille animation.
///
/// Returns a hidden progress bar in JSON or quiet mode.
pub fn spinner(message: &str) -> indicatif::ProgressBar {
    let config = read_config();
    if config.json || config.quiet {
        let pb = indicatif::ProgressBar::hidden();
        pb.set_message(message.to_string());
        return pb;
    }

    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .tick_strings(BRAILLE_SPINNER)
        .template("  {spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Finish a spinner with a success checkmark.
pub fn spinner_success(pb: &indicatif::ProgressBar, message: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("spinner_success", json!({ "message": message }));
        pb.finish_and_clear();
        return;
    }
    if config.quiet {
        pb.finish_and_clear();
        return;
    }

    pb.finish_with_message(format!("{} {}", out("✓", Style::new().green()), message));
}

/// Finish a spinner with a failure mark.
pub fn spinner_fail(pb: &indicatif::ProgressBar, message: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("spinner_fail", json!({ "message": message }));
        pb.finish_and_clear();
        return;
    }

    pb.finish_with_message(format!("{} {}", out("×", Style::new().red()), message));
}

/// Clear a spinner without leaving a line behind.
pub fn spinner_clear(pb: &indicatif::ProgressBar) {
    pb.finish_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_suppresses_only_human_output() {
        assert!(!regular_output_suppressed(OutputConfig::new(false, false)));
        assert!(regular_output_suppressed(OutputConfig::new(false, true)));
        assert!(!regular_output_suppressed(OutputConfig::new(true, true)));
    }
}
