// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use savehook_core::ReportOutcome;
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Successful runs: sage green
    pub const SUCCESS: u8 = 108;
    /// Failed runs: muted red
    pub const FAILURE: u8 = 167;
    /// Busy and skipped saves: amber
    pub const WARN: u8 = 179;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Format text with the header color.
pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

/// Format text with the context color.
pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Format text in the color for `outcome`.
pub fn outcome(outcome: ReportOutcome, text: &str) -> String {
    let code = match outcome {
        ReportOutcome::Success => codes::SUCCESS,
        ReportOutcome::Busy => codes::WARN,
        ReportOutcome::NonZeroExit
        | ReportOutcome::TimedOut
        | ReportOutcome::LaunchFailed
        | ReportOutcome::ConfigurationError => codes::FAILURE,
    };
    paint(code, text)
}

/// Format text for a save that was filtered out.
pub fn skipped(text: &str) -> String {
    paint(codes::WARN, text)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
