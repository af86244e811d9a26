// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for help and report output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use pk_core::Status;

use crate::env;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers: pastel cyan/steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Default values/context: medium grey
    pub const CONTEXT: u8 = 245;

    pub const GOOD: u8 = 114;
    pub const WARNING: u8 = 179;
    pub const CRITICAL: u8 = 208;
    pub const EMERGENCY: u8 = 196;

    pub const RESET: &str = "\x1b[0m";
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

fn paint(code: u8, text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    format!("{}{}{}", fg256(code), text, codes::RESET)
}

/// Apply header color (section titles) to text.
pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

/// Apply literal color (commands, options) to text.
pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

/// Apply context color (default values, hints) to text.
pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Terminal color code for a validation status.
pub fn status_code(status: Status) -> u8 {
    match status {
        Status::Good => codes::GOOD,
        Status::Warning => codes::WARNING,
        Status::Critical => codes::CRITICAL,
        Status::Emergency => codes::EMERGENCY,
    }
}

/// Color `text` by the severity of `status`.
pub fn status(status: Status, text: &str) -> String {
    paint(status_code(status), text)
}

/// Colorize an examples help block.
///
/// Lines ending in `:` are headers. Example lines split at the first run of
/// two or more spaces into a literal command and a plain description.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            if trimmed.ends_with(':') && !trimmed.contains("  ") {
                return format!("{}{}", indent, header(trimmed));
            }
            match find_description_start(trimmed) {
                Some(end) => format!(
                    "{}{}{}",
                    indent,
                    literal(&trimmed[..end]),
                    &trimmed[end..]
                ),
                None => line.to_string(),
            }
        })
        .collect();
    lines.join("\n")
}

/// Byte offset where the description starts: the first run of 2+ spaces
/// that is followed by more text.
pub fn find_description_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut run_start = None;
    for (i, &b) in bytes.iter().enumerate() {
        match (b == b' ', run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) if i - start >= 2 => return Some(start),
            (false, Some(_)) => run_start = None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
