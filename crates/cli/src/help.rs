// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code: u8| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    let header = fg(colors::codes::HEADER);
    let context = fg(colors::codes::CONTEXT);

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(fg(colors::codes::LITERAL))
        .placeholder(context)
        .valid(context)
        .invalid(fg(colors::codes::EMERGENCY))
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    format!(
        "\
{header_chem}
  {check}       Validate a single reading
  {report}      Compliance report for a full test
  {closure}     Decide whether the pool must close
  {ranges}      Show acceptable and ideal ranges
  {record}      Record a chemical test (delivered or queued)

{header_queue}
  {queue}       Inspect and manage the offline queue
  {sync}        Deliver queued writes to the remote

{header_setup}
  {init}        Initialize poolkeep in this directory
  {completion}  Generate shell completions
",
        header_chem = colors::header("Water Chemistry:"),
        header_queue = colors::header("Offline Queue:"),
        header_setup = colors::header("Setup:"),
        check = colors::literal("check"),
        report = colors::literal("report"),
        closure = colors::literal("closure"),
        ranges = colors::literal("ranges"),
        record = colors::literal("record"),
        queue = colors::literal("queue"),
        sync = colors::literal("sync"),
        init = colors::literal("init"),
        completion = colors::literal("completion"),
    )
}

/// Quickstart shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Quickstart:
  poolkeep init --remote ws://host:7890   Set up with a remote store
  poolkeep check ph 7.9                   Classify one reading
  poolkeep report ph=7.4 fc=2.5 ta=100    Full compliance report
  poolkeep record --pool main ph=7.4      Save a test, offline-safe
  poolkeep sync                           Deliver queued writes",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
