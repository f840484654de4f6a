// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal ANSI coloring for list/show views.

use std::io::IsTerminal;

fn enabled() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn wrap(code: &str, text: &str) -> String {
    if enabled() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Dim styling for ids and secondary fields.
pub fn muted(text: &str) -> String {
    wrap("2", text)
}

/// Color a job state label: green for success, red for dead, yellow for
/// in-between states.
pub fn status(text: &str) -> String {
    let code = match text {
        "completed" => "32",
        "dead" => "31",
        "processing" => "36",
        "failed_transient" => "33",
        _ => return text.to_string(),
    };
    wrap(code, text)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
