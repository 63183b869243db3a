// SPDX-License-Identifier: MIT

use std::io::IsTerminal;

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};

mod codes {
    /// `--help` section headers.
    pub const HEADER: u8 = 74;
    /// Flags and literals in `--help` output.
    pub const LITERAL: u8 = 250;
    /// Placeholder values (`<PATH>`, `<SECS>`, ...) in `--help` output.
    pub const CONTEXT: u8 = 245;
}

/// Priority: `NO_COLOR=1` disables -> `COLOR=1` forces -> TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// `clap` help styling; a cron job's stdout/stderr rarely need color, but
/// `--help` run from an interactive shell still benefits from it.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
