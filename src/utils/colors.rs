// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Terminal output helpers
//!
//! Keeps the symbols and colours consistent across commands.

use colored::Colorize;

use crate::errors::SegpipeError;

/// Style for code/commands
pub fn code(msg: &str) -> colored::ColoredString {
    msg.cyan()
}

/// Disable colours when `NO_COLOR` is set
pub fn apply_color_preference() {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!();
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an info item
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

/// Print the recovery steps for an assembly error, if it has any
pub fn print_suggestion(error: &SegpipeError) {
    if let Some(suggestion) = error.suggestion() {
        eprintln!();
        eprintln!("{}", suggestion);
    }
}
