//! CLI color helpers.
//!
//! Every helper honours `NO_COLOR`, `FORCE_COLOR` and TTY detection through
//! `owo-colors`' `if_supports_color()`.

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    // supports-color reads NO_COLOR on every call.
    // SAFETY: Called once at startup before any threads are spawned.
    unsafe { std::env::set_var("NO_COLOR", "1") };
}

// Slate blue: names, primary accent
const ACCENT: (u8, u8, u8) = (124, 180, 200);

// Moss green: restored / success
const SUCCESS: (u8, u8, u8) = (107, 143, 94);

// Amber: skipped / warning
const WARNING: (u8, u8, u8) = (196, 154, 92);

// Brick red: failures
const DANGER: (u8, u8, u8) = (184, 112, 96);

// Gray: secondary info, borders, hints
const MUTED: (u8, u8, u8) = (92, 99, 112);

pub fn accent(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(ACCENT.0, ACCENT.1, ACCENT.2))
        .to_string()
}

pub fn success(text: &str) -> String {
    text.if_supports_color(Stdout, |t| {
        t.truecolor(SUCCESS.0, SUCCESS.1, SUCCESS.2)
    })
    .to_string()
}

pub fn warning(text: &str) -> String {
    text.if_supports_color(Stdout, |t| {
        t.truecolor(WARNING.0, WARNING.1, WARNING.2)
    })
    .to_string()
}

pub fn danger(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(DANGER.0, DANGER.1, DANGER.2))
        .to_string()
}

pub fn muted(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(MUTED.0, MUTED.1, MUTED.2))
        .to_string()
}

pub fn bold(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Color a restore status label (`restored`, `app not running`, ...).
pub fn restore_status(restored: bool, label: &str) -> String {
    if restored {
        success(label)
    } else {
        danger(label)
    }
}

/// Error styling for stderr messages.
pub fn error(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(DANGER.0, DANGER.1, DANGER.2))
        .to_string()
}

/// Hint styling for stderr messages.
pub fn hint(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(MUTED.0, MUTED.1, MUTED.2))
        .to_string()
}
