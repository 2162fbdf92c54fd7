//! Reporting utilities: formatted terminal output for both tools.

pub mod format;

pub use format::{fmt_sig, format_bounce_report, format_decay_report};
