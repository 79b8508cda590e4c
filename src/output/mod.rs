//! Output formatting module
//!
//! Renders commands, configuration, and execution reports.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
