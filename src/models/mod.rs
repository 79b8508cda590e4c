//! Data models for the pull request driver
//!
//! Commands handed to external processes and the records of running them.

mod command;
mod report;

pub use command::{CommandSpec, ProcessExit};
pub use report::{ExecutionReport, RunOutcome};
