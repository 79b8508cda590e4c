//! Execution report models
//!
//! Records what a driver run did and how it ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CommandSpec, ProcessExit};

/// How a driver run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Passed,
    Failed,
    DryRun,
}

impl RunOutcome {
    /// Integer status returned to the caller
    pub fn status(&self) -> i32 {
        match self {
            RunOutcome::Passed | RunOutcome::DryRun => 0,
            RunOutcome::Failed => 1,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RunOutcome::Passed => "✓",
            RunOutcome::Failed => "✗",
            RunOutcome::DryRun => "○",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Passed => write!(f, "PASSED"),
            RunOutcome::Failed => write!(f, "FAILED"),
            RunOutcome::DryRun => write!(f, "DRY RUN"),
        }
    }
}

/// Record of a single `execute_test` call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// CDash build name
    pub build_name: String,

    /// CTest command that was (or would have been) run
    pub command: CommandSpec,

    /// Final outcome
    pub outcome: RunOutcome,

    /// Exit state of CTest, when it ran to completion
    pub exit: Option<ProcessExit>,

    /// Why CTest failed, when it did
    pub failure: Option<String>,

    /// Timestamp when the run started
    pub started_at: DateTime<Utc>,

    /// Timestamp when the run completed
    pub completed_at: DateTime<Utc>,

    /// Time spent in CTest, in milliseconds
    pub duration_ms: u64,
}

impl ExecutionReport {
    /// Integer status returned to the caller
    pub fn status(&self) -> i32 {
        self.outcome.status()
    }

    pub fn is_dry_run(&self) -> bool {
        self.outcome == RunOutcome::DryRun
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] ({}ms)",
            self.outcome.symbol(),
            self.build_name,
            self.outcome,
            self.duration_ms
        )?;
        if let Some(ref failure) = self.failure {
            write!(f, " - {failure}")?;
        }
        Ok(())
    }
}
