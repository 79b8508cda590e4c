//! Output formatters
//!
//! Provides text and JSON renderings for the CLI.

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::config::DriverConfig;
use crate::models::{CommandSpec, ExecutionReport};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Ok(OutputFormat::JsonPretty),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a command, one token per line in text mode
    pub fn format_command(&self, command: &CommandSpec) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(command.to_multiline()),
            _ => self.json(&command.argv()),
        }
    }

    /// Format a configuration context (YAML in text mode)
    pub fn format_config(&self, config: &DriverConfig) -> Result<String> {
        match self.format {
            OutputFormat::Text => serde_yaml::to_string(config).context("Failed to serialize config"),
            _ => self.json(config),
        }
    }

    /// Format an execution report
    pub fn format_report(&self, report: &ExecutionReport) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(format!(
                "{}\n  started:  {}\n  command:  {}",
                report,
                report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.command
            )),
            _ => self.json(report),
        }
    }

    /// Format a list of reports, one line each in text mode
    pub fn format_reports(&self, reports: &[ExecutionReport]) -> Result<String> {
        match self.format {
            OutputFormat::Text => {
                if reports.is_empty() {
                    return Ok("No stored runs".to_string());
                }
                Ok(reports
                    .iter()
                    .map(|r| format!("{}  {}", r.started_at.format("%Y-%m-%d %H:%M:%S"), r))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            _ => self.json(&reports),
        }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let rendered = if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.context("Failed to serialize output")
    }
}
