//! Results storage and retrieval
//!
//! Stores execution reports as JSON files, one per run.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::ExecutionReport;

/// Directory of stored execution reports
pub struct ResultsStorage {
    base_dir: PathBuf,
}

impl ResultsStorage {
    /// Create storage rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Storage under the user's local data directory
    pub fn default_location() -> Result<Self> {
        let base_dir = dirs::data_local_dir()
            .context("Could not determine local data directory")?
            .join("pr-driver")
            .join("results");
        Ok(Self::new(base_dir))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File name for a report: sanitized build name plus start time
    fn report_path(&self, report: &ExecutionReport) -> PathBuf {
        let name: String = report
            .build_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stamp = report.started_at.format("%Y%m%dT%H%M%S%3f");
        self.base_dir.join(format!("{name}-{stamp}.json"))
    }

    /// Save a report
    pub fn save(&self, report: &ExecutionReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create results directory: {}", self.base_dir.display())
        })?;

        let path = self.report_path(report);
        let file = File::create(&path).context("Failed to create results file")?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, report).context("Failed to write results")?;

        info!("Saved execution report to {}", path.display());
        Ok(path)
    }

    /// Load a report from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<ExecutionReport> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open results file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("Failed to parse results")
    }

    /// Load all reports, newest first
    pub fn list(&self) -> Result<Vec<ExecutionReport>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.load_from_path(&path) {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        debug!("Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        reports.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(reports)
    }

    /// Most recent report, if any
    pub fn latest(&self) -> Result<Option<ExecutionReport>> {
        Ok(self.list()?.into_iter().next())
    }
}
