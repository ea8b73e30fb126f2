//! Per-target reports and the JSON run log written at the end of a run.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::filter::RemovalSummary;
use crate::error::Result;
use crate::io::toolkit::StepOutcome;
use crate::types::TargetSource;

/// File name of the run log inside the output directory.
pub const RUN_LOG_FILE: &str = "protprep_log.json";

/// Everything recorded for a target that was prepared successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedTarget {
    pub label: String,
    pub source: TargetSource,
    /// Structure file the cleaner read (local input or download)
    pub fetched: PathBuf,
    pub cleaned: PathBuf,
    pub removed: RemovalSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_hydrogens: Option<StepOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdbqt: Option<StepOutcome>,
    /// Last file successfully produced by the pipeline
    pub prepared: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetOutcome {
    Prepared(PreparedTarget),
    Failed { error: String },
}

/// One run log entry: the target as given, plus its result or error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub input: String,
    #[serde(flatten)]
    pub outcome: TargetOutcome,
}

impl TargetReport {
    pub fn prepared(input: impl Into<String>, target: PreparedTarget) -> Self {
        Self {
            input: input.into(),
            outcome: TargetOutcome::Prepared(target),
        }
    }

    pub fn failed(input: impl Into<String>, error: impl ToString) -> Self {
        Self {
            input: input.into(),
            outcome: TargetOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TargetOutcome::Prepared(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            TargetOutcome::Failed { error } => Some(error),
            TargetOutcome::Prepared(_) => None,
        }
    }
}

/// Write `reports` as a pretty JSON array to `<out_dir>/protprep_log.json`.
pub fn write_run_log(out_dir: &Path, reports: &[TargetReport]) -> Result<PathBuf> {
    let path = out_dir.join(RUN_LOG_FILE);
    let json = serde_json::to_string_pretty(reports)?;
    fs::write(&path, json)?;
    info!("[FINISHED] Reports: {:?}", path);
    Ok(path)
}

pub fn read_run_log(path: &Path) -> Result<Vec<TargetReport>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
