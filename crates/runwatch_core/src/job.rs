use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::JobStatus;

pub type JobId = u64;

/// Immutable snapshot of a run as returned by `GET /api/runs/{id}`.
///
/// Every poll produces a fresh `Job` that replaces the previous one; the
/// monitor never edits a snapshot in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub trigger_type: String,
    pub instrument: String,
    pub timeframe: String,
    pub status: JobStatus,
    pub created_at: String,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub cost_est_total: f64,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One pipeline step. `step_name` is unique within its job and is the key
/// used for expansion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_name: String,
    #[serde(default)]
    pub input_blob: Value,
    #[serde(default)]
    pub output_blob: Option<String>,
    #[serde(default)]
    pub llm_model: Option<String>,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub cost_est: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Row of the run listing (`GET /api/runs?limit=N`); carries no steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    #[serde(default)]
    pub trigger_type: String,
    pub instrument: String,
    pub timeframe: String,
    pub status: JobStatus,
    pub created_at: String,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub cost_est_total: f64,
}

impl Step {
    /// Output text; blank output counts as missing.
    pub fn output(&self) -> Option<&str> {
        self.output_blob.as_deref().filter(|text| !text.trim().is_empty())
    }
}
