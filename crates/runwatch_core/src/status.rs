use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay between two polls while a job is queued or running.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Lifecycle status reported by the backend for a job.
///
/// Unknown strings are kept verbatim in `Other` so that a newer backend does
/// not break deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Succeeded,
    Failed,
    Other(String),
}

impl JobStatus {
    /// `Succeeded` and `Failed` end a job's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Only `Queued` and `Running` keep the poller alive.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "queued" => Self::Queued,
            "running" => Self::Running,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delay before the next poll given the freshest known status, or `None`
/// when polling should stop.
pub fn next_interval(status: &JobStatus) -> Option<Duration> {
    status.is_active().then_some(POLL_INTERVAL)
}
