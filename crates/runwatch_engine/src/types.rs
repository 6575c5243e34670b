use runwatch_core::JobId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("run not found")]
    NotFound,
    #[error("not authenticated")]
    Unauthorized,
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The backend refused the request with a human-readable `detail`.
    #[error("publish rejected: {0}")]
    Validation(String),
    #[error("run not found")]
    NotFound,
    #[error("not authenticated")]
    Unauthorized,
    #[error("transport error: {0}")]
    Transport(String),
}

/// Body of a successful `POST /api/runs/{id}/publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRunRequest {
    pub instrument: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRun {
    pub id: JobId,
}

/// FastAPI error body. `detail` is a string for handled errors and a list of
/// objects for request validation failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub(crate) fn detail_text(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) if text.trim().is_empty() => None,
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if messages.is_empty() {
                    Some(self.detail.to_string())
                } else {
                    Some(messages.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }
}
