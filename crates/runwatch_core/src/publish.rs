use std::time::Duration;

use crate::PublishOutcome;

/// How long a publish result stays visible.
pub const PUBLISH_STATUS_TTL: Duration = Duration::from_secs(5);

pub const PUBLISH_SUCCESS_FALLBACK: &str = "Published successfully";
pub const PUBLISH_FAILURE_FALLBACK: &str = "Failed to publish run";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishPhase {
    #[default]
    Idle,
    AwaitingConfirmation,
    InFlight,
}

/// Transient outcome of the last publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    Success(String),
    Failure(String),
}

impl PublishResult {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<&PublishOutcome> for PublishResult {
    fn from(outcome: &PublishOutcome) -> Self {
        match outcome {
            PublishOutcome::Posted { message } => Self::Success(
                message
                    .clone()
                    .unwrap_or_else(|| PUBLISH_SUCCESS_FALLBACK.to_string()),
            ),
            PublishOutcome::Rejected { reason } => Self::Failure(
                reason
                    .clone()
                    .unwrap_or_else(|| PUBLISH_FAILURE_FALLBACK.to_string()),
            ),
            PublishOutcome::Unauthorized => Self::Failure(PUBLISH_FAILURE_FALLBACK.to_string()),
        }
    }
}

/// Confirmation gate, in-flight flag and expiring result for publishing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct PublishController {
    phase: PublishPhase,
    result: Option<PublishResult>,
    clear_generation: u64,
}

impl PublishController {
    pub(crate) fn phase(&self) -> PublishPhase {
        self.phase
    }

    pub(crate) fn result(&self) -> Option<&PublishResult> {
        self.result.as_ref()
    }

    /// Opens the confirmation step. Refused while a call is pending.
    pub(crate) fn request(&mut self) -> bool {
        if self.phase != PublishPhase::Idle {
            return false;
        }
        self.phase = PublishPhase::AwaitingConfirmation;
        true
    }

    pub(crate) fn confirm(&mut self) -> bool {
        if self.phase != PublishPhase::AwaitingConfirmation {
            return false;
        }
        self.phase = PublishPhase::InFlight;
        true
    }

    pub(crate) fn cancel(&mut self) -> bool {
        if self.phase != PublishPhase::AwaitingConfirmation {
            return false;
        }
        self.phase = PublishPhase::Idle;
        true
    }

    /// Stores the result and returns the generation its expiry must carry.
    /// Each new result restarts the expiry window.
    pub(crate) fn complete(&mut self, result: PublishResult) -> u64 {
        self.phase = PublishPhase::Idle;
        self.result = Some(result);
        self.clear_generation += 1;
        self.clear_generation
    }

    pub(crate) fn expire(&mut self, generation: u64) -> bool {
        if generation != self.clear_generation || self.result.is_none() {
            return false;
        }
        self.result = None;
        true
    }

    /// Drops everything for a view teardown; returns whether an expiry
    /// timer was pending.
    pub(crate) fn reset(&mut self) -> bool {
        let had_result = self.result.is_some();
        self.phase = PublishPhase::Idle;
        self.result = None;
        self.clear_generation += 1;
        had_result
    }
}
