use crate::{Job, JobId, RequestSeq};

/// Why a job fetch did not produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The job id does not exist; terminal for the view.
    NotFound,
    /// The session is gone; handed to the auth collaborator.
    Unauthorized,
    /// Network or server trouble; retried on the next tick.
    Transport(String),
}

/// What the backend answered to a publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Posted { message: Option<String> },
    Rejected { reason: Option<String> },
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The job view was opened (navigation to a run).
    ViewOpened { job_id: JobId },
    /// The job view was torn down (navigation away).
    ViewClosed,
    /// Auth collaborator verdict.
    AuthResolved(bool),
    /// The poll timer armed with `generation` elapsed.
    PollTimerFired { generation: u64 },
    /// Window or tab regained focus.
    WindowActivated,
    /// User asked for an immediate refresh.
    RefreshRequested,
    /// Response for the fetch tagged `seq`.
    FetchCompleted {
        job_id: JobId,
        seq: RequestSeq,
        result: Result<Job, FetchFailure>,
    },
    /// Previously cached snapshot, shown until a live one arrives.
    CachedSnapshot { job: Job },
    /// User clicked a step header.
    StepToggled { name: String },
    /// User clicked Publish; opens the confirmation step.
    PublishRequested,
    /// User confirmed the publish prompt.
    PublishConfirmed,
    /// User dismissed the publish prompt.
    PublishCancelled,
    /// Response for the publish call on `job_id`.
    PublishCompleted {
        job_id: JobId,
        outcome: PublishOutcome,
    },
    /// The publish status expiry armed with `generation` elapsed.
    PublishStatusExpired { generation: u64 },
}
