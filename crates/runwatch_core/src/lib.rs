//! Runwatch core: pure job-monitor state machine and view-model helpers.
mod artifact;
mod effect;
mod job;
mod msg;
mod poll;
mod publish;
mod state;
mod status;
mod steps;
mod update;
mod view_model;

pub use artifact::{find_merge_output, ready_artifact, MERGE_STEP};
pub use effect::Effect;
pub use job::{Job, JobId, JobSummary, Step};
pub use msg::{FetchFailure, Msg, PublishOutcome};
pub use poll::{RequestSeq, MAX_CONSECUTIVE_FAILURES};
pub use publish::{
    PublishPhase, PublishResult, PUBLISH_FAILURE_FALLBACK, PUBLISH_STATUS_TTL,
    PUBLISH_SUCCESS_FALLBACK,
};
pub use state::{AuthState, MonitorState};
pub use status::{next_interval, JobStatus, POLL_INTERVAL};
pub use steps::{reconcile, step_label, ExpansionState, STEP_LABELS};
pub use update::update;
pub use view_model::{FetchErrorView, JobHeaderView, MonitorViewModel, StepView};
