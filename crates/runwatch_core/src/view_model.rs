use crate::{AuthState, JobId, JobStatus, PublishPhase, PublishResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitorViewModel {
    pub job_id: Option<JobId>,
    pub auth: AuthState,
    /// View is open but no snapshot has been received yet.
    pub loading: bool,
    pub header: Option<JobHeaderView>,
    /// The header and steps come from the cache, not a live fetch.
    pub stale: bool,
    pub steps: Vec<StepView>,
    /// Final artifact; set only for a live, succeeded snapshot.
    pub artifact: Option<String>,
    pub can_publish: bool,
    pub publish_phase: PublishPhase,
    pub publish_result: Option<PublishResult>,
    pub error: Option<FetchErrorView>,
    /// A poll is scheduled.
    pub polling: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobHeaderView {
    pub id: JobId,
    pub trigger_type: String,
    pub instrument: String,
    pub timeframe: String,
    pub status: JobStatus,
    pub created_at: String,
    pub finished_at: Option<String>,
    pub cost_est_total: f64,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    pub name: String,
    pub label: String,
    pub expanded: bool,
    pub output: Option<String>,
    pub llm_model: Option<String>,
    pub tokens_used: u64,
    pub cost_est: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchErrorView {
    pub message: String,
    /// Polling has stopped because of this error.
    pub persistent: bool,
}
