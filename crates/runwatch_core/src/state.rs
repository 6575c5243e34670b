use crate::poll::PollTracker;
use crate::publish::PublishController;
use crate::view_model::{FetchErrorView, JobHeaderView, MonitorViewModel};
use crate::{ready_artifact, reconcile, ExpansionState, Job, JobId, PublishPhase, RequestSeq};

/// What the auth collaborator last said about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// State owned by one job view. Snapshots are replaced wholesale, never
/// edited.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitorState {
    job_id: Option<JobId>,
    auth: AuthState,
    snapshot: Option<Job>,
    snapshot_cached: bool,
    expansion: ExpansionState,
    pub(crate) poll: PollTracker,
    pub(crate) publish: PublishController,
    fetch_error: Option<FetchErrorView>,
    not_found: bool,
    dirty: bool,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> MonitorViewModel {
        let live = self.live_snapshot();
        let artifact = live.and_then(ready_artifact).map(ToOwned::to_owned);
        let can_publish = artifact.is_some() && self.publish.phase() == PublishPhase::Idle;

        MonitorViewModel {
            job_id: self.job_id,
            auth: self.auth,
            loading: self.job_id.is_some()
                && self.snapshot.is_none()
                && self.fetch_error.is_none(),
            header: self.snapshot.as_ref().map(header_view),
            stale: self.snapshot.is_some() && self.snapshot_cached,
            steps: self
                .snapshot
                .as_ref()
                .map(|job| reconcile(&job.steps, &self.expansion))
                .unwrap_or_default(),
            artifact,
            can_publish,
            publish_phase: self.publish.phase(),
            publish_result: self.publish.result().cloned(),
            error: self.fetch_error.clone(),
            polling: self.poll.timer_armed(),
        }
    }

    /// Returns whether anything changed since the last call and resets the
    /// flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.job_id
    }

    pub fn auth(&self) -> AuthState {
        self.auth
    }

    pub fn snapshot(&self) -> Option<&Job> {
        self.snapshot.as_ref()
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    /// Snapshot from a live fetch, excluding a cached stand-in.
    pub fn live_snapshot(&self) -> Option<&Job> {
        self.snapshot.as_ref().filter(|_| !self.snapshot_cached)
    }

    /// Sequence of the last fetch response accepted in this view; `None`
    /// until one lands.
    pub fn applied_seq(&self) -> Option<RequestSeq> {
        self.poll.applied_seq()
    }

    pub fn artifact_ready(&self) -> bool {
        self.live_snapshot().and_then(ready_artifact).is_some()
    }

    /// Fetches are allowed only for an open, existing job with a valid
    /// session.
    pub(crate) fn can_fetch(&self) -> bool {
        self.job_id.is_some() && self.auth == AuthState::Authenticated && !self.not_found
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn reset_view(&mut self, job_id: Option<JobId>) {
        self.job_id = job_id;
        self.snapshot = None;
        self.snapshot_cached = false;
        self.expansion.clear();
        self.fetch_error = None;
        self.not_found = false;
        self.dirty = true;
    }

    pub(crate) fn set_auth(&mut self, auth: AuthState) {
        if self.auth != auth {
            self.auth = auth;
            self.dirty = true;
        }
    }

    pub(crate) fn apply_snapshot(&mut self, job: Job) {
        self.snapshot = Some(job);
        self.snapshot_cached = false;
        self.fetch_error = None;
        self.dirty = true;
    }

    pub(crate) fn apply_cached(&mut self, job: Job) {
        self.snapshot = Some(job);
        self.snapshot_cached = true;
        self.dirty = true;
    }

    pub(crate) fn mark_not_found(&mut self) {
        self.not_found = true;
        self.snapshot = None;
        self.snapshot_cached = false;
        self.fetch_error = Some(FetchErrorView {
            message: "Run not found".to_string(),
            persistent: true,
        });
        self.dirty = true;
    }

    pub(crate) fn set_fetch_error(&mut self, message: String, persistent: bool) {
        self.fetch_error = Some(FetchErrorView {
            message,
            persistent,
        });
        self.dirty = true;
    }

    pub(crate) fn toggle_step(&mut self, name: &str) -> bool {
        self.dirty = true;
        self.expansion.toggle(name)
    }
}

fn header_view(job: &Job) -> JobHeaderView {
    JobHeaderView {
        id: job.id,
        trigger_type: job.trigger_type.clone(),
        instrument: job.instrument.clone(),
        timeframe: job.timeframe.clone(),
        status: job.status.clone(),
        created_at: job.created_at.clone(),
        finished_at: job.finished_at.clone(),
        cost_est_total: job.cost_est_total,
        published: job.published,
    }
}
