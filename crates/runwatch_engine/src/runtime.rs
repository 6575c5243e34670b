use std::sync::Arc;
use std::time::Duration;

use runwatch_core::{
    update, Effect, FetchFailure, JobId, MonitorState, MonitorViewModel, Msg, PublishOutcome,
    RequestSeq,
};
use runwatch_logging::{monitor_debug, monitor_info, monitor_trace, monitor_warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::{FetchError, JobClient, PublishError, PublishResponse, SnapshotCache};

enum RuntimeCommand {
    Deliver(Msg),
    Shutdown,
}

/// Front-end side of a running monitor: posts messages and observes views.
#[derive(Clone)]
pub struct MonitorHandle {
    cmd_tx: mpsc::UnboundedSender<RuntimeCommand>,
    view_rx: watch::Receiver<MonitorViewModel>,
}

impl MonitorHandle {
    /// Returns false once the runtime has stopped.
    pub fn send(&self, msg: Msg) -> bool {
        self.cmd_tx.send(RuntimeCommand::Deliver(msg)).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorViewModel> {
        self.view_rx.clone()
    }
}

/// Drives `runwatch_core::update` on a single task. Network calls and timers
/// run as spawned tasks that post their completion back as a `Msg`, so state
/// is only ever touched from `run`.
pub struct MonitorRuntime<C> {
    client: Arc<C>,
    state: MonitorState,
    cache: SnapshotCache,
    cmd_tx: mpsc::UnboundedSender<RuntimeCommand>,
    cmd_rx: mpsc::UnboundedReceiver<RuntimeCommand>,
    view_tx: watch::Sender<MonitorViewModel>,
    fetch_task: Option<JoinHandle<()>>,
    poll_timer: Option<JoinHandle<()>>,
    clear_timer: Option<JoinHandle<()>>,
}

impl<C: JobClient + 'static> MonitorRuntime<C> {
    pub fn new(client: Arc<C>) -> (Self, MonitorHandle) {
        Self::with_cache(client, SnapshotCache::new())
    }

    pub fn with_cache(client: Arc<C>, cache: SnapshotCache) -> (Self, MonitorHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let state = MonitorState::new();
        let (view_tx, view_rx) = watch::channel(state.view());
        let handle = MonitorHandle {
            cmd_tx: cmd_tx.clone(),
            view_rx,
        };
        let runtime = Self {
            client,
            state,
            cache,
            cmd_tx,
            cmd_rx,
            view_tx,
            fetch_task: None,
            poll_timer: None,
            clear_timer: None,
        };
        (runtime, handle)
    }

    /// Processes messages until `MonitorHandle::shutdown`; hands back the
    /// snapshot cache for reuse by a later monitor.
    pub async fn run(mut self) -> SnapshotCache {
        while let Some(command) = self.cmd_rx.recv().await {
            match command {
                RuntimeCommand::Deliver(msg) => self.dispatch(msg),
                RuntimeCommand::Shutdown => break,
            }
        }
        monitor_debug!("Monitor runtime stopping");
        for task in [
            self.fetch_task.take(),
            self.poll_timer.take(),
            self.clear_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
        self.cache
    }

    fn dispatch(&mut self, msg: Msg) {
        monitor_trace!("Dispatching {:?}", msg);
        let applied_before = self.state.applied_seq();
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        // Only a newly accepted snapshot refills the cache.
        if self.state.applied_seq() != applied_before {
            if let Some(job) = self.state.live_snapshot() {
                self.cache.store(job);
            }
        }
        for effect in effects {
            self.execute(effect);
        }

        let view = self.state.view();
        if self.state.consume_dirty() {
            self.view_tx.send_replace(view);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::CheckSession => self.spawn_session_check(),
            Effect::FetchJob { job_id, seq } => {
                if self.state.snapshot().is_none() {
                    if let Some(job) = self.cache.get(job_id) {
                        self.post(Msg::CachedSnapshot { job: job.clone() });
                    }
                }
                self.spawn_fetch(job_id, seq);
            }
            Effect::SchedulePoll { after, generation } => {
                let timer = self.spawn_timer(after, Msg::PollTimerFired { generation });
                replace_task(&mut self.poll_timer, timer);
            }
            Effect::CancelPoll => abort_task(&mut self.poll_timer),
            Effect::Publish { job_id } => self.spawn_publish(job_id),
            Effect::InvalidateJob { job_id } => {
                if self.cache.invalidate(job_id) {
                    monitor_debug!("Invalidated cached snapshot of run {}", job_id);
                }
            }
            Effect::ScheduleStatusClear { after, generation } => {
                let timer = self.spawn_timer(after, Msg::PublishStatusExpired { generation });
                replace_task(&mut self.clear_timer, timer);
            }
            Effect::CancelStatusClear => abort_task(&mut self.clear_timer),
            Effect::RedirectToLogin => {
                monitor_warn!("Login required; monitor halted until the session is restored");
            }
        }
    }

    fn post(&self, msg: Msg) {
        let _ = self.cmd_tx.send(RuntimeCommand::Deliver(msg));
    }

    fn spawn_session_check(&self) {
        let client = self.client.clone();
        let cmd_tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            // Any failure counts as signed out, matching the auth probe.
            let authenticated = match client.check_session().await {
                Ok(authenticated) => authenticated,
                Err(err) => {
                    monitor_warn!("Session check failed: {}", err);
                    false
                }
            };
            let _ = cmd_tx.send(RuntimeCommand::Deliver(Msg::AuthResolved(authenticated)));
        });
    }

    /// A newer fetch supersedes the one in flight. The sequence check in the
    /// core still guards against a result that slips through.
    fn spawn_fetch(&mut self, job_id: JobId, seq: RequestSeq) {
        let client = self.client.clone();
        let cmd_tx = self.cmd_tx.clone();
        let task = tokio::spawn(async move {
            let result = client.fetch_job(job_id).await.map_err(fetch_failure);
            let _ = cmd_tx.send(RuntimeCommand::Deliver(Msg::FetchCompleted {
                job_id,
                seq,
                result,
            }));
        });
        replace_task(&mut self.fetch_task, task);
    }

    fn spawn_publish(&self, job_id: JobId) {
        let client = self.client.clone();
        let cmd_tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            let outcome = publish_outcome(client.publish(job_id).await);
            let _ = cmd_tx.send(RuntimeCommand::Deliver(Msg::PublishCompleted {
                job_id,
                outcome,
            }));
        });
    }

    fn spawn_timer(&self, after: Duration, msg: Msg) -> JoinHandle<()> {
        let cmd_tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = cmd_tx.send(RuntimeCommand::Deliver(msg));
        })
    }
}

fn replace_task(slot: &mut Option<JoinHandle<()>>, task: JoinHandle<()>) {
    if let Some(previous) = slot.replace(task) {
        previous.abort();
    }
}

fn abort_task(slot: &mut Option<JoinHandle<()>>) {
    if let Some(task) = slot.take() {
        task.abort();
    }
}

fn fetch_failure(err: FetchError) -> FetchFailure {
    match err {
        FetchError::NotFound => FetchFailure::NotFound,
        FetchError::Unauthorized => FetchFailure::Unauthorized,
        FetchError::Transport(message) => FetchFailure::Transport(message),
    }
}

fn publish_outcome(result: Result<PublishResponse, PublishError>) -> PublishOutcome {
    match result {
        Ok(PublishResponse {
            success: true,
            message,
        }) => PublishOutcome::Posted { message },
        Ok(PublishResponse {
            success: false,
            message,
        }) => PublishOutcome::Rejected { reason: message },
        Err(PublishError::Validation(detail)) => PublishOutcome::Rejected {
            reason: Some(detail),
        },
        Err(PublishError::NotFound) => PublishOutcome::Rejected {
            reason: Some("Run not found".to_string()),
        },
        Err(PublishError::Unauthorized) => PublishOutcome::Unauthorized,
        Err(PublishError::Transport(message)) => {
            monitor_info!("Publish transport failure: {}", message);
            PublishOutcome::Rejected { reason: None }
        }
    }
}
