#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use runwatch_core::{Job, JobId, JobStatus, JobSummary, Step};
use runwatch_engine::{
    CreateRunRequest, CreatedRun, FetchError, JobClient, PublishError, PublishResponse,
};

pub const JOB_ID: JobId = 7;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(runwatch_logging::initialize_for_tests);
}

pub fn step(name: &str, output: Option<&str>) -> Step {
    Step {
        step_name: name.to_string(),
        input_blob: serde_json::Value::Null,
        output_blob: output.map(ToOwned::to_owned),
        llm_model: Some("claude-3-haiku".to_string()),
        tokens_used: 800,
        cost_est: 0.001,
        created_at: None,
    }
}

pub fn job(status: &str, steps: Vec<Step>) -> Job {
    Job {
        id: JOB_ID,
        trigger_type: "manual".to_string(),
        instrument: "BTCUSDT".to_string(),
        timeframe: "H1".to_string(),
        status: JobStatus::from(status),
        created_at: "2024-05-01T07:59:00Z".to_string(),
        finished_at: None,
        cost_est_total: 0.0,
        published: false,
        steps,
    }
}

/// In-memory backend that replays a script of snapshots. The last snapshot
/// repeats once the script runs out.
pub struct ScriptedClient {
    jobs: Mutex<VecDeque<Job>>,
    publish_result: Mutex<Result<PublishResponse, PublishError>>,
    authenticated: bool,
    fetch_delay: Mutex<Duration>,
    fetch_failure: Mutex<Option<FetchError>>,
    fetch_calls: AtomicUsize,
    publish_calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs.into()),
            publish_result: Mutex::new(Ok(PublishResponse {
                success: true,
                message: Some("Posted".to_string()),
            })),
            authenticated: true,
            fetch_delay: Mutex::new(Duration::ZERO),
            fetch_failure: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            publish_calls: AtomicUsize::new(0),
        }
    }

    pub fn signed_out(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Replaces whatever is left of the script.
    pub fn replace_script(&self, jobs: Vec<Job>) {
        *self.jobs.lock().unwrap() = jobs.into();
    }

    pub fn set_publish_result(&self, result: Result<PublishResponse, PublishError>) {
        *self.publish_result.lock().unwrap() = result;
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    /// Every later fetch answers with `err` instead of the script.
    pub fn fail_fetches_with(&self, err: FetchError) {
        *self.fetch_failure.lock().unwrap() = Some(err);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn publish_calls(&self) -> usize {
        self.publish_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JobClient for ScriptedClient {
    async fn fetch_job(&self, job_id: JobId) -> Result<Job, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.fetch_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let mut jobs = self.jobs.lock().unwrap();
        let job = if jobs.len() > 1 {
            jobs.pop_front()
        } else {
            jobs.front().cloned()
        };
        job.filter(|job| job.id == job_id).ok_or(FetchError::NotFound)
    }

    async fn publish(&self, _job_id: JobId) -> Result<PublishResponse, PublishError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        self.publish_result.lock().unwrap().clone()
    }

    async fn check_session(&self) -> Result<bool, FetchError> {
        Ok(self.authenticated)
    }

    async fn list_runs(&self, _limit: usize) -> Result<Vec<JobSummary>, FetchError> {
        Ok(Vec::new())
    }

    async fn create_run(&self, _request: &CreateRunRequest) -> Result<CreatedRun, FetchError> {
        Ok(CreatedRun { id: JOB_ID })
    }
}
