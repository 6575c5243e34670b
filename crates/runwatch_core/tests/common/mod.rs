#![allow(dead_code)]

use std::sync::Once;

use runwatch_core::{update, Effect, Job, JobId, JobStatus, MonitorState, Msg, RequestSeq, Step};

pub const JOB_ID: JobId = 42;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(runwatch_logging::initialize_for_tests);
}

pub fn step(name: &str, output: Option<&str>) -> Step {
    Step {
        step_name: name.to_string(),
        input_blob: serde_json::json!({ "system": "sys", "user": "usr" }),
        output_blob: output.map(ToOwned::to_owned),
        llm_model: Some("gpt-4o-mini".to_string()),
        tokens_used: 1200,
        cost_est: 0.0021,
        created_at: Some("2024-05-01T08:00:00Z".to_string()),
    }
}

pub fn job(status: &str, steps: Vec<Step>) -> Job {
    Job {
        id: JOB_ID,
        trigger_type: "manual".to_string(),
        instrument: "EURUSD".to_string(),
        timeframe: "H1".to_string(),
        status: JobStatus::from(status),
        created_at: "2024-05-01T07:59:00Z".to_string(),
        finished_at: None,
        cost_est_total: 0.0,
        published: false,
        steps,
    }
}

/// Opens the view and authenticates; returns the state plus the seq of the
/// initial fetch.
pub fn open_authenticated() -> (MonitorState, RequestSeq) {
    let (state, effects) = update(MonitorState::new(), Msg::ViewOpened { job_id: JOB_ID });
    assert_eq!(effects, vec![Effect::CheckSession]);
    let (state, effects) = update(state, Msg::AuthResolved(true));
    let seq = fetch_seq(&effects).expect("initial fetch");
    (state, seq)
}

pub fn fetch_seq(effects: &[Effect]) -> Option<RequestSeq> {
    effects.iter().find_map(|effect| match effect {
        Effect::FetchJob { seq, .. } => Some(*seq),
        _ => None,
    })
}

pub fn poll_generation(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|effect| match effect {
        Effect::SchedulePoll { generation, .. } => Some(*generation),
        _ => None,
    })
}

pub fn clear_generation(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|effect| match effect {
        Effect::ScheduleStatusClear { generation, .. } => Some(*generation),
        _ => None,
    })
}

pub fn deliver(state: MonitorState, seq: RequestSeq, job: Job) -> (MonitorState, Vec<Effect>) {
    update(
        state,
        Msg::FetchCompleted {
            job_id: JOB_ID,
            seq,
            result: Ok(job),
        },
    )
}

/// Fires the armed poll timer and returns the seq of the fetch it issued.
pub fn fire_poll(state: MonitorState, effects: &[Effect]) -> (MonitorState, RequestSeq) {
    let generation = poll_generation(effects).expect("poll scheduled");
    let (state, effects) = update(state, Msg::PollTimerFired { generation });
    let seq = fetch_seq(&effects).expect("poll fetch");
    (state, seq)
}
