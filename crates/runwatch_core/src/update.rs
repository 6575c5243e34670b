use runwatch_logging::{monitor_debug, monitor_info, monitor_warn};

use crate::{
    next_interval, AuthState, Effect, FetchFailure, Job, JobId, MonitorState, Msg, PublishOutcome,
    PublishResult, RequestSeq, MAX_CONSECUTIVE_FAILURES, POLL_INTERVAL, PUBLISH_STATUS_TTL,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: MonitorState, msg: Msg) -> (MonitorState, Vec<Effect>) {
    let effects = match msg {
        Msg::ViewOpened { job_id } => open_view(&mut state, job_id),
        Msg::ViewClosed => close_view(&mut state),
        Msg::AuthResolved(authenticated) => resolve_auth(&mut state, authenticated),
        Msg::PollTimerFired { generation } => {
            if state.poll.fire(generation) && state.can_fetch() {
                state.mark_dirty();
                issue_fetch(&mut state).into_iter().collect()
            } else {
                Vec::new()
            }
        }
        // Out-of-band fetches leave the poll timer alone.
        Msg::WindowActivated | Msg::RefreshRequested => {
            issue_fetch(&mut state).into_iter().collect()
        }
        Msg::FetchCompleted {
            job_id,
            seq,
            result,
        } => apply_fetch(&mut state, job_id, seq, result),
        Msg::CachedSnapshot { job } => {
            if state.job_id() == Some(job.id) && state.snapshot().is_none() {
                monitor_debug!("Showing cached snapshot for run {}", job.id);
                state.apply_cached(job);
            }
            Vec::new()
        }
        Msg::StepToggled { name } => {
            if state.snapshot().is_some() {
                let expanded = state.toggle_step(&name);
                monitor_debug!("Step {} expanded={}", name, expanded);
            }
            Vec::new()
        }
        Msg::PublishRequested => {
            if state.artifact_ready() && state.publish.request() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PublishConfirmed => match state.job_id() {
            Some(job_id) if state.artifact_ready() && state.publish.confirm() => {
                monitor_info!("Publishing run {}", job_id);
                state.mark_dirty();
                vec![Effect::Publish { job_id }]
            }
            _ => Vec::new(),
        },
        Msg::PublishCancelled => {
            if state.publish.cancel() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PublishCompleted { job_id, outcome } => apply_publish(&mut state, job_id, outcome),
        Msg::PublishStatusExpired { generation } => {
            if state.publish.expire(generation) {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn open_view(state: &mut MonitorState, job_id: JobId) -> Vec<Effect> {
    let mut effects = close_view(state);
    state.poll.begin_view();
    state.reset_view(Some(job_id));
    monitor_debug!("Opened view for run {}", job_id);

    match state.auth() {
        AuthState::Unknown => effects.push(Effect::CheckSession),
        AuthState::Authenticated => effects.extend(issue_fetch(state)),
        AuthState::Unauthenticated => effects.push(Effect::RedirectToLogin),
    }
    effects
}

fn close_view(state: &mut MonitorState) -> Vec<Effect> {
    let Some(job_id) = state.job_id() else {
        return Vec::new();
    };
    monitor_debug!("Closing view for run {}", job_id);
    state.poll.disarm();
    state.publish.reset();
    state.reset_view(None);
    vec![Effect::CancelPoll, Effect::CancelStatusClear]
}

fn resolve_auth(state: &mut MonitorState, authenticated: bool) -> Vec<Effect> {
    if !authenticated {
        return lose_auth(state);
    }
    let was_authenticated = state.auth() == AuthState::Authenticated;
    state.set_auth(AuthState::Authenticated);
    if was_authenticated {
        return Vec::new();
    }
    issue_fetch(state).into_iter().collect()
}

fn lose_auth(state: &mut MonitorState) -> Vec<Effect> {
    monitor_warn!("Session is not authenticated; stopping the monitor");
    state.set_auth(AuthState::Unauthenticated);
    let mut effects = Vec::with_capacity(2);
    if state.poll.disarm() {
        effects.push(Effect::CancelPoll);
    }
    effects.push(Effect::RedirectToLogin);
    effects
}

fn issue_fetch(state: &mut MonitorState) -> Option<Effect> {
    if !state.can_fetch() {
        return None;
    }
    let job_id = state.job_id()?;
    let seq = state.poll.issue();
    monitor_debug!("Fetching run {} (seq {})", job_id, seq);
    Some(Effect::FetchJob { job_id, seq })
}

fn apply_fetch(
    state: &mut MonitorState,
    job_id: JobId,
    seq: RequestSeq,
    result: Result<Job, FetchFailure>,
) -> Vec<Effect> {
    if state.job_id() != Some(job_id) || state.auth() != AuthState::Authenticated {
        monitor_info!("Ignoring response for run {} (seq {}): view changed", job_id, seq);
        return Vec::new();
    }
    if !state.poll.accepts(seq) {
        monitor_info!("Discarding out-of-order response for run {} (seq {})", job_id, seq);
        return Vec::new();
    }

    match result {
        Ok(job) => apply_job(state, seq, job),
        Err(FetchFailure::NotFound) => {
            monitor_warn!("Run {} not found", job_id);
            state.poll.mark_seen(seq);
            state.mark_not_found();
            cancel_poll(state)
        }
        Err(FetchFailure::Unauthorized) => lose_auth(state),
        Err(FetchFailure::Transport(message)) => apply_transport_failure(state, job_id, message),
    }
}

fn apply_job(state: &mut MonitorState, seq: RequestSeq, job: Job) -> Vec<Effect> {
    if let Some(previous) = state.live_snapshot() {
        if previous.status.is_terminal() && !job.status.is_terminal() {
            monitor_info!("Run {} re-entered status {}", job.id, job.status);
        }
    }
    let interval = next_interval(&job.status);
    monitor_debug!("Applied run {} seq {} status {}", job.id, seq, job.status);
    state.poll.mark_applied(seq);
    state.apply_snapshot(job);

    if !state.artifact_ready() {
        // A refreshed snapshot without an artifact withdraws the prompt.
        state.publish.cancel();
    }

    match interval {
        Some(after) => schedule_poll(state, after),
        None => cancel_poll(state),
    }
}

fn apply_transport_failure(state: &mut MonitorState, job_id: JobId, message: String) -> Vec<Effect> {
    let failures = state.poll.record_failure();
    monitor_warn!(
        "Fetching run {} failed ({}/{}): {}",
        job_id,
        failures,
        MAX_CONSECUTIVE_FAILURES,
        message
    );

    if failures >= MAX_CONSECUTIVE_FAILURES {
        state.set_fetch_error(
            format!("Error loading run: {message} (stopped after {failures} attempts)"),
            true,
        );
        return cancel_poll(state);
    }

    state.set_fetch_error(format!("Error loading run: {message}"), false);
    let last_known_active = state
        .live_snapshot()
        .is_none_or(|job| job.status.is_active());
    if last_known_active {
        schedule_poll(state, POLL_INTERVAL)
    } else {
        Vec::new()
    }
}

fn apply_publish(state: &mut MonitorState, job_id: JobId, outcome: PublishOutcome) -> Vec<Effect> {
    if state.job_id() != Some(job_id) {
        monitor_info!("Ignoring publish result for run {}: view changed", job_id);
        return Vec::new();
    }

    let result = PublishResult::from(&outcome);
    monitor_info!("Publish of run {} finished: {:?}", job_id, result);
    let generation = state.publish.complete(result);
    state.mark_dirty();

    let mut effects = vec![Effect::ScheduleStatusClear {
        after: PUBLISH_STATUS_TTL,
        generation,
    }];
    match outcome {
        PublishOutcome::Posted { .. } => {
            effects.push(Effect::InvalidateJob { job_id });
            effects.extend(issue_fetch(state));
        }
        PublishOutcome::Rejected { .. } => {}
        PublishOutcome::Unauthorized => effects.extend(lose_auth(state)),
    }
    effects
}

/// Arms the poll timer unless one is already pending.
fn schedule_poll(state: &mut MonitorState, after: std::time::Duration) -> Vec<Effect> {
    if state.poll.timer_armed() {
        return Vec::new();
    }
    let generation = state.poll.arm();
    vec![Effect::SchedulePoll { after, generation }]
}

fn cancel_poll(state: &mut MonitorState) -> Vec<Effect> {
    if state.poll.disarm() {
        vec![Effect::CancelPoll]
    } else {
        Vec::new()
    }
}
