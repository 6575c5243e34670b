//! Plain-text rendering of the monitor view model.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDateTime, Utc};
use runwatch_core::{AuthState, JobHeaderView, JobSummary, MonitorViewModel, PublishPhase, StepView};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Backend timestamps come either with an offset or as naive UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(parsed) => parsed.format(TIMESTAMP_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// `"3m 05s"` between two backend timestamps.
pub fn format_duration(started: &str, finished: &str) -> Option<String> {
    let started = parse_timestamp(started)?;
    let finished = parse_timestamp(finished)?;
    let seconds = (finished - started).num_seconds();
    if seconds < 0 {
        return None;
    }
    Some(if seconds >= 60 {
        format!("{}m {:02}s", seconds / 60, seconds % 60)
    } else {
        format!("{seconds}s")
    })
}

pub fn render_view(view: &MonitorViewModel) -> String {
    let mut out = String::new();

    match view.auth {
        AuthState::Unauthenticated => {
            out.push_str("Not signed in. Log in to the dashboard and export RUNWATCH_SESSION_COOKIE.\n");
            return out;
        }
        AuthState::Unknown if view.job_id.is_some() => {
            out.push_str("Checking session...\n");
            return out;
        }
        _ => {}
    }

    if view.loading {
        if let Some(job_id) = view.job_id {
            let _ = writeln!(out, "Loading run #{job_id}...");
        }
    }

    if let Some(header) = &view.header {
        render_header(&mut out, header, view.stale);
    }

    if let Some(error) = &view.error {
        let suffix = if error.persistent { "" } else { " (retrying)" };
        let _ = writeln!(out, "! {}{}", error.message, suffix);
    }

    if !view.steps.is_empty() {
        out.push_str("\nSteps:\n");
        for step in &view.steps {
            render_step(&mut out, step);
        }
    }

    if let Some(artifact) = &view.artifact {
        out.push_str("\nFinal signal:\n");
        for line in artifact.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    match view.publish_phase {
        PublishPhase::AwaitingConfirmation => out.push_str("\nPublish this run? Waiting for confirmation.\n"),
        PublishPhase::InFlight => out.push_str("\nPublishing...\n"),
        PublishPhase::Idle => {}
    }
    if let Some(result) = &view.publish_result {
        let marker = if result.is_success() { "+" } else { "!" };
        let _ = writeln!(out, "\n{marker} {}", result.message());
    }

    out
}

fn render_header(out: &mut String, header: &JobHeaderView, stale: bool) {
    let _ = write!(
        out,
        "Run #{} {} {} [{}]",
        header.id, header.instrument, header.timeframe, header.status
    );
    if stale {
        out.push_str(" (cached)");
    }
    if header.published {
        out.push_str(" (published)");
    }
    out.push('\n');

    let _ = write!(
        out,
        "  {} trigger, started {}",
        header.trigger_type,
        format_timestamp(&header.created_at)
    );
    if let Some(finished_at) = &header.finished_at {
        let _ = write!(out, ", finished {}", format_timestamp(finished_at));
        if let Some(took) = format_duration(&header.created_at, finished_at) {
            let _ = write!(out, " ({took})");
        }
    }
    let _ = writeln!(out, ", cost ${:.4}", header.cost_est_total);
}

fn render_step(out: &mut String, step: &StepView) {
    let model = step.llm_model.as_deref().unwrap_or("-");
    let _ = writeln!(
        out,
        "  {} {:<24} {:<28} {:>7} tok  ${:.4}",
        if step.expanded { "v" } else { ">" },
        step.label,
        model,
        step.tokens_used,
        step.cost_est
    );
    if step.expanded {
        match &step.output {
            Some(output) => {
                for line in output.lines() {
                    let _ = writeln!(out, "      {line}");
                }
            }
            None => out.push_str("      (no output yet)\n"),
        }
    }
}

pub fn render_runs(runs: &[JobSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6}  {:<10}  {:<10}  {:<4}  {:<19}  {:>9}",
        "ID", "STATUS", "INSTRUMENT", "TF", "CREATED", "COST"
    );
    out.push_str(&"-".repeat(68));
    out.push('\n');
    for run in runs {
        let _ = writeln!(
            out,
            "{:<6}  {:<10}  {:<10}  {:<4}  {:<19}  {:>9}",
            run.id,
            run.status.as_str(),
            run.instrument,
            run.timeframe,
            format_timestamp(&run.created_at),
            format!("${:.4}", run.cost_est_total)
        );
    }
    if runs.is_empty() {
        out.push_str("(no runs)\n");
    }
    out
}
