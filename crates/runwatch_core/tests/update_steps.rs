mod common;

use common::*;
use pretty_assertions::assert_eq;
use runwatch_core::{
    find_merge_output, ready_artifact, reconcile, step_label, update, ExpansionState, Msg,
};

fn labels(state: &runwatch_core::MonitorState) -> Vec<(String, bool)> {
    state
        .view()
        .steps
        .into_iter()
        .map(|step| (step.label, step.expanded))
        .collect()
}

#[test]
fn known_step_names_use_label_table() {
    assert_eq!(step_label("smc"), "Smart Money Concepts");
    assert_eq!(step_label("merge"), "Final Signal");
    assert_eq!(step_label("fibonacci"), "fibonacci");
}

#[test]
fn steps_default_to_collapsed() {
    let steps = vec![step("wyckoff", Some("range")), step("custom", None)];
    let views = reconcile(&steps, &ExpansionState::new());

    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|view| !view.expanded));
    assert_eq!(views[1].label, "custom");
    assert_eq!(views[1].output, None);
}

#[test]
fn toggling_twice_restores_display() {
    init_logging();
    let (state, seq) = open_authenticated();
    let (state, _) = deliver(state, seq, job("running", vec![step("wyckoff", Some("x"))]));
    let before = state.view().steps;

    let (state, _) = update(
        state,
        Msg::StepToggled {
            name: "wyckoff".to_string(),
        },
    );
    assert!(state.view().steps[0].expanded);
    let (state, _) = update(
        state,
        Msg::StepToggled {
            name: "wyckoff".to_string(),
        },
    );

    assert_eq!(state.view().steps, before);
}

#[test]
fn refresh_preserves_expansion_and_collapses_new_steps() {
    init_logging();
    let (state, seq) = open_authenticated();
    let (state, effects) = deliver(
        state,
        seq,
        job("running", vec![step("wyckoff", None), step("smc", None)]),
    );
    let (state, _) = update(
        state,
        Msg::StepToggled {
            name: "smc".to_string(),
        },
    );

    let (state, seq) = fire_poll(state, &effects);
    let (state, _) = deliver(
        state,
        seq,
        job(
            "running",
            vec![
                step("wyckoff", Some("markup")),
                step("smc", Some("bos")),
                step("vsa", None),
            ],
        ),
    );

    assert_eq!(
        labels(&state),
        vec![
            ("Wyckoff".to_string(), false),
            ("Smart Money Concepts".to_string(), true),
            ("Volume Spread Analysis".to_string(), false),
        ]
    );
}

#[test]
fn expansion_follows_step_name_when_backend_reorders() {
    init_logging();
    let (state, seq) = open_authenticated();
    let (state, effects) = deliver(
        state,
        seq,
        job("running", vec![step("wyckoff", None), step("smc", None)]),
    );
    let (state, _) = update(
        state,
        Msg::StepToggled {
            name: "wyckoff".to_string(),
        },
    );

    let (state, seq) = fire_poll(state, &effects);
    let (state, _) = deliver(
        state,
        seq,
        job("running", vec![step("smc", None), step("wyckoff", None)]),
    );

    assert_eq!(
        labels(&state),
        vec![
            ("Smart Money Concepts".to_string(), false),
            ("Wyckoff".to_string(), true),
        ]
    );
}

#[test]
fn expansion_resets_when_view_reopens() {
    init_logging();
    let (state, seq) = open_authenticated();
    let (state, _) = deliver(state, seq, job("succeeded", vec![step("merge", Some("BUY"))]));
    let (state, _) = update(
        state,
        Msg::StepToggled {
            name: "merge".to_string(),
        },
    );
    assert_eq!(state.expansion().len(), 1);

    let (state, _) = update(state, Msg::ViewClosed);
    let (state, _) = update(state, Msg::ViewOpened { job_id: JOB_ID });
    assert!(state.expansion().is_empty());
}

#[test]
fn merge_output_is_not_final_until_succeeded() {
    let running = job("running", vec![step("wyckoff", Some("a")), step("merge", Some("BUY"))]);
    assert_eq!(find_merge_output(&running.steps), Some("BUY"));
    assert_eq!(ready_artifact(&running), None);

    let succeeded = job("succeeded", running.steps.clone());
    assert_eq!(ready_artifact(&succeeded), Some("BUY"));

    let failed = job("failed", running.steps);
    assert_eq!(ready_artifact(&failed), None);
}

#[test]
fn blank_or_missing_merge_output_is_not_an_artifact() {
    assert_eq!(ready_artifact(&job("succeeded", vec![step("merge", Some("  "))])), None);
    assert_eq!(ready_artifact(&job("succeeded", vec![step("merge", None)])), None);
    assert_eq!(ready_artifact(&job("succeeded", vec![step("ict", Some("x"))])), None);
}
