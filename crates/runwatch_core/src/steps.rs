use std::collections::BTreeSet;

use crate::{Step, StepView};

/// Display labels for the pipeline's known step names. Names missing here
/// are shown verbatim.
pub const STEP_LABELS: &[(&str, &str)] = &[
    ("wyckoff", "Wyckoff"),
    ("smc", "Smart Money Concepts"),
    ("vsa", "Volume Spread Analysis"),
    ("delta", "Order Flow Delta"),
    ("ict", "ICT Concepts"),
    ("merge", "Final Signal"),
];

pub fn step_label(name: &str) -> &str {
    STEP_LABELS
        .iter()
        .find_map(|(key, label)| (*key == name).then_some(*label))
        .unwrap_or(name)
}

/// Step names the user has expanded. Keyed by name so that a backend
/// reordering steps cannot move expansion onto a different step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership; returns the new expansion flag.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.expanded.remove(name) {
            false
        } else {
            self.expanded.insert(name.to_string());
            true
        }
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.contains(name)
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// Pairs each step, in backend order, with its label and expansion flag.
pub fn reconcile(steps: &[Step], expansion: &ExpansionState) -> Vec<StepView> {
    steps
        .iter()
        .map(|step| StepView {
            name: step.step_name.clone(),
            label: step_label(&step.step_name).to_string(),
            expanded: expansion.is_expanded(&step.step_name),
            output: step.output().map(ToOwned::to_owned),
            llm_model: step.llm_model.clone(),
            tokens_used: step.tokens_used,
            cost_est: step.cost_est,
        })
        .collect()
}
