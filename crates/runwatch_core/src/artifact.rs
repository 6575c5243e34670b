use crate::{Job, JobStatus, Step};

/// Name of the aggregation step whose output is the run's final artifact.
pub const MERGE_STEP: &str = "merge";

/// Output of the merge step, if it has produced non-blank text.
pub fn find_merge_output(steps: &[Step]) -> Option<&str> {
    steps
        .iter()
        .find(|step| step.step_name == MERGE_STEP)
        .and_then(Step::output)
}

/// The final artifact, available only once the job has succeeded. A merge
/// output seen under any other status is treated as partial.
pub fn ready_artifact(job: &Job) -> Option<&str> {
    if job.status != JobStatus::Succeeded {
        return None;
    }
    find_merge_output(&job.steps)
}
