use std::collections::HashMap;

use runwatch_core::{Job, JobId};

/// Last accepted snapshot per job, used to paint a reopened view before the
/// live fetch returns. Owned by the runtime task, so no locking.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    entries: HashMap<JobId, Job>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, job_id: JobId) -> Option<&Job> {
        self.entries.get(&job_id)
    }

    pub fn store(&mut self, job: &Job) {
        self.entries.insert(job.id, job.clone());
    }

    /// Evicts the entry; returns whether one existed.
    pub fn invalidate(&mut self, job_id: JobId) -> bool {
        self.entries.remove(&job_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
