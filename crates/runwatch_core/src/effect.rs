use std::time::Duration;

use crate::{JobId, RequestSeq};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the auth collaborator whether the session is valid.
    CheckSession,
    /// Fetch the job; the result must come back tagged with `seq`.
    FetchJob { job_id: JobId, seq: RequestSeq },
    /// Arm the poll timer; it fires `Msg::PollTimerFired { generation }`.
    SchedulePoll { after: Duration, generation: u64 },
    CancelPoll,
    /// Send the one-shot publish request.
    Publish { job_id: JobId },
    /// Drop any cached snapshot of the job so the next read hits the backend.
    InvalidateJob { job_id: JobId },
    /// Arm the publish status expiry.
    ScheduleStatusClear { after: Duration, generation: u64 },
    CancelStatusClear,
    RedirectToLogin,
}
