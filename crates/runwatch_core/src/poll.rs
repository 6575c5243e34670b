/// Monotonic tag attached to every job fetch.
pub type RequestSeq = u64;

/// Consecutive transport failures tolerated before polling gives up and the
/// error is shown as persistent.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Bookkeeping for issued fetches and the single poll timer.
///
/// `next_seq` is never rewound, so a response that belongs to an earlier
/// view can never pass `accepts` for a later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PollTracker {
    next_seq: RequestSeq,
    first_seq: RequestSeq,
    applied_seq: Option<RequestSeq>,
    timer_generation: u64,
    timer_armed: bool,
    consecutive_failures: u32,
}

impl Default for PollTracker {
    fn default() -> Self {
        Self {
            next_seq: 1,
            first_seq: 1,
            applied_seq: None,
            timer_generation: 0,
            timer_armed: false,
            consecutive_failures: 0,
        }
    }
}

impl PollTracker {
    /// Starts a new view lifecycle: earlier requests become unacceptable.
    pub(crate) fn begin_view(&mut self) {
        self.first_seq = self.next_seq;
        self.applied_seq = None;
        self.consecutive_failures = 0;
        self.disarm();
    }

    pub(crate) fn issue(&mut self) -> RequestSeq {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// True when a response tagged `seq` is newer than everything applied so
    /// far in the current view.
    pub(crate) fn accepts(&self, seq: RequestSeq) -> bool {
        if seq < self.first_seq || seq >= self.next_seq {
            return false;
        }
        self.applied_seq.is_none_or(|applied| seq > applied)
    }

    pub(crate) fn applied_seq(&self) -> Option<RequestSeq> {
        self.applied_seq
    }

    pub(crate) fn mark_applied(&mut self, seq: RequestSeq) {
        self.applied_seq = Some(seq);
        self.consecutive_failures = 0;
    }

    /// Records a definitive non-snapshot answer (not found) so that older
    /// responses still in flight cannot override it.
    pub(crate) fn mark_seen(&mut self, seq: RequestSeq) {
        self.applied_seq = Some(seq);
    }

    /// Counts a transport failure and returns the running total.
    pub(crate) fn record_failure(&mut self) -> u32 {
        self.consecutive_failures += 1;
        self.consecutive_failures
    }

    pub(crate) fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Arms the poll timer and returns the generation it must fire with.
    pub(crate) fn arm(&mut self) -> u64 {
        self.timer_generation += 1;
        self.timer_armed = true;
        self.timer_generation
    }

    /// Consumes a timer firing; stale generations are rejected.
    pub(crate) fn fire(&mut self, generation: u64) -> bool {
        if !self.timer_armed || generation != self.timer_generation {
            return false;
        }
        self.timer_armed = false;
        true
    }

    /// Disarms the timer; returns whether one was armed.
    pub(crate) fn disarm(&mut self) -> bool {
        let was_armed = self.timer_armed;
        self.timer_generation += 1;
        self.timer_armed = false;
        was_armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_response_is_rejected_after_newer_applied() {
        let mut tracker = PollTracker::default();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(tracker.accepts(second));
        tracker.mark_applied(second);
        assert!(!tracker.accepts(first));
    }

    #[test]
    fn requests_from_previous_view_are_rejected() {
        let mut tracker = PollTracker::default();
        let old = tracker.issue();
        tracker.begin_view();
        let fresh = tracker.issue();

        assert!(!tracker.accepts(old));
        assert!(tracker.accepts(fresh));
    }

    #[test]
    fn stale_timer_generation_does_not_fire() {
        let mut tracker = PollTracker::default();
        let generation = tracker.arm();
        tracker.disarm();
        assert!(!tracker.fire(generation));

        let generation = tracker.arm();
        assert!(tracker.fire(generation));
        assert!(!tracker.fire(generation));
    }
}
