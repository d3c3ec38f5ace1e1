//! Busy polling
//!
//! Erase and program operations leave the chip busy for a while. The driver
//! reads the status register until the chip reports ready or the read budget
//! runs out. [`BusyPoll`] holds the bookkeeping so every driver times out the
//! same way.

use super::FlashStatus;

/// Default number of status reads before giving up
pub const DEFAULT_MAX_POLLS: u32 = 0x0100_0000;

/// Budget for one busy wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollLimit {
    /// Maximum number of status reads (at least one read is always done)
    pub max_polls: u32,
    /// Delay between reads in microseconds; 0 polls back to back
    pub interval_us: u32,
}

impl Default for PollLimit {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
            interval_us: 0,
        }
    }
}

/// State of a busy wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Still waiting; `remaining` status reads are left in the budget
    Polling {
        /// Reads left, including the next one
        remaining: u32,
    },
    /// The chip reported ready
    Ready,
    /// The budget ran out while the chip was busy
    TimedOut,
}

/// Busy wait state machine, fed one status read at a time
#[derive(Debug, Clone)]
pub struct BusyPoll {
    state: PollState,
}

impl BusyPoll {
    /// Start a wait with the given budget
    pub fn new(limit: PollLimit) -> Self {
        Self {
            state: PollState::Polling {
                remaining: limit.max_polls.max(1),
            },
        }
    }

    /// Current state
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Whether the wait has finished, either way
    pub fn is_done(&self) -> bool {
        !matches!(self.state, PollState::Polling { .. })
    }

    /// Account for one status read
    ///
    /// Terminal states ignore further reads.
    pub fn observe(&mut self, status: FlashStatus) -> PollState {
        if let PollState::Polling { remaining } = self.state {
            self.state = match status {
                FlashStatus::Ready => PollState::Ready,
                FlashStatus::Busy if remaining <= 1 => PollState::TimedOut,
                FlashStatus::Busy => PollState::Polling {
                    remaining: remaining - 1,
                },
            };
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(max_polls: u32) -> PollLimit {
        PollLimit {
            max_polls,
            interval_us: 0,
        }
    }

    #[test]
    fn test_ready_first_read() {
        let mut poll = BusyPoll::new(limit(3));
        assert_eq!(poll.observe(FlashStatus::Ready), PollState::Ready);
        assert!(poll.is_done());
    }

    #[test]
    fn test_timeout_after_budget() {
        let mut poll = BusyPoll::new(limit(3));
        assert_eq!(
            poll.observe(FlashStatus::Busy),
            PollState::Polling { remaining: 2 }
        );
        assert_eq!(
            poll.observe(FlashStatus::Busy),
            PollState::Polling { remaining: 1 }
        );
        assert_eq!(poll.observe(FlashStatus::Busy), PollState::TimedOut);
        // Terminal
        assert_eq!(poll.observe(FlashStatus::Ready), PollState::TimedOut);
    }

    #[test]
    fn test_ready_on_last_read() {
        let mut poll = BusyPoll::new(limit(2));
        poll.observe(FlashStatus::Busy);
        assert_eq!(poll.observe(FlashStatus::Ready), PollState::Ready);
        assert_eq!(poll.observe(FlashStatus::Busy), PollState::Ready);
    }

    #[test]
    fn test_zero_budget_still_reads_once() {
        let mut poll = BusyPoll::new(limit(0));
        assert_eq!(poll.state(), PollState::Polling { remaining: 1 });
        assert_eq!(poll.observe(FlashStatus::Busy), PollState::TimedOut);

        let mut poll = BusyPoll::new(limit(0));
        assert_eq!(poll.observe(FlashStatus::Ready), PollState::Ready);
    }

    #[test]
    fn test_default_limit() {
        let limit = PollLimit::default();
        assert_eq!(limit.max_polls, 0x0100_0000);
        assert_eq!(limit.interval_us, 0);
    }
}
