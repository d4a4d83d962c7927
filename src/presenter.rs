use std::time::{Duration, Instant};

/// What the transient banner shows.
#[derive(Debug, Clone, PartialEq)]
pub enum BannerKind {
    /// A successful catch and its score delta.
    Success { delta: i64 },
    /// A missed/failed action.
    Failure,
    /// Terminal result: the emitted token and the final score.
    Prize { token: String, score: i64 },
}

/// What happens when the banner auto-dismisses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterBanner {
    /// Restart the round clock and keep playing.
    Resume,
    /// Full session reset.
    Reset,
}

/// Transient outcome presentation with a fixed wall-clock deadline. Never
/// blocks the state machine; the engine polls it and applies the
/// continuation once the deadline passes. Replacing a banner replaces its
/// deadline, so at most one continuation is ever pending.
#[derive(Debug, Clone)]
pub struct OutcomeBanner {
    pub kind: BannerKind,
    pub after: AfterBanner,
    deadline: Instant,
}

impl OutcomeBanner {
    pub fn new(kind: BannerKind, duration: Duration, after: AfterBanner, now: Instant) -> Self {
        Self {
            kind,
            after,
            deadline: now + duration,
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Time left before auto-dismissal, for countdown display.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}
