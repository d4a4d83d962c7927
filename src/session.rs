use chrono::{DateTime, Local};

/// Where a play-through currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, world not yet running.
    Idle,
    /// Clock running, gated actions accepted.
    Active,
    /// Clock stopped while an outcome banner plays; no actions accepted.
    ResolvingOutcome,
    /// Win/loss reached; signal emitted, reset pending.
    Terminal,
}

/// Live state of one play-through. Owned exclusively by the engine; every
/// other component only reads it.
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: Phase,
    pub score: i64,
    /// Count of table-scored successes ("level" progress).
    pub progress: u32,
    pub lives: u32,
    /// Count of accepted gated actions this session.
    pub attempts: u32,
    pub started_at: Option<DateTime<Local>>,
}

impl Session {
    pub fn new(lives: u32) -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            progress: 0,
            lives,
            attempts: 0,
            started_at: None,
        }
    }

    /// 1-based level used for clock retuning: `progress + 1`.
    pub fn level(&self) -> u32 {
        self.progress + 1
    }
}
