use clap::ValueEnum;
use strum_macros::Display;

use crate::config::GameConfig;
use crate::session::Session;

mod claw;
mod fishing;
mod gems;
mod hexagon;
mod runner;
mod snake;

pub use claw::Claw;
pub use fishing::Fishing;
pub use gems::Gems;
pub use hexagon::Hexagon;
pub use runner::Runner;
pub use snake::Snake;

/// The six cabinets on the midway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
pub enum GameKind {
    Fishing,
    Claw,
    Gems,
    Hexagon,
    Snake,
    Runner,
}

/// Where the points for a successful action come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsSource {
    /// Next entry of the configured score table; advances progress.
    Table,
    /// A game-computed amount; progress untouched.
    Fixed(i64),
    /// No points at all (non-scoring actions like jumps and burns).
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success(PointsSource),
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndKind {
    Win,
    Loss,
}

/// What the session does after an action has been scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    LoseLife,
    End(EndKind),
}

/// Verdict of one accepted gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: ActionOutcome,
    pub disposition: Disposition,
    /// When false the world keeps running and no banner is shown.
    pub pause: bool,
}

/// Side effects of one world step, applied by the engine in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Scored(i64),
    /// Progress counter up by one; the clock retunes.
    Progressed,
    LifeLost,
    /// Score and progress back to zero (runner practice → challenge).
    ScoreCleared,
    Ended(EndKind),
}

/// One cabinet's world. The engine owns the clock, gate, session, and
/// scoring; a game only steps its world and judges accepted actions.
pub trait Minigame {
    fn kind(&self) -> GameKind;

    /// Advances the world by exactly one clock step.
    fn advance(&mut self) -> Vec<StepEvent>;

    /// Judges one accepted gated action against the current world state.
    fn resolve(&mut self) -> Resolution;

    /// Back to the initial world, keeping the seeded RNG stream.
    fn reset(&mut self);

    /// Terminal signal token for this session.
    fn signal(&self, session: &Session, config: &GameConfig) -> String;

    /// Coarse board rows for the TUI.
    fn board_lines(&self) -> Vec<String>;

    fn status_line(&self) -> String;
}

pub fn build(kind: GameKind, seed: u64) -> Box<dyn Minigame> {
    match kind {
        GameKind::Fishing => Box::new(Fishing::new()),
        GameKind::Claw => Box::new(Claw::new(seed)),
        GameKind::Gems => Box::new(Gems::new(seed)),
        GameKind::Hexagon => Box::new(Hexagon::new(seed)),
        GameKind::Snake => Box::new(Snake::new(seed)),
        GameKind::Runner => Box::new(Runner::new(seed)),
    }
}
