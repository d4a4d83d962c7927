use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    ActionOutcome, Disposition, EndKind, GameKind, Minigame, PointsSource, Resolution, StepEvent,
};
use crate::config::GameConfig;
use crate::session::Session;

const BIN_BALLS: u32 = 50;
const MAX_GRAB: u32 = 3;

/// Bin of balls worked down by repeated claw drops. Each accepted drop
/// grabs 0–3 balls; the score is the running balls-out count and the bin
/// emptying wins. The long cooldown is the descent time.
pub struct Claw {
    remaining: u32,
    last_grab: u32,
    rng: StdRng,
}

impl Claw {
    pub fn new(seed: u64) -> Self {
        Self {
            remaining: BIN_BALLS,
            last_grab: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Minigame for Claw {
    fn kind(&self) -> GameKind {
        GameKind::Claw
    }

    fn advance(&mut self) -> Vec<StepEvent> {
        Vec::new()
    }

    fn resolve(&mut self) -> Resolution {
        let grabbed = self.rng.gen_range(0..=MAX_GRAB).min(self.remaining);
        self.remaining -= grabbed;
        self.last_grab = grabbed;
        if grabbed == 0 {
            return Resolution {
                outcome: ActionOutcome::Failure,
                disposition: Disposition::Continue,
                pause: true,
            };
        }
        let disposition = if self.remaining == 0 {
            Disposition::End(EndKind::Win)
        } else {
            Disposition::Continue
        };
        Resolution {
            outcome: ActionOutcome::Success(PointsSource::Fixed(grabbed as i64)),
            disposition,
            pause: true,
        }
    }

    fn reset(&mut self) {
        self.remaining = BIN_BALLS;
        self.last_grab = 0;
    }

    fn signal(&self, session: &Session, _config: &GameConfig) -> String {
        session.score.to_string()
    }

    fn board_lines(&self) -> Vec<String> {
        // Ten balls per row, drained top-down.
        let mut lines = Vec::with_capacity(5);
        for row in 0..5u32 {
            let filled_above = (BIN_BALLS - self.remaining).saturating_sub(row * 10);
            let taken = filled_above.min(10);
            let line: String = (0..10)
                .map(|i| if (i as u32) < 10 - taken { " o " } else { " . " })
                .collect();
            lines.push(line);
        }
        lines
    }

    fn status_line(&self) -> String {
        format!("{} balls in the bin, last grab {}", self.remaining, self.last_grab)
    }
}
