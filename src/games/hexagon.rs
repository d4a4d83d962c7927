use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    ActionOutcome, Disposition, EndKind, GameKind, Minigame, PointsSource, Resolution, StepEvent,
};
use crate::config::GameConfig;
use crate::session::Session;

const EDGE_SCORES: [i64; 6] = [100, 50, 2000, 1000, 500, 200];
/// Distance from tee to cup in travel units.
const CUP_DISTANCE: i32 = 60;
const BASE_KICK: i32 = 10;

/// A hexagonal puck kicked toward a cup. Each gated kick adds travel (more
/// when the swinging aim is centered) and spins the puck; reaching the cup
/// settles it on one of six scored edges and ends the session.
pub struct Hexagon {
    aim: i32,
    aim_rising: bool,
    travel_remaining: i32,
    edge: usize,
    settled: Option<i64>,
    rng: StdRng,
}

impl Hexagon {
    pub fn new(seed: u64) -> Self {
        Self {
            aim: 0,
            aim_rising: true,
            travel_remaining: CUP_DISTANCE,
            edge: 0,
            settled: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn settled_score(&self) -> Option<i64> {
        self.settled
    }

    fn kick_power(&self) -> i32 {
        // Strongest dead-center, weakest at either end of the swing.
        BASE_KICK + (50 - (self.aim - 50).abs()) / 2
    }
}

impl Minigame for Hexagon {
    fn kind(&self) -> GameKind {
        GameKind::Hexagon
    }

    fn advance(&mut self) -> Vec<StepEvent> {
        const SWING_STEP: i32 = 5;
        if self.aim_rising {
            self.aim += SWING_STEP;
            if self.aim >= 100 {
                self.aim = 100;
                self.aim_rising = false;
            }
        } else {
            self.aim -= SWING_STEP;
            if self.aim <= 0 {
                self.aim = 0;
                self.aim_rising = true;
            }
        }
        Vec::new()
    }

    fn resolve(&mut self) -> Resolution {
        if self.settled.is_some() {
            // Already in the cup; kicks change nothing.
            return Resolution {
                outcome: ActionOutcome::Success(PointsSource::None),
                disposition: Disposition::Continue,
                pause: false,
            };
        }
        self.travel_remaining -= self.kick_power();
        self.edge = (self.edge + self.rng.gen_range(1..6)) % 6;
        if self.travel_remaining <= 0 {
            let score = EDGE_SCORES[self.edge];
            self.settled = Some(score);
            Resolution {
                outcome: ActionOutcome::Success(PointsSource::Fixed(score)),
                disposition: Disposition::End(EndKind::Win),
                pause: true,
            }
        } else {
            Resolution {
                outcome: ActionOutcome::Success(PointsSource::None),
                disposition: Disposition::Continue,
                pause: false,
            }
        }
    }

    fn reset(&mut self) {
        self.aim = 0;
        self.aim_rising = true;
        self.travel_remaining = CUP_DISTANCE;
        self.edge = 0;
        self.settled = None;
    }

    fn signal(&self, session: &Session, _config: &GameConfig) -> String {
        session.score.to_string()
    }

    fn board_lines(&self) -> Vec<String> {
        let lane_cells = 20usize;
        let travelled = (CUP_DISTANCE - self.travel_remaining).max(0) as usize;
        let pos = (travelled * (lane_cells - 1) / CUP_DISTANCE as usize).min(lane_cells - 1);
        let lane: String = (0..lane_cells)
            .map(|i| if i == pos { "⬡" } else { "_" })
            .collect();
        let aim_cells = 21usize;
        let aim_pos = (self.aim as usize * (aim_cells - 1)) / 100;
        let swing: String = (0..aim_cells)
            .map(|i| if i == aim_pos { "|" } else { "-" })
            .collect();
        vec![format!("{lane}(cup)"), swing]
    }

    fn status_line(&self) -> String {
        match self.settled {
            Some(score) => format!("settled for {score}"),
            None => format!("edge {} up, {} to the cup", self.edge + 1, self.travel_remaining),
        }
    }
}
