use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    ActionOutcome, Disposition, EndKind, GameKind, Minigame, PointsSource, Resolution, StepEvent,
};
use crate::config::GameConfig;
use crate::session::Session;

/// 5 s at the 100 ms default period.
const COUNTDOWN_STEPS: u32 = 50;
/// 1 s of post-countdown invulnerability.
const BLINK_STEPS: u32 = 10;
const AIRBORNE_STEPS: u32 = 3;
const PASS_SCORE: i64 = 500;
const WIN_PASSES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Free play, collisions cost nothing.
    Practice,
    /// Transition into challenge mode; the world is frozen.
    Countdown(u32),
    Challenge,
}

/// Side-scrolling jumper. The first gated action leaves practice via a
/// countdown into challenge mode with a cleared score; from there jumps
/// are non-pausing actions, every obstacle passed is worth 500, and four
/// passes win. A collision while not blinking costs the life.
pub struct Runner {
    mode: Mode,
    next_obstacle_in: u32,
    airborne: u32,
    blink: u32,
    passes: u32,
    rng: StdRng,
}

impl Runner {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let first = rng.gen_range(8..=20);
        Self {
            mode: Mode::Practice,
            next_obstacle_in: first,
            airborne: 0,
            blink: 0,
            passes: 0,
            rng,
        }
    }

    pub fn in_challenge(&self) -> bool {
        self.mode == Mode::Challenge
    }

    fn reschedule_obstacle(&mut self) {
        self.next_obstacle_in = self.rng.gen_range(8..=20);
    }
}

impl Minigame for Runner {
    fn kind(&self) -> GameKind {
        GameKind::Runner
    }

    fn advance(&mut self) -> Vec<StepEvent> {
        let mut events = Vec::new();
        match self.mode {
            Mode::Countdown(n) => {
                if n <= 1 {
                    self.mode = Mode::Challenge;
                    self.blink = BLINK_STEPS;
                    self.passes = 0;
                    self.reschedule_obstacle();
                    events.push(StepEvent::ScoreCleared);
                } else {
                    self.mode = Mode::Countdown(n - 1);
                }
            }
            Mode::Practice => {
                self.next_obstacle_in -= 1;
                if self.next_obstacle_in == 0 {
                    if self.airborne > 0 {
                        events.push(StepEvent::Scored(PASS_SCORE));
                    }
                    self.reschedule_obstacle();
                }
            }
            Mode::Challenge => {
                self.next_obstacle_in -= 1;
                if self.next_obstacle_in == 0 {
                    if self.airborne > 0 {
                        self.passes += 1;
                        events.push(StepEvent::Scored(PASS_SCORE));
                        if self.passes >= WIN_PASSES {
                            events.push(StepEvent::Ended(EndKind::Win));
                        }
                    } else if self.blink == 0 {
                        self.blink = BLINK_STEPS;
                        events.push(StepEvent::LifeLost);
                    }
                    self.reschedule_obstacle();
                }
            }
        }
        self.airborne = self.airborne.saturating_sub(1);
        self.blink = self.blink.saturating_sub(1);
        events
    }

    fn resolve(&mut self) -> Resolution {
        match self.mode {
            Mode::Practice => {
                self.mode = Mode::Countdown(COUNTDOWN_STEPS);
            }
            Mode::Countdown(_) => {}
            Mode::Challenge => {
                self.airborne = AIRBORNE_STEPS;
            }
        }
        Resolution {
            outcome: ActionOutcome::Success(PointsSource::None),
            disposition: Disposition::Continue,
            pause: false,
        }
    }

    fn reset(&mut self) {
        self.mode = Mode::Practice;
        self.airborne = 0;
        self.blink = 0;
        self.passes = 0;
        self.reschedule_obstacle();
    }

    fn signal(&self, session: &Session, _config: &GameConfig) -> String {
        session.score.to_string()
    }

    fn board_lines(&self) -> Vec<String> {
        let width = 30usize;
        let runner_x = 2usize;
        let obstacle_x = (runner_x + self.next_obstacle_in as usize).min(width - 1);
        let track: String = (0..width)
            .map(|i| {
                if i == runner_x {
                    if self.airborne > 0 {
                        '^'
                    } else {
                        '&'
                    }
                } else if i == obstacle_x {
                    '#'
                } else {
                    '_'
                }
            })
            .collect();
        let mode = match self.mode {
            Mode::Practice => "practice".to_string(),
            Mode::Countdown(n) => format!("get ready: {}", n.div_ceil(10)),
            Mode::Challenge => format!("challenge, {} passes", self.passes),
        };
        vec![track, mode]
    }

    fn status_line(&self) -> String {
        match self.mode {
            Mode::Practice => "practice run".to_string(),
            Mode::Countdown(_) => "challenge starting".to_string(),
            Mode::Challenge => format!("{} of {} passes", self.passes, WIN_PASSES),
        }
    }
}
