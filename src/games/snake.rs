use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    ActionOutcome, Disposition, EndKind, GameKind, Minigame, PointsSource, Resolution, StepEvent,
};
use crate::config::GameConfig;
use crate::session::Session;

const GRID: i32 = 20;
const START_LEN: usize = 4;

/// Auto-seeking snake on a wrapped 20×20 grid, hunted with area burns. An
/// accepted action burns the 3×3 around the apple for exactly one world
/// step; catching the snake in it shortens it and speeds the clock. The
/// session ends when the snake would shrink below one segment. The signal
/// reports how many burns the run took.
pub struct Snake {
    body: Vec<(i32, i32)>,
    apple: (i32, i32),
    burn: Option<(i32, i32)>,
    rng: StdRng,
}

fn wrap(v: i32) -> i32 {
    v.rem_euclid(GRID)
}

/// Shortest signed distance on the wrapped axis.
fn wrap_delta(from: i32, to: i32) -> i32 {
    let d = (to - from).rem_euclid(GRID);
    if d > GRID / 2 {
        d - GRID
    } else {
        d
    }
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let body: Vec<_> = (0..START_LEN as i32).map(|i| (10 - i, 10)).collect();
        let apple = Self::free_cell(&mut rng, &body);
        Self {
            body,
            apple,
            burn: None,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    fn free_cell(rng: &mut StdRng, body: &[(i32, i32)]) -> (i32, i32) {
        loop {
            let cell = (rng.gen_range(0..GRID), rng.gen_range(0..GRID));
            if !body.contains(&cell) {
                return cell;
            }
        }
    }

    fn in_burn(&self, cell: (i32, i32), center: (i32, i32)) -> bool {
        wrap_delta(center.0, cell.0).abs() <= 1 && wrap_delta(center.1, cell.1).abs() <= 1
    }
}

impl Minigame for Snake {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn advance(&mut self) -> Vec<StepEvent> {
        let mut events = Vec::new();
        let head = match self.body.first() {
            Some(&h) => h,
            None => return events,
        };
        let dx = wrap_delta(head.0, self.apple.0);
        let dy = wrap_delta(head.1, self.apple.1);
        let new_head = if dx.abs() >= dy.abs() && dx != 0 {
            (wrap(head.0 + dx.signum()), head.1)
        } else if dy != 0 {
            (head.0, wrap(head.1 + dy.signum()))
        } else {
            (wrap(head.0 + 1), head.1)
        };

        self.body.insert(0, new_head);
        if new_head == self.apple {
            // Apple eaten: the snake grows and a new apple appears.
            self.apple = Self::free_cell(&mut self.rng, &self.body);
        } else {
            self.body.pop();
        }

        // The burn covers exactly this one step.
        if let Some(center) = self.burn.take() {
            if self.in_burn(new_head, center) {
                if self.body.len() <= 1 {
                    events.push(StepEvent::Ended(EndKind::Loss));
                } else {
                    self.body.pop();
                    events.push(StepEvent::Progressed);
                }
            }
        }
        events
    }

    fn resolve(&mut self) -> Resolution {
        self.burn = Some(self.apple);
        Resolution {
            outcome: ActionOutcome::Success(PointsSource::None),
            disposition: Disposition::Continue,
            pause: false,
        }
    }

    fn reset(&mut self) {
        self.body = (0..START_LEN as i32).map(|i| (10 - i, 10)).collect();
        self.apple = Self::free_cell(&mut self.rng, &self.body);
        self.burn = None;
    }

    fn signal(&self, session: &Session, _config: &GameConfig) -> String {
        session.attempts.to_string()
    }

    fn board_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(GRID as usize);
        for y in 0..GRID {
            let mut line = String::with_capacity(GRID as usize);
            for x in 0..GRID {
                let cell = (x, y);
                let ch = if self.body.first() == Some(&cell) {
                    '@'
                } else if self.body.contains(&cell) {
                    'o'
                } else if cell == self.apple {
                    '*'
                } else if self.burn.map_or(false, |c| self.in_burn(cell, c)) {
                    'x'
                } else {
                    '.'
                };
                line.push(ch);
            }
            lines.push(line);
        }
        lines
    }

    fn status_line(&self) -> String {
        format!("snake length {}", self.body.len())
    }
}
