use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    ActionOutcome, Disposition, EndKind, GameKind, Minigame, PointsSource, Resolution, StepEvent,
};
use crate::config::GameConfig;
use crate::session::Session;

const COLS: usize = 5;
const ROWS: usize = 5;
const GEM_VALUES: [i64; 6] = [10, 20, 50, 100, 200, 500];
/// Idle steps before the remaining gems reshuffle (30 s at the default
/// 250 ms period).
const RESHUFFLE_AFTER_STEPS: u32 = 120;

/// 5×5 wall of valued gems behind a sweeping aim column. A shot collects
/// the bottom-most gem in the aimed column; a long idle spell reshuffles
/// the values still on the wall. Clearing the wall wins.
pub struct Gems {
    wall: [[Option<i64>; COLS]; ROWS],
    aim_col: usize,
    sweep_right: bool,
    idle_steps: u32,
    rng: StdRng,
}

impl Gems {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut wall = [[None; COLS]; ROWS];
        for row in wall.iter_mut() {
            for cell in row.iter_mut() {
                *cell = Some(GEM_VALUES[rng.gen_range(0..GEM_VALUES.len())]);
            }
        }
        Self {
            wall,
            aim_col: 0,
            sweep_right: true,
            idle_steps: 0,
            rng,
        }
    }

    pub fn aim_col(&self) -> usize {
        self.aim_col
    }

    fn remaining(&self) -> usize {
        self.wall
            .iter()
            .flatten()
            .filter(|c| c.is_some())
            .count()
    }

    fn reshuffle(&mut self) {
        for row in 0..ROWS {
            for col in 0..COLS {
                if self.wall[row][col].is_some() {
                    self.wall[row][col] =
                        Some(GEM_VALUES[self.rng.gen_range(0..GEM_VALUES.len())]);
                }
            }
        }
    }
}

impl Minigame for Gems {
    fn kind(&self) -> GameKind {
        GameKind::Gems
    }

    fn advance(&mut self) -> Vec<StepEvent> {
        if self.sweep_right {
            if self.aim_col + 1 == COLS {
                self.sweep_right = false;
                self.aim_col -= 1;
            } else {
                self.aim_col += 1;
            }
        } else if self.aim_col == 0 {
            self.sweep_right = true;
            self.aim_col += 1;
        } else {
            self.aim_col -= 1;
        }

        self.idle_steps += 1;
        if self.idle_steps >= RESHUFFLE_AFTER_STEPS {
            self.reshuffle();
            self.idle_steps = 0;
        }
        Vec::new()
    }

    fn resolve(&mut self) -> Resolution {
        self.idle_steps = 0;
        // Bottom-most gem in the aimed column.
        let hit = (0..ROWS)
            .rev()
            .find(|&row| self.wall[row][self.aim_col].is_some());
        match hit {
            Some(row) => {
                let value = self.wall[row][self.aim_col].take().unwrap_or(0);
                let disposition = if self.remaining() == 0 {
                    Disposition::End(EndKind::Win)
                } else {
                    Disposition::Continue
                };
                Resolution {
                    outcome: ActionOutcome::Success(PointsSource::Fixed(value)),
                    disposition,
                    pause: true,
                }
            }
            None => Resolution {
                outcome: ActionOutcome::Failure,
                disposition: Disposition::Continue,
                pause: true,
            },
        }
    }

    fn reset(&mut self) {
        for row in 0..ROWS {
            for col in 0..COLS {
                self.wall[row][col] =
                    Some(GEM_VALUES[self.rng.gen_range(0..GEM_VALUES.len())]);
            }
        }
        self.aim_col = 0;
        self.sweep_right = true;
        self.idle_steps = 0;
    }

    fn signal(&self, session: &Session, _config: &GameConfig) -> String {
        session.score.to_string()
    }

    fn board_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(ROWS + 1);
        for row in &self.wall {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Some(v) => format!("{v:>4}"),
                    None => "   .".to_string(),
                })
                .collect();
            lines.push(line);
        }
        let mut aim = String::new();
        for col in 0..COLS {
            aim.push_str(if col == self.aim_col { "   ^" } else { "    " });
        }
        lines.push(aim);
        lines
    }

    fn status_line(&self) -> String {
        format!("{} gems on the wall", self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_takes_the_bottom_most_gem_in_the_aimed_column() {
        let mut game = Gems::new(3);
        let col = game.aim_col();
        let expected = game.wall[ROWS - 1][col];
        let res = game.resolve();
        assert_eq!(
            res.outcome,
            ActionOutcome::Success(PointsSource::Fixed(expected.unwrap()))
        );
        assert_eq!(game.wall[ROWS - 1][col], None);
        assert_eq!(game.wall[ROWS - 2][col].is_some(), true);
    }

    #[test]
    fn emptied_column_yields_a_failure() {
        let mut game = Gems::new(3);
        for _ in 0..ROWS {
            let res = game.resolve();
            assert!(matches!(res.outcome, ActionOutcome::Success(_)));
        }
        let res = game.resolve();
        assert_eq!(res.outcome, ActionOutcome::Failure);
        assert_eq!(res.disposition, Disposition::Continue);
    }

    #[test]
    fn clearing_the_wall_wins() {
        let mut game = Gems::new(8);
        let mut last = None;
        for col in 0..COLS {
            game.aim_col = col;
            for _ in 0..ROWS {
                last = Some(game.resolve());
            }
        }
        assert_eq!(game.remaining(), 0);
        assert_eq!(
            last.map(|r| r.disposition),
            Some(Disposition::End(EndKind::Win))
        );
    }

    #[test]
    fn aim_sweeps_back_and_forth_across_the_wall() {
        let mut game = Gems::new(0);
        let mut seen = Vec::new();
        for _ in 0..(2 * COLS) {
            game.advance();
            seen.push(game.aim_col());
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 3, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn idle_spell_reshuffles_only_remaining_gems() {
        let mut game = Gems::new(5);
        let col = game.aim_col();
        game.resolve();
        for _ in 0..RESHUFFLE_AFTER_STEPS {
            game.advance();
        }
        // The collected cell stays empty through the reshuffle.
        assert_eq!(game.wall[ROWS - 1][col], None);
        assert_eq!(game.remaining(), ROWS * COLS - 1);
        assert_eq!(game.idle_steps, 0);
    }

    #[test]
    fn a_shot_resets_the_idle_countdown() {
        let mut game = Gems::new(5);
        for _ in 0..(RESHUFFLE_AFTER_STEPS - 1) {
            game.advance();
        }
        game.resolve();
        assert_eq!(game.idle_steps, 0);
    }
}
