use super::{
    ActionOutcome, Disposition, EndKind, GameKind, Minigame, PointsSource, Resolution, StepEvent,
};
use crate::config::GameConfig;
use crate::score::select_tier;
use crate::session::Session;

const RING_SLOTS: usize = 12;
/// Slot the hook hangs over; a pull only lands when a fish sits here.
const HOOK_SLOT: usize = 9;

/// Ring of fish rotating one slot per world step. A pull over an occupied
/// hook slot catches (table score, slot emptied); over an empty slot it is
/// an immediate loss. Clearing the whole ring wins.
pub struct Fishing {
    occupied: [bool; RING_SLOTS],
    offset: usize,
}

impl Fishing {
    pub fn new() -> Self {
        Self {
            occupied: [true; RING_SLOTS],
            offset: 0,
        }
    }

    fn hooked_index(&self) -> usize {
        (HOOK_SLOT + self.offset) % RING_SLOTS
    }

    fn remaining(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }
}

impl Default for Fishing {
    fn default() -> Self {
        Self::new()
    }
}

impl Minigame for Fishing {
    fn kind(&self) -> GameKind {
        GameKind::Fishing
    }

    fn advance(&mut self) -> Vec<StepEvent> {
        self.offset = (self.offset + 1) % RING_SLOTS;
        Vec::new()
    }

    fn resolve(&mut self) -> Resolution {
        let idx = self.hooked_index();
        if self.occupied[idx] {
            self.occupied[idx] = false;
            let disposition = if self.remaining() == 0 {
                Disposition::End(EndKind::Win)
            } else {
                Disposition::Continue
            };
            Resolution {
                outcome: ActionOutcome::Success(PointsSource::Table),
                disposition,
                pause: true,
            }
        } else {
            Resolution {
                outcome: ActionOutcome::Failure,
                disposition: Disposition::End(EndKind::Loss),
                pause: true,
            }
        }
    }

    fn reset(&mut self) {
        self.occupied = [true; RING_SLOTS];
        self.offset = 0;
    }

    fn signal(&self, session: &Session, config: &GameConfig) -> String {
        let tier = select_tier(&config.prize_thresholds, session.progress);
        config.token_for_tier(tier).to_string()
    }

    fn board_lines(&self) -> Vec<String> {
        let pond: String = (0..RING_SLOTS)
            .map(|i| {
                if self.occupied[(i + self.offset) % RING_SLOTS] {
                    " ><> "
                } else {
                    "  ~  "
                }
            })
            .collect();
        let mut marker = String::new();
        for i in 0..RING_SLOTS {
            marker.push_str(if i == HOOK_SLOT { "  J  " } else { "     " });
        }
        vec![pond, marker]
    }

    fn status_line(&self) -> String {
        format!("{} fish left", self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::session::Session;

    #[test]
    fn pull_over_occupied_slot_catches_and_empties_it() {
        let mut game = Fishing::new();
        let res = game.resolve();
        assert_eq!(
            res.outcome,
            ActionOutcome::Success(PointsSource::Table)
        );
        assert_eq!(res.disposition, Disposition::Continue);
        assert!(res.pause);
        assert_eq!(game.remaining(), RING_SLOTS - 1);
    }

    #[test]
    fn pull_over_emptied_slot_loses_immediately() {
        let mut game = Fishing::new();
        game.resolve();
        // Same fish is still over the hook until the ring rotates.
        let res = game.resolve();
        assert_eq!(res.outcome, ActionOutcome::Failure);
        assert_eq!(res.disposition, Disposition::End(EndKind::Loss));
    }

    #[test]
    fn rotation_brings_a_fresh_fish_over_the_hook() {
        let mut game = Fishing::new();
        game.resolve();
        game.advance();
        let res = game.resolve();
        assert_eq!(
            res.outcome,
            ActionOutcome::Success(PointsSource::Table)
        );
    }

    #[test]
    fn clearing_the_ring_wins() {
        let mut game = Fishing::new();
        let mut last = game.resolve();
        for _ in 1..RING_SLOTS {
            game.advance();
            last = game.resolve();
        }
        assert_eq!(last.disposition, Disposition::End(EndKind::Win));
        assert_eq!(game.remaining(), 0);
    }

    #[test]
    fn signal_is_the_configured_tier_token() {
        let game = Fishing::new();
        let config = GameConfig::default();
        let mut session = Session::new(1);

        session.progress = 4;
        assert_eq!(game.signal(&session, &config), "no-prize");
        session.progress = 10;
        assert_eq!(game.signal(&session, &config), "second-prize");
        session.progress = 11;
        assert_eq!(game.signal(&session, &config), "first-prize");
    }

    #[test]
    fn reset_restores_a_full_ring() {
        let mut game = Fishing::new();
        game.resolve();
        game.advance();
        game.reset();
        assert_eq!(game.remaining(), RING_SLOTS);
        assert_eq!(game.hooked_index(), HOOK_SLOT);
    }
}
