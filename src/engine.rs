use std::time::{Duration, Instant};

use chrono::Local;

use crate::clock::RoundClock;
use crate::config::GameConfig;
use crate::games::{
    self, ActionOutcome, Disposition, EndKind, GameKind, Minigame, PointsSource, StepEvent,
};
use crate::gate::{CooldownGate, GateDecision, LevelTrigger};
use crate::presenter::{AfterBanner, BannerKind, OutcomeBanner};
use crate::score::ScoreTable;
use crate::session::{Phase, Session};
use crate::signal::SignalSink;

/// The session state machine. Owns the world, the clock, the gate, and the
/// session record; the TUI only feeds it raw events and timestamps and reads
/// state back out.
pub struct Engine {
    game: Box<dyn Minigame>,
    session: Session,
    clock: RoundClock,
    gate: CooldownGate,
    level_trigger: LevelTrigger,
    banner: Option<OutcomeBanner>,
    sink: Box<dyn SignalSink>,
    config: GameConfig,
    table: ScoreTable,
    last_signal: Option<String>,
    last_end: Option<EndKind>,
    signaled: bool,
    resets: u32,
}

impl Engine {
    pub fn new(kind: GameKind, config: GameConfig, sink: Box<dyn SignalSink>, seed: u64) -> Self {
        let clock = RoundClock::new(
            Duration::from_millis(config.base_period_ms),
            Duration::from_millis(config.min_period_ms),
            config.acceleration_factor,
        );
        let gate = CooldownGate::new(Duration::from_millis(config.throttle_ms));
        let level_trigger = LevelTrigger::new(config.audio_threshold);
        let table = ScoreTable::new(&config.score_values);
        let session = Session::new(config.lives);
        Self {
            game: games::build(kind, seed),
            session,
            clock,
            gate,
            level_trigger,
            banner: None,
            sink,
            config,
            table,
            last_signal: None,
            last_end: None,
            signaled: false,
            resets: 0,
        }
    }

    /// Starts the session. Only meaningful from `Idle`.
    pub fn start(&mut self, now: Instant) {
        if self.session.phase != Phase::Idle {
            return;
        }
        self.session.phase = Phase::Active;
        self.session.started_at = Some(Local::now());
        self.clock.retune(self.session.level(), now);
    }

    /// Offers a raw trigger (key, pointer, sensor edge) to the gate. Outside
    /// `Active` every trigger is throttled without consuming the window.
    pub fn trigger(&mut self, now: Instant) -> GateDecision {
        if self.session.phase != Phase::Active {
            return GateDecision::Throttled;
        }
        if self.gate.try_trigger(now) == GateDecision::Throttled {
            return GateDecision::Throttled;
        }
        self.session.attempts += 1;
        let res = self.game.resolve();
        self.apply_resolution(res, now);
        GateDecision::Accepted
    }

    /// Feeds one sampled sensor level (0–100); an upward threshold crossing
    /// becomes a trigger and runs through the same gate.
    pub fn feed_level(&mut self, level: u8, now: Instant) {
        if self.level_trigger.sample(level) {
            self.trigger(now);
        }
    }

    /// Drives time forward: dismisses an expired banner, applies its
    /// continuation, then replays however many world steps are due.
    pub fn poll(&mut self, now: Instant) {
        if let Some(banner) = &self.banner {
            if banner.expired(now) {
                let after = banner.after;
                self.banner = None;
                match after {
                    AfterBanner::Resume => {
                        self.session.phase = Phase::Active;
                        self.clock.retune(self.session.level(), now);
                    }
                    AfterBanner::Reset => self.full_reset(now),
                }
            }
        }
        if self.session.phase != Phase::Active {
            return;
        }
        let steps = self.clock.due_steps(now);
        for _ in 0..steps {
            let events = self.game.advance();
            self.apply_step_events(&events, now);
            if self.session.phase != Phase::Active {
                break;
            }
        }
    }

    /// Forces the terminal transition. Idempotent: re-evaluating a terminal
    /// condition that has already fired changes nothing.
    pub fn finish(&mut self, end: EndKind, now: Instant) {
        if self.session.phase == Phase::Terminal {
            return;
        }
        self.session.phase = Phase::Terminal;
        self.last_end = Some(end);
        self.clock.stop();
        let token = self.game.signal(&self.session, &self.config);
        if !self.signaled {
            self.signaled = true;
            // Dispatch failure degrades to the in-terminal popup.
            let _ = self.sink.dispatch(&token);
            self.last_signal = Some(token.clone());
        }
        self.banner = Some(OutcomeBanner::new(
            BannerKind::Prize {
                token,
                score: self.session.score,
            },
            Duration::from_millis(self.config.terminal_delay_ms),
            AfterBanner::Reset,
            now,
        ));
    }

    /// Full session reset: fresh session, world, gate, and clock, then an
    /// immediate restart.
    pub fn full_reset(&mut self, now: Instant) {
        self.resets += 1;
        self.session = Session::new(self.config.lives);
        self.game.reset();
        self.gate.reset();
        self.banner = None;
        self.signaled = false;
        self.last_end = None;
        self.clock.stop();
        self.start(now);
    }

    /// Swaps in a committed configuration. Tuning applies immediately;
    /// `lives` takes effect at the next reset.
    pub fn apply_config(&mut self, config: GameConfig, now: Instant) {
        self.table = ScoreTable::new(&config.score_values);
        self.gate
            .set_cooldown(Duration::from_millis(config.throttle_ms));
        self.level_trigger.set_threshold(config.audio_threshold);
        self.clock.set_tuning(
            Duration::from_millis(config.base_period_ms),
            Duration::from_millis(config.min_period_ms),
            config.acceleration_factor,
            self.session.level(),
            now,
        );
        self.config = config;
    }

    fn apply_resolution(&mut self, res: games::Resolution, now: Instant) {
        // Scoring applies regardless of how the session continues.
        let delta = match res.outcome {
            ActionOutcome::Success(PointsSource::Table) => {
                let delta = self.table.value_at(self.session.progress);
                self.session.score += delta;
                self.session.progress += 1;
                Some(delta)
            }
            ActionOutcome::Success(PointsSource::Fixed(n)) => {
                self.session.score += n;
                Some(n)
            }
            ActionOutcome::Success(PointsSource::None) => Some(0),
            ActionOutcome::Failure => None,
        };
        match res.disposition {
            Disposition::End(end) => self.finish(end, now),
            Disposition::LoseLife => {
                self.session.lives = self.session.lives.saturating_sub(1);
                if self.session.lives == 0 {
                    self.finish(EndKind::Loss, now);
                } else {
                    self.show_banner(BannerKind::Failure, now);
                }
            }
            Disposition::Continue if res.pause => {
                let kind = match delta {
                    Some(delta) => BannerKind::Success { delta },
                    None => BannerKind::Failure,
                };
                self.show_banner(kind, now);
            }
            Disposition::Continue => {}
        }
    }

    fn apply_step_events(&mut self, events: &[StepEvent], now: Instant) {
        for ev in events {
            match *ev {
                StepEvent::Scored(n) => self.session.score += n,
                StepEvent::Progressed => {
                    self.session.progress += 1;
                    self.clock.retune(self.session.level(), now);
                }
                StepEvent::LifeLost => {
                    self.session.lives = self.session.lives.saturating_sub(1);
                    if self.session.lives == 0 {
                        self.finish(EndKind::Loss, now);
                        return;
                    }
                }
                StepEvent::ScoreCleared => {
                    self.session.score = 0;
                    self.session.progress = 0;
                    self.clock.retune(self.session.level(), now);
                }
                StepEvent::Ended(end) => {
                    self.finish(end, now);
                    return;
                }
            }
        }
    }

    fn show_banner(&mut self, kind: BannerKind, now: Instant) {
        self.session.phase = Phase::ResolvingOutcome;
        self.clock.stop();
        self.banner = Some(OutcomeBanner::new(
            kind,
            Duration::from_millis(self.config.resolve_delay_ms),
            AfterBanner::Resume,
            now,
        ));
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn game(&self) -> &dyn Minigame {
        self.game.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn banner(&self) -> Option<&OutcomeBanner> {
        self.banner.as_ref()
    }

    pub fn last_signal(&self) -> Option<&str> {
        self.last_signal.as_deref()
    }

    pub fn last_end(&self) -> Option<EndKind> {
        self.last_end
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    pub fn gate_remaining(&self, now: Instant) -> Duration {
        self.gate.remaining(now)
    }
}
