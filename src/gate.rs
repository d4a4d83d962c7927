use std::time::{Duration, Instant};

/// Result of offering a raw trigger to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accepted,
    Throttled,
}

/// Debounces raw trigger events (pointer, key, sensor crossing) into at most
/// one logical action per cooldown window.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown: Duration,
    last_accepted: Option<Instant>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// Accepts iff the previous accepted action is at least one cooldown in
    /// the past. Acceptance moves the window.
    pub fn try_trigger(&mut self, now: Instant) -> GateDecision {
        match self.last_accepted {
            Some(last) if now.saturating_duration_since(last) < self.cooldown => {
                GateDecision::Throttled
            }
            _ => {
                self.last_accepted = Some(now);
                GateDecision::Accepted
            }
        }
    }

    /// Clears the latch. Used when the session resets mid-cooldown.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Time left before the next trigger can be accepted. Zero when armed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_accepted {
            Some(last) => self
                .cooldown
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

/// Converts a continuously sampled level (0–100) into edge-triggered actions:
/// fires once when the level rises through the threshold, then re-arms only
/// after the level falls back below it.
#[derive(Debug, Clone)]
pub struct LevelTrigger {
    threshold: u8,
    above: bool,
}

impl LevelTrigger {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            above: false,
        }
    }

    pub fn set_threshold(&mut self, threshold: u8) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Returns true only on an upward crossing.
    pub fn sample(&mut self, level: u8) -> bool {
        let crossed = level > self.threshold;
        let fired = crossed && !self.above;
        self.above = crossed;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trigger_is_accepted() {
        let mut gate = CooldownGate::new(Duration::from_millis(1000));
        assert_eq!(gate.try_trigger(Instant::now()), GateDecision::Accepted);
    }

    #[test]
    fn repeats_inside_cooldown_collapse_to_one_action() {
        let mut gate = CooldownGate::new(Duration::from_millis(1000));
        let now = Instant::now();

        assert_eq!(gate.try_trigger(now), GateDecision::Accepted);
        for offset in [1, 10, 500, 999] {
            assert_eq!(
                gate.try_trigger(now + Duration::from_millis(offset)),
                GateDecision::Throttled
            );
        }
        assert_eq!(
            gate.try_trigger(now + Duration::from_millis(1000)),
            GateDecision::Accepted
        );
    }

    #[test]
    fn accepted_actions_are_at_least_one_cooldown_apart() {
        let mut gate = CooldownGate::new(Duration::from_millis(1000));
        let start = Instant::now();
        let mut accepted = Vec::new();

        // Fire raw events every 100ms for 5 seconds.
        for i in 0..50 {
            let now = start + Duration::from_millis(i * 100);
            if gate.try_trigger(now) == GateDecision::Accepted {
                accepted.push(now);
            }
        }

        assert_eq!(accepted.len(), 5);
        for pair in accepted.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(1000));
        }
    }

    #[test]
    fn reset_rearms_the_gate() {
        let mut gate = CooldownGate::new(Duration::from_millis(1000));
        let now = Instant::now();

        gate.try_trigger(now);
        gate.reset();
        assert_eq!(
            gate.try_trigger(now + Duration::from_millis(1)),
            GateDecision::Accepted
        );
    }

    #[test]
    fn remaining_counts_down_to_zero() {
        let mut gate = CooldownGate::new(Duration::from_millis(1000));
        let now = Instant::now();
        assert_eq!(gate.remaining(now), Duration::ZERO);

        gate.try_trigger(now);
        assert_eq!(
            gate.remaining(now + Duration::from_millis(400)),
            Duration::from_millis(600)
        );
        assert_eq!(
            gate.remaining(now + Duration::from_millis(1500)),
            Duration::ZERO
        );
    }

    #[test]
    fn level_trigger_fires_only_on_upward_crossing() {
        let mut trig = LevelTrigger::new(50);

        assert!(!trig.sample(30));
        assert!(trig.sample(80));
        // Still above: no retrigger.
        assert!(!trig.sample(90));
        assert!(!trig.sample(51));
        // Falls below, then crosses again.
        assert!(!trig.sample(20));
        assert!(trig.sample(60));
    }

    #[test]
    fn level_trigger_threshold_is_exclusive() {
        let mut trig = LevelTrigger::new(50);
        assert!(!trig.sample(50));
        assert!(trig.sample(51));
    }
}
