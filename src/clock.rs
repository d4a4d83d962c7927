use std::time::{Duration, Instant};

/// Upper bound on world steps replayed in a single poll after a stall.
const MAX_CATCHUP_STEPS: u32 = 4;

/// Fixed-period round clock driving the game world.
///
/// The process ticker polls at a constant UI rate; this clock is a logical
/// accumulator that converts elapsed wall-clock time into due world steps at
/// the current period. Starting or retuning replaces the previous schedule,
/// so there is never more than one live schedule per session.
#[derive(Debug, Clone)]
pub struct RoundClock {
    base_period: Duration,
    min_period: Duration,
    acceleration: f64,
    period: Duration,
    running: bool,
    last_step: Option<Instant>,
    generation: u64,
}

impl RoundClock {
    pub fn new(base_period: Duration, min_period: Duration, acceleration: f64) -> Self {
        Self {
            base_period,
            min_period,
            acceleration,
            period: base_period,
            running: false,
            last_step: None,
            generation: 0,
        }
    }

    /// Period for a given level (1-based progress counter):
    /// `base × acceleration^(level − 1)`, floored at the minimum period.
    pub fn period_for_level(&self, level: u32) -> Duration {
        let exponent = level.saturating_sub(1) as i32;
        let scaled = self.base_period.mul_f64(self.acceleration.powi(exponent));
        scaled.max(self.min_period)
    }

    /// Begins (or restarts) the schedule at the current period. Any previous
    /// schedule is canceled first.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.last_step = Some(now);
        self.generation += 1;
    }

    /// Cancels the current schedule and restarts at the period for `level`.
    pub fn retune(&mut self, level: u32, now: Instant) {
        self.period = self.period_for_level(level);
        self.start(now);
    }

    /// Stops the schedule. Stopping a stopped clock is a no-op.
    pub fn stop(&mut self) {
        self.running = false;
        self.last_step = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Monotonically increasing count of schedule (re)starts. Lets callers
    /// assert the cancel-before-start discipline.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the tuning parameters, keeping the running state. The active
    /// period is recomputed for `level`.
    pub fn set_tuning(
        &mut self,
        base_period: Duration,
        min_period: Duration,
        acceleration: f64,
        level: u32,
        now: Instant,
    ) {
        self.base_period = base_period;
        self.min_period = min_period;
        self.acceleration = acceleration;
        if self.running {
            self.retune(level, now);
        } else {
            self.period = self.period_for_level(level);
        }
    }

    /// Number of world steps due since the last poll. Zero while stopped.
    /// A long stall is capped at `MAX_CATCHUP_STEPS` and the backlog dropped.
    pub fn due_steps(&mut self, now: Instant) -> u32 {
        if !self.running {
            return 0;
        }
        let Some(mut last) = self.last_step else {
            return 0;
        };
        let mut steps = 0;
        while now.checked_duration_since(last).is_some_and(|d| d >= self.period) {
            last += self.period;
            steps += 1;
            if steps == MAX_CATCHUP_STEPS {
                last = now;
                break;
            }
        }
        self.last_step = Some(last);
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> RoundClock {
        RoundClock::new(
            Duration::from_millis(500),
            Duration::from_millis(50),
            0.9,
        )
    }

    #[test]
    fn period_follows_acceleration_curve() {
        let c = clock();
        assert_eq!(c.period_for_level(1), Duration::from_millis(500));
        assert_eq!(c.period_for_level(2), Duration::from_millis(450));
        // base × 0.9^3
        let expected = Duration::from_millis(500).mul_f64(0.9f64.powi(3));
        assert_eq!(c.period_for_level(4), expected);
    }

    #[test]
    fn period_is_monotonically_non_increasing_for_accel_below_one() {
        let c = clock();
        let mut prev = c.period_for_level(1);
        for level in 2..30 {
            let p = c.period_for_level(level);
            assert!(p <= prev, "period grew at level {level}");
            prev = p;
        }
    }

    #[test]
    fn period_is_floored_at_min() {
        let c = RoundClock::new(
            Duration::from_millis(100),
            Duration::from_millis(20),
            0.8,
        );
        assert_eq!(c.period_for_level(50), Duration::from_millis(20));
    }

    #[test]
    fn due_steps_is_zero_while_stopped() {
        let mut c = clock();
        let now = Instant::now();
        assert_eq!(c.due_steps(now + Duration::from_secs(10)), 0);

        c.start(now);
        c.stop();
        assert_eq!(c.due_steps(now + Duration::from_secs(10)), 0);
    }

    #[test]
    fn due_steps_accumulates_elapsed_periods() {
        let mut c = clock();
        let now = Instant::now();
        c.start(now);

        assert_eq!(c.due_steps(now + Duration::from_millis(499)), 0);
        assert_eq!(c.due_steps(now + Duration::from_millis(500)), 1);
        // Next step is due one full period after the previous one.
        assert_eq!(c.due_steps(now + Duration::from_millis(999)), 0);
        assert_eq!(c.due_steps(now + Duration::from_millis(1500)), 2);
    }

    #[test]
    fn long_stall_is_capped_and_backlog_dropped() {
        let mut c = clock();
        let now = Instant::now();
        c.start(now);

        let steps = c.due_steps(now + Duration::from_secs(60));
        assert_eq!(steps, MAX_CATCHUP_STEPS);
        // Backlog was discarded, not replayed.
        assert_eq!(c.due_steps(now + Duration::from_secs(60)), 0);
    }

    #[test]
    fn starting_cancels_previous_schedule() {
        let mut c = clock();
        let now = Instant::now();
        c.start(now);
        let first = c.generation();

        c.start(now + Duration::from_millis(400));
        assert_eq!(c.generation(), first + 1);
        // The old schedule's pending step did not survive the restart.
        assert_eq!(c.due_steps(now + Duration::from_millis(600)), 0);
    }

    #[test]
    fn retune_restarts_at_new_period() {
        let mut c = clock();
        let now = Instant::now();
        c.start(now);

        c.retune(2, now);
        assert_eq!(c.period(), Duration::from_millis(450));
        assert!(c.is_running());
        assert_eq!(c.due_steps(now + Duration::from_millis(449)), 0);
        assert_eq!(c.due_steps(now + Duration::from_millis(450)), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut c = clock();
        c.stop();
        c.stop();
        assert!(!c.is_running());
    }
}
