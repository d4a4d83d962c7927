use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// UI poll rate. The runner wakes at this cadence; the round clock turns the
/// wall-clock time between wakes into due world steps, so a late tick delays
/// rendering but never drops game logic.
pub const TICK_RATE_MS: u64 = 50;

/// What one runner step hands the app: a key, or a tick when the interval
/// passed without input.
#[derive(Clone, Debug)]
pub enum ArcadeEvent {
    Key(KeyEvent),
    Tick,
}

/// Where raw input comes from. The production source reads the terminal;
/// tests feed a channel.
pub trait EventSource: Send + 'static {
    /// Blocks up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<ArcadeEvent, RecvTimeoutError>;
}

/// Terminal input via a background crossterm reader thread. Only key events
/// reach the app; everything is redrawn every step anyway, so resize and the
/// other terminal events need no handling of their own.
pub struct CrosstermEventSource {
    rx: Receiver<ArcadeEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(ArcadeEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ArcadeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-backed source for headless tests.
pub struct TestEventSource {
    rx: Receiver<ArcadeEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ArcadeEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ArcadeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pull-based loop driver: each `step` yields the next key, or `Tick` once
/// the poll interval elapses. A dead input source degrades to a pure ticker
/// so the world keeps moving even if the reader thread dies.
pub struct Runner<E: EventSource> {
    events: E,
    interval: Duration,
}

impl<E: EventSource> Runner<E> {
    /// Runner at the standard UI poll rate.
    pub fn new(events: E) -> Self {
        Self::with_interval(events, Duration::from_millis(TICK_RATE_MS))
    }

    /// Custom poll interval, for tests that cannot afford the real cadence.
    pub fn with_interval(events: E, interval: Duration) -> Self {
        Self { events, interval }
    }

    pub fn step(&self) -> ArcadeEvent {
        match self.events.recv_timeout(self.interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                ArcadeEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    #[test]
    fn quiet_interval_yields_a_tick() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::with_interval(TestEventSource::new(rx), Duration::from_millis(1));

        match runner.step() {
            ArcadeEvent::Tick => {}
            other => panic!("expected a tick, got {other:?}"),
        }
    }

    #[test]
    fn queued_keys_come_out_before_any_tick() {
        let (tx, rx) = mpsc::channel();
        tx.send(ArcadeEvent::Key(KeyEvent::new(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
        )))
        .unwrap();
        let runner = Runner::with_interval(TestEventSource::new(rx), Duration::from_millis(10));

        match runner.step() {
            ArcadeEvent::Key(key) => assert_eq!(key.code, KeyCode::Char(' ')),
            other => panic!("expected the queued key, got {other:?}"),
        }
    }

    #[test]
    fn dead_input_source_degrades_to_a_ticker() {
        let (tx, rx) = mpsc::channel::<ArcadeEvent>();
        drop(tx);
        let runner = Runner::with_interval(TestEventSource::new(rx), Duration::from_millis(1));

        for _ in 0..3 {
            match runner.step() {
                ArcadeEvent::Tick => {}
                other => panic!("expected ticks from a dead source, got {other:?}"),
            }
        }
    }

    #[test]
    fn default_runner_polls_at_the_ui_rate() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx));
        assert_eq!(runner.interval, Duration::from_millis(TICK_RATE_MS));
    }
}
