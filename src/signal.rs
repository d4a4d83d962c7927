use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

/// Delivers the terminal outcome token to the host environment.
///
/// The concrete sink is chosen once at startup: a host-provided dispenser
/// command when one is configured, otherwise the standalone console
/// fallback. The engine guarantees exactly one dispatch per session.
pub trait SignalSink {
    fn dispatch(&self, token: &str) -> io::Result<()>;
}

/// Invokes an external program with the token as its single argument.
/// The child is detached; the game does not wait for the dispenser.
#[derive(Debug, Clone)]
pub struct CommandSignalSink {
    program: String,
}

impl CommandSignalSink {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SignalSink for CommandSignalSink {
    fn dispatch(&self, token: &str) -> io::Result<()> {
        Command::new(&self.program)
            .arg(token)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
}

/// Standalone fallback: writes the token to stderr so the game stays usable
/// without a dispenser attached.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSignalSink;

impl SignalSink for ConsoleSignalSink {
    fn dispatch(&self, token: &str) -> io::Result<()> {
        let mut err = io::stderr();
        writeln!(err, "prize signal: {token}")
    }
}

/// Captures dispatched tokens for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl SignalSink for RecordingSink {
    fn dispatch(&self, token: &str) -> io::Result<()> {
        self.sent
            .lock()
            .map(|mut v| v.push(token.to_string()))
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "sink poisoned"))
    }
}
