use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

use midway::config::{ConfigStore, FileConfigStore, GameConfig};
use midway::engine::Engine;
use midway::games::GameKind;
use midway::runtime::{ArcadeEvent, CrosstermEventSource, EventSource, Runner};
use midway::signal::{CommandSignalSink, ConsoleSignalSink, SignalSink};
use midway::ui::{self, SettingsForm};

/// terminal arcade midway with external prize signaling
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal arcade midway: tick-driven mini-games with cooldown-gated \
controls that signal a prize dispenser (or the console) when a session ends."
)]
pub struct Cli {
    /// cabinet to run
    #[clap(short, long, value_enum, default_value_t = GameKind::Fishing)]
    game: GameKind,

    /// configuration file to use instead of the platform config dir
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// program invoked with the prize token when a session ends
    #[clap(long)]
    signal_command: Option<String>,

    /// RNG seed for a reproducible session
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path, GameConfig::for_game(cli.game)),
        None => FileConfigStore::new(cli.game),
    };
    let loaded = store.load();
    // A hand-edited record can parse but still be out of range.
    let config = if loaded.validate().is_ok() {
        loaded
    } else {
        GameConfig::for_game(cli.game)
    };

    let sink: Box<dyn SignalSink> = match &cli.signal_command {
        Some(program) => Box::new(CommandSignalSink::new(program.clone())),
        None => Box::new(ConsoleSignalSink),
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut engine = Engine::new(cli.game, config, sink, seed);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui(&mut terminal, &mut engine, &store, CrosstermEventSource::new());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    engine: &mut Engine,
    store: &FileConfigStore,
    events: E,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(events);
    let mut settings: Option<SettingsForm> = None;
    engine.start(Instant::now());

    loop {
        let now = Instant::now();
        engine.poll(now);
        terminal.draw(|f| ui::render(f, engine, now, settings.as_ref()))?;

        match runner.step() {
            ArcadeEvent::Tick => {}
            ArcadeEvent::Key(key) => {
                if handle_key(key, engine, store, &mut settings, Instant::now()) {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Dispatches one key event. Returns true when the app should exit.
fn handle_key(
    key: KeyEvent,
    engine: &mut Engine,
    store: &FileConfigStore,
    settings: &mut Option<SettingsForm>,
    now: Instant,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(form) = settings {
        match key.code {
            KeyCode::Esc => *settings = None,
            KeyCode::Enter => {
                if form.apply(store, engine, now) {
                    *settings = None;
                }
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input_char(c),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Enter | KeyCode::Char(' ') => {
            engine.trigger(now);
        }
        KeyCode::Char('r') => engine.full_reset(now),
        KeyCode::Char('s') => *settings = Some(SettingsForm::open(engine.config())),
        _ => {}
    }
    false
}
