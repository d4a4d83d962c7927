use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::{ConfigStore, GameConfig};
use crate::engine::Engine;
use crate::presenter::BannerKind;
use crate::session::Phase;

/// Editable settings exposed in the in-game form. Everything else in
/// `GameConfig` is deployment-level and edited in the JSON file directly.
const FORM_FIELDS: [&str; 3] = ["acceleration factor", "throttle (ms)", "audio threshold"];

/// In-game editor for the hot-tunable settings. Edits are buffered as text
/// and committed through the config store in one validated update.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    inputs: [String; 3],
    selected: usize,
    notice: Option<String>,
}

impl SettingsForm {
    pub fn open(config: &GameConfig) -> Self {
        Self {
            inputs: [
                config.acceleration_factor.to_string(),
                config.throttle_ms.to_string(),
                config.audio_threshold.to_string(),
            ],
            selected: 0,
            notice: None,
        }
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % FORM_FIELDS.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = (self.selected + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }

    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' {
            self.inputs[self.selected].push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.inputs[self.selected].pop();
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Validates and persists the edited fields. On success the committed
    /// record is pushed into the engine; on rejection the store keeps its
    /// prior record and the form shows why.
    pub fn apply(
        &mut self,
        store: &dyn ConfigStore,
        engine: &mut Engine,
        now: Instant,
    ) -> bool {
        let mut candidate = engine.config().clone();
        let parsed = (
            self.inputs[0].parse::<f64>(),
            self.inputs[1].parse::<u64>(),
            self.inputs[2].parse::<u8>(),
        );
        match parsed {
            (Ok(accel), Ok(throttle), Ok(threshold)) => {
                candidate.acceleration_factor = accel;
                candidate.throttle_ms = throttle;
                candidate.audio_threshold = threshold;
            }
            _ => {
                self.notice = Some("not a number".to_string());
                return false;
            }
        }
        match store.update(&candidate) {
            Ok(committed) => {
                engine.apply_config(committed, now);
                self.notice = None;
                true
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                false
            }
        }
    }
}

pub fn render(f: &mut Frame, engine: &Engine, now: Instant, settings: Option<&SettingsForm>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_hud(f, engine, chunks[0]);
    render_board(f, engine, chunks[1]);
    render_status(f, engine, now, chunks[2]);

    if let Some(form) = settings {
        render_settings(f, form);
    } else if let Some(banner) = engine.banner() {
        render_banner(f, engine, now, banner);
    }
}

fn render_hud(f: &mut Frame, engine: &Engine, area: Rect) {
    let session = engine.session();
    let started = session
        .started_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    let hud = format!(
        "score {}  level {}  lives {}  tries {}  since {}",
        session.score,
        session.level(),
        session.lives,
        session.attempts,
        started
    );
    let title = Paragraph::new(hud)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(engine.game().kind().to_string()),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn render_board(f: &mut Frame, engine: &Engine, area: Rect) {
    let lines: Vec<Line> = engine
        .game()
        .board_lines()
        .into_iter()
        .map(Line::from)
        .collect();
    let board = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(board, area);
}

fn render_status(f: &mut Frame, engine: &Engine, now: Instant, area: Rect) {
    let phase = match engine.session().phase {
        Phase::Idle => "idle",
        Phase::Active => "go",
        Phase::ResolvingOutcome => "...",
        Phase::Terminal => "over",
    };
    let cooldown = engine.gate_remaining(now);
    let arm = if cooldown.is_zero() {
        "ready".to_string()
    } else {
        format!("cooling {:.1}s", cooldown.as_secs_f64())
    };
    let status = format!("{}  |  {}  |  {}", phase, engine.game().status_line(), arm);
    let widget = Paragraph::new(status)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_banner(
    f: &mut Frame,
    engine: &Engine,
    now: Instant,
    banner: &crate::presenter::OutcomeBanner,
) {
    let (title, body, color) = match &banner.kind {
        BannerKind::Success { delta } => {
            ("hit", vec![format!("+{delta}")], Color::Green)
        }
        BannerKind::Failure => ("miss", vec!["no luck".to_string()], Color::Red),
        BannerKind::Prize { token, score } => (
            "session over",
            vec![
                format!("score {score}"),
                format!("prize: {token}"),
                format!("new round in {:.0}s", banner.remaining(now).as_secs_f64()),
            ],
            Color::Yellow,
        ),
    };
    let area = centered_rect(40, (body.len() + 2) as u16, f.area());
    let lines: Vec<Line> = body.into_iter().map(Line::from).collect();
    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn render_settings(f: &mut Frame, form: &SettingsForm) {
    let mut lines: Vec<Line> = FORM_FIELDS
        .iter()
        .zip(form.inputs.iter())
        .enumerate()
        .map(|(i, (name, value))| {
            let marker = if i == form.selected { "> " } else { "  " };
            Line::from(format!("{marker}{name}: {value}"))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(match form.notice() {
        Some(notice) => format!("rejected: {notice}"),
        None => "enter to save, esc to close".to_string(),
    }));

    let area = centered_rect(50, (lines.len() + 2) as u16, f.area());
    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("settings"))
        .alignment(Alignment::Left);
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * width_pct / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfigStore;
    use crate::games::{EndKind, GameKind};
    use crate::signal::RecordingSink;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::tempdir;

    fn engine() -> Engine {
        Engine::new(
            GameKind::Fishing,
            GameConfig::default(),
            Box::new(RecordingSink::new()),
            7,
        )
    }

    #[test]
    fn renders_an_active_session() {
        let mut engine = engine();
        let now = Instant::now();
        engine.start(now);

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| render(f, &engine, now, None))
            .unwrap();
    }

    #[test]
    fn renders_the_prize_popup_when_terminal() {
        let mut engine = engine();
        let now = Instant::now();
        engine.start(now);
        engine.finish(EndKind::Loss, now);

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| render(f, &engine, now, None))
            .unwrap();
    }

    #[test]
    fn renders_the_settings_form() {
        let engine = engine();
        let form = SettingsForm::open(engine.config());

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| render(f, &engine, Instant::now(), Some(&form)))
            .unwrap();
    }

    #[test]
    fn form_edits_only_digits_and_dots() {
        let engine = engine();
        let mut form = SettingsForm::open(engine.config());
        form.input_char('x');
        form.input_char('5');
        assert_eq!(form.inputs[0], "0.95");
        form.backspace();
        assert_eq!(form.inputs[0], "0.9");
    }

    #[test]
    fn apply_commits_a_valid_edit_through_the_store() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(
            dir.path().join("fishing.json"),
            GameConfig::default(),
        );
        let mut engine = engine();
        let now = Instant::now();
        engine.start(now);

        let mut form = SettingsForm::open(engine.config());
        form.inputs[1] = "2500".to_string();
        assert!(form.apply(&store, &mut engine, now));
        assert_eq!(engine.config().throttle_ms, 2500);
        assert_eq!(store.load().throttle_ms, 2500);
    }

    #[test]
    fn apply_keeps_the_old_record_on_a_rejected_edit() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(
            dir.path().join("fishing.json"),
            GameConfig::default(),
        );
        let mut engine = engine();
        let now = Instant::now();

        let mut form = SettingsForm::open(engine.config());
        form.inputs[0] = "9.5".to_string();
        assert!(!form.apply(&store, &mut engine, now));
        assert!(form.notice().is_some());
        assert_eq!(engine.config().acceleration_factor, 0.9);
    }

    #[test]
    fn field_selection_wraps_both_ways() {
        let engine = engine();
        let mut form = SettingsForm::open(engine.config());
        form.prev_field();
        assert_eq!(form.selected, FORM_FIELDS.len() - 1);
        form.next_field();
        assert_eq!(form.selected, 0);
    }
}
