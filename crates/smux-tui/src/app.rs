//! Application core: event loop, key mapping and action dispatch.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use smux_api::{ApiClient, ApiMessage, WsEvent};
use smux_core::{Dashboard, Dispatch};

use crate::action::Action;
use crate::bridge;
use crate::event::{Event, EventReader};
use crate::screens::dashboard;
use crate::selection::Selection;
use crate::theme;
use crate::tui::Tui;

/// Resolved startup settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ApiClient,
    pub ws_url: url::Url,
    pub timeout: Duration,
    pub tick: Duration,
    pub render: Duration,
}

pub struct App {
    dashboard: Dashboard,
    selection: Selection,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Receiving half for the session task; taken once on start.
    outbound_rx: Option<mpsc::UnboundedReceiver<ApiMessage>>,
}

impl App {
    pub fn new(now: Instant) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            dashboard: Dashboard::new(outbound_tx, now),
            selection: Selection::default(),
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            outbound_rx: Some(outbound_rx),
        }
    }

    /// Start the background tasks, then run until quit.
    pub async fn run(&mut self, config: AppConfig) -> Result<()> {
        let cancel = CancellationToken::new();
        if let Some(outbound) = self.outbound_rx.take() {
            bridge::spawn_session(
                config.ws_url.clone(),
                outbound,
                config.timeout,
                self.action_tx.clone(),
                cancel.clone(),
            );
        }
        bridge::spawn_version_fetch(config.client.clone(), self.action_tx.clone());

        let mut tui = Tui::new()?;
        tui.enter()?;
        let mut events = EventReader::new(config.tick, config.render);
        info!("event loop started");

        while self.running {
            let action = tokio::select! {
                event = events.next() => match event {
                    Some(event) => self.map_event(event),
                    None => break,
                },
                Some(action) = self.action_rx.recv() => Some(action),
            };
            let Some(action) = action else { continue };

            let render = matches!(action, Action::Render);
            let now = Instant::now();
            self.process_action(action, now);
            if render {
                tui.draw(|frame| self.render(frame, now))?;
            }
        }

        cancel.cancel();
        events.stop();
        tui.exit();
        info!("event loop ended");
        Ok(())
    }

    fn map_event(&self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Tick => Some(Action::Tick),
            Event::Render | Event::Resize => Some(Action::Render),
        }
    }

    fn handle_key_event(&self, key: KeyEvent) -> Option<Action> {
        if self.help_visible {
            return matches!(key.code, KeyCode::Esc | KeyCode::Char('?'))
                .then_some(Action::ToggleHelp);
        }
        let action = match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => Action::Quit,
            (_, KeyCode::Char('?')) => Action::ToggleHelp,
            (_, KeyCode::Char('j') | KeyCode::Down) => Action::SelectNext,
            (_, KeyCode::Char('k') | KeyCode::Up) => Action::SelectPrev,
            (_, KeyCode::Char('g') | KeyCode::Home) => Action::SelectFirst,
            (_, KeyCode::Char('G') | KeyCode::End) => Action::SelectLast,
            (_, KeyCode::Char('a')) => Action::ClickOnOff(0),
            (_, KeyCode::Char('b')) => Action::ClickOnOff(1),
            (_, KeyCode::Char('d') | KeyCode::Enter) => Action::ToggleDetails,
            (_, KeyCode::Char('r')) => Action::ToggleRelative,
            (_, KeyCode::Char('D')) => Action::ToggleAllDetails,
            (_, KeyCode::Char('R')) => Action::ToggleAllRelative,
            _ => return None,
        };
        Some(action)
    }

    /// Apply one action to the dashboard state.
    pub fn process_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Session(event) => self.handle_session(event, now),
            Action::Version(Ok(info)) => self.dashboard.set_version(&info),
            Action::Version(Err(err)) => self.dashboard.version_failed(&err),

            Action::SelectNext => self.selection.step(&mut self.dashboard, true),
            Action::SelectPrev => self.selection.step(&mut self.dashboard, false),
            Action::SelectFirst => self.selection.first(&mut self.dashboard),
            Action::SelectLast => self.selection.last(&mut self.dashboard),

            Action::ClickOnOff(ix) => {
                if let Some((section, name)) = self.selection.current() {
                    let name = name.to_owned();
                    match self.dashboard.click_onoff(section, &name, ix) {
                        Ok(sent) => debug!(name = %name, ix, sent, "endpoint click"),
                        Err(err) => warn!(error = %err, "endpoint click failed"),
                    }
                }
            }
            Action::ToggleDetails => {
                if let Some((section, name)) = self.selection.current() {
                    let name = name.to_owned();
                    self.dashboard.toggle_details(section, &name);
                }
            }
            Action::ToggleRelative => {
                if let Some((section, name)) = self.selection.current() {
                    let name = name.to_owned();
                    self.dashboard.toggle_relative(section, &name);
                }
            }
            Action::ToggleAllDetails => {
                self.dashboard.toggle_all_details();
            }
            Action::ToggleAllRelative => {
                self.dashboard.toggle_all_relative();
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Tick => {
                self.dashboard.tick(now);
            }
            Action::Render => {}
            Action::Quit => self.running = false,
        }
    }

    fn handle_session(&mut self, event: WsEvent, now: Instant) {
        match event {
            WsEvent::Opened => self.dashboard.on_open(now),
            WsEvent::Text(text) => {
                if let Dispatch::Status { created } = self.dashboard.handle_message(&text, now) {
                    if created > 0 {
                        self.selection.sync(&mut self.dashboard);
                    }
                }
            }
            WsEvent::Closed => self.dashboard.on_closed(None),
            WsEvent::Failed(reason) => self.dashboard.on_closed(Some(&reason)),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame, now: Instant) {
        let [content, footer] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

        dashboard::render(frame, content, &self.dashboard, &self.selection, now);
        self.render_footer(frame, footer);

        if self.help_visible {
            render_help_overlay(frame, frame.area());
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(format!(" {}", self.dashboard.banner()), theme::key_hint()),
            Span::styled("  │ ", theme::key_hint()),
            Span::styled("?", theme::key_hint_key()),
            Span::styled(" help  ", theme::key_hint()),
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

const HELP: &[(&str, &str)] = &[
    ("j/k ↑/↓", "Move cursor"),
    ("g/G", "First / last"),
    ("a", "Toggle endpoint A"),
    ("b", "Toggle endpoint B"),
    ("d Enter", "Details of selected"),
    ("r", "Relative counters of selected"),
    ("D", "Details of all"),
    ("R", "Relative counters of all"),
    ("q", "Quit"),
];

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 48u16.min(area.width.saturating_sub(4));
    let height = u16::try_from(HELP.len() + 4)
        .unwrap_or(u16::MAX)
        .min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let popup = Rect::new(x, y, width, height);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_PURPLE));

    let mut lines = vec![Line::from("")];
    lines.extend(HELP.iter().map(|(key, what)| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(*what, theme::key_hint()),
        ])
    }));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
