//! Interactive per-zone dashboard for a live receiver.
//!
//! Usage: `cargo run --example monitor -- <host> [port]`
//!
//! Left pane: zone state assembled from the event stream. Right pane: the
//! raw event log as JSON lines, the same payloads a message-bus bridge
//! would republish per signal.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pioneer_vsx::{
    codes, display_mode_name, EventReceiver, VsxClient, VsxError, VsxEvent, Zone,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io;

const LOG_LINES: usize = 200;
const INPUT_CYCLE: [u8; 5] = [
    codes::HDMI_1,
    codes::HDMI_2,
    codes::BD,
    codes::TUNER,
    codes::MEDIA_SERVER,
];

#[derive(Default, Clone)]
struct ZoneView {
    power: Option<bool>,
    volume_db: Option<f64>,
    mute: Option<bool>,
    input_id: Option<String>,
    input_name: Option<String>,
}

struct App {
    client: VsxClient,
    events: EventReceiver,
    zones: [ZoneView; 4],
    display_mode: Option<String>,
    connected: bool,
    finished: Option<String>,
    status_message: String,
    log: VecDeque<String>,
    input_cycle_pos: usize,
}

impl App {
    fn new(client: VsxClient) -> Self {
        let events = client.subscribe();
        Self {
            client,
            events,
            zones: Default::default(),
            display_mode: None,
            connected: false,
            finished: None,
            status_message: "Waking receiver...".to_string(),
            log: VecDeque::new(),
            input_cycle_pos: 0,
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut ZoneView {
        &mut self.zones[zone.number() as usize - 1]
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(Some(event)) => self.apply(event),
                Ok(None) => break,
                Err(VsxError::ConnectionClosed) => {
                    self.finished = Some("connection closed".to_string());
                    break;
                }
                // Lagged: keep draining, the log just has a gap
                Err(_) => {}
            }
        }
    }

    fn apply(&mut self, event: VsxEvent) {
        if let Ok(json) = serde_json::to_string(&event) {
            self.log.push_front(json);
            self.log.truncate(LOG_LINES);
        }
        match event {
            VsxEvent::Connect => {
                self.connected = true;
                self.status_message =
                    "Connected. +/- vol, p power, m mute, i input, s query, q quit".to_string();
            }
            VsxEvent::Power { on, zone } => self.zone_mut(zone).power = Some(on),
            VsxEvent::Volume { db, zone } => self.zone_mut(zone).volume_db = Some(db),
            VsxEvent::Mute { on, zone } => self.zone_mut(zone).mute = Some(on),
            VsxEvent::Input { id, name, zone } => {
                let view = self.zone_mut(zone);
                view.input_id = Some(id);
                view.input_name = name;
            }
            // The client keeps the name table; the log line is enough here
            VsxEvent::InputName { .. } => {}
            // Transient remote-key report; the display mode follows
            VsxEvent::ListeningModeSet { .. } => {}
            VsxEvent::ListeningModeDisplay { mode } => self.display_mode = Some(mode),
            VsxEvent::End => self.finished = Some("connection ended".to_string()),
            VsxEvent::Error { message } => self.finished = Some(message),
        }
    }

    fn report(&mut self, result: pioneer_vsx::Result<()>, action: &str) {
        match result {
            Ok(()) => self.status_message = action.to_string(),
            Err(e) => self.status_message = format!("{} failed: {}", action, e),
        }
    }

    fn toggle_power(&mut self) {
        let on = !self.zones[0].power.unwrap_or(false);
        let result = self.client.power(on, Zone::Main);
        self.report(result, if on { "Power ON" } else { "Power OFF" });
    }

    fn toggle_mute(&mut self) {
        let on = !self.zones[0].mute.unwrap_or(false);
        let result = self.client.mute(on, Zone::Main);
        self.report(result, if on { "Mute ON" } else { "Mute OFF" });
    }

    fn cycle_input(&mut self) {
        let id = INPUT_CYCLE[self.input_cycle_pos];
        self.input_cycle_pos = (self.input_cycle_pos + 1) % INPUT_CYCLE.len();
        let result = self.client.change_input(id);
        self.report(result, &format!("Input {:02}", id));
    }

    fn refresh(&mut self) {
        let span = self.client.query();
        self.status_message = format!("Querying status ({:?} burst)", span);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.1.123".to_string());
    let port: u16 = args.next().and_then(|p| p.parse().ok()).unwrap_or(23);

    let client = VsxClient::connect(host, port).await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client);
    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {}", err);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.drain_events();
        if let Some(reason) = &app.finished {
            app.status_message = format!("Session over: {}. Press q to exit.", reason);
        }

        terminal.draw(|f| ui(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('p') => app.toggle_power(),
                        KeyCode::Char('m') => app.toggle_mute(),
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            let result = app.client.volume_up();
                            app.report(result, "Volume up");
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            let result = app.client.volume_down();
                            app.report(result, "Volume down");
                        }
                        KeyCode::Char('i') => app.cycle_input(),
                        KeyCode::Char('s') => app.refresh(),
                        _ => {}
                    }
                }
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.size());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(outer[0]);

    render_zones(f, app, panes[0]);
    render_log(f, app, panes[1]);
    render_status(f, app, outer[1]);
}

fn render_zones(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Zones ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = Vec::new();
    for zone in Zone::ALL {
        let view = &app.zones[zone.number() as usize - 1];
        lines.push(Line::from(Span::styled(
            zone.name().to_uppercase(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::raw("  Power: "),
            match view.power {
                Some(true) => Span::styled("ON", Style::default().fg(Color::Green)),
                Some(false) => Span::styled("OFF", Style::default().fg(Color::Red)),
                None => Span::styled("?", Style::default().fg(Color::Gray)),
            },
        ]));
        lines.push(Line::from(vec![
            Span::raw("  Volume: "),
            Span::styled(
                view.volume_db
                    .map(|db| format!("{:.1} dB", db))
                    .unwrap_or_else(|| "?".to_string()),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(match view.mute {
                Some(true) => "  [MUTED]",
                _ => "",
            }),
        ]));
        lines.push(Line::from(vec![
            Span::raw("  Input: "),
            Span::styled(
                match (&view.input_id, &view.input_name) {
                    (Some(id), Some(name)) => format!("{} ({})", id, name),
                    (Some(id), None) => id.clone(),
                    _ => "?".to_string(),
                },
                Style::default().fg(Color::Cyan),
            ),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::raw("Listening mode: "),
        Span::styled(
            match &app.display_mode {
                Some(mode) => format!(
                    "{} ({})",
                    mode,
                    display_mode_name(mode).unwrap_or("?")
                ),
                None => "?".to_string(),
            },
            Style::default().fg(Color::Magenta),
        ),
    ]));

    let text = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(text, area);
}

fn render_log(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Events (JSON) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .log
        .iter()
        .take(height)
        .map(|json| Line::from(json.as_str()))
        .collect();

    let text = Paragraph::new(lines).block(block);
    f.render_widget(text, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let connected = if app.connected { "ready" } else { "waking" };
    let text = Paragraph::new(format!("[{}] {}", connected, app.status_message))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(text, area);
}
