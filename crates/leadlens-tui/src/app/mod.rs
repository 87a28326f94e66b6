use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use leadlens_client::LeadBundle;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::DefaultTerminal;
use tokio::sync::{broadcast, mpsc};

use crate::app_state::{AppState, LeadSession, StateCommand};
use crate::event_bus::{EventBus, EventPriority};
use crate::AppEvent;

const PLACEHOLDER: &str = "Enter a fuzzy lead description...";
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(100);

/// The presenter. Reads the session's derived signals and renders them; all
/// mutation goes out as [`StateCommand`]s. The input stays editable while a
/// dispatch is pending so a newer submission can overlap an older key.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// A read-only handle to the shared application state.
    state: Arc<AppState>,
    /// A channel to send commands to the state manager.
    cmd_tx: mpsc::Sender<StateCommand>,
    /// A channel to receive broadcasted application events.
    event_rx: broadcast::Receiver<AppEvent>,
    /// User input buffer, mirrored into the query store on every edit.
    pub input_buffer: String,
    spinner_frame: usize,
    needs_redraw: bool,
}

/// Cloned out of the session under a short read lock so the draw closure
/// never holds it.
#[derive(Debug, Default)]
struct ViewSnapshot {
    pending: bool,
    error: Option<String>,
    data: Option<LeadBundle>,
}

impl ViewSnapshot {
    fn capture(session: &LeadSession) -> Self {
        Self {
            pending: session.pending(),
            error: session.error().map(str::to_owned),
            data: session.data().cloned(),
        }
    }
}

impl App {
    pub fn new(
        state: Arc<AppState>,
        cmd_tx: mpsc::Sender<StateCommand>,
        event_bus: &EventBus, // reference non-Arc OK because only created at startup
    ) -> Self {
        Self {
            running: false, // Will be set to true in run()
            state,
            cmd_tx,
            event_rx: event_bus.subscribe(EventPriority::Realtime),
            input_buffer: String::new(),
            spinner_frame: 0,
            needs_redraw: true,
        }
    }

    fn send_cmd(&self, cmd: StateCommand) {
        // Use try_send to prevent the UI from blocking
        if let Err(e) = self.cmd_tx.try_send(cmd) {
            tracing::warn!("Failed to send command: {}", e);
        }
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        let mut crossterm_events = crossterm::event::EventStream::new();

        while self.running {
            if self.needs_redraw {
                let snapshot = {
                    let session = self.state.session.read().await;
                    ViewSnapshot::capture(&session)
                };
                terminal.draw(|frame| self.draw(frame, &snapshot))?;
                self.needs_redraw = false;
            }

            tokio::select! {
                Some(event) = crossterm_events.next() => {
                    match event {
                        Ok(Event::Key(key)) => self.on_key_event(key),
                        Ok(Event::Paste(text)) => {
                            self.input_buffer.push_str(&text);
                            self.mirror_query();
                        }
                        Ok(Event::Resize(_, _)) => self.needs_redraw = true,
                        Ok(_) => {}
                        Err(e) => tracing::warn!("terminal event stream error: {}", e),
                    }
                }
                Ok(app_event) = self.event_rx.recv() => {
                    if let AppEvent::Dispatch(_) = app_event {
                        self.needs_redraw = true;
                    }
                }
                _ = tokio::time::sleep(TICK) => {
                    if self.state.session.read().await.pending() {
                        self.spinner_frame = self.spinner_frame.wrapping_add(1);
                        self.needs_redraw = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return;
        }
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Enter => self.send_cmd(StateCommand::SubmitQuery),
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.mirror_query();
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input_buffer.push(c);
                self.mirror_query();
            }
            _ => {}
        }
    }

    /// Every keystroke overwrites the query store; the orchestrator only
    /// snapshots it at submission time.
    fn mirror_query(&mut self) {
        self.send_cmd(StateCommand::UpdateQuery {
            text: self.input_buffer.clone(),
        });
        self.needs_redraw = true;
    }

    fn draw(&self, frame: &mut Frame, snapshot: &ViewSnapshot) {
        let [title_area, input_area, status_area, results_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(frame.area());

        frame.render_widget(Paragraph::new("CRM Lead Agent").bold().centered(), title_area);

        let input = if self.input_buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).dim().italic()
        } else {
            Paragraph::new(self.input_buffer.as_str())
        };
        frame.render_widget(input.block(Block::bordered().title("Query")), input_area);
        let cursor_x = (input_area.x + 1 + self.input_buffer.chars().count() as u16)
            .min(input_area.right().saturating_sub(2));
        frame.set_cursor_position((cursor_x, input_area.y + 1));

        if snapshot.pending {
            let frame_glyph = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
            frame.render_widget(
                Paragraph::new(format!("{frame_glyph} scoring leads...")).centered(),
                status_area,
            );
        } else if let Some(message) = &snapshot.error {
            frame.render_widget(
                Paragraph::new(format!("Error fetching lead: {message}"))
                    .red()
                    .bold()
                    .centered(),
                status_area,
            );
        }

        if let Some(bundle) = &snapshot.data {
            let [top_area, score_area, email_area] = Layout::vertical([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .areas(results_area);
            render_panel(frame, top_area, &top_lead_title(bundle), &bundle.top_lead.lead_text);
            render_panel(frame, score_area, "Lead Score & Justification", &bundle.lead_score);
            render_panel(
                frame,
                email_area,
                "Suggested Prospecting Email",
                &bundle.prospect_email,
            );
        }
    }
}

fn render_panel(frame: &mut Frame, area: Rect, title: &str, text: &str) {
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(title.to_owned())),
        area,
    );
}

fn top_lead_title(bundle: &LeadBundle) -> String {
    format!("Top Lead (Score: {})", format_score(bundle.top_lead.score))
}

/// Two-decimal display formatting; the only transformation applied to the
/// service's payload.
pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}
