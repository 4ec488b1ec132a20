//! Terminal chat client for the professor recommendation server.
//!
//! [`run`] launches the Ratatui interface. The building blocks it uses
//! ([`ChatSession`], [`ChatClient`], [`Utf8StreamDecoder`]) are exported for
//! non-interactive callers such as the `ask` command.

mod app;
mod client;
mod decoder;
mod event;
mod markdown;
mod session;
mod ui;

pub use app::STARTER_PROMPTS;
pub use client::{ChatClient, ClientError};
pub use decoder::Utf8StreamDecoder;
pub use markdown::render_markdown;
pub use session::{ChatSession, GREETING, SubmitError, Submission};

use anyhow::anyhow;
use app::{App, STATUS_STREAMING};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEvent,
    KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use event::AppEvent;
use log::{debug, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const PAGE_LINES: u16 = 5;

/// Configuration for a TUI session.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Full URL of the chat endpoint.
    pub server_url: String,
}

/// Launch the TUI against a running chat server.
///
/// The caller initializes logging before calling `run`.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built or the terminal fails.
pub async fn run(config: TuiConfig) -> anyhow::Result<()> {
    let client = ChatClient::new(config.server_url.clone())?;
    let mut app = App::new(config.server_url);
    info!("starting chat tui (server={})", client.url());

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_handler(tx.clone());

    let mut reply: Option<JoinHandle<()>> = None;
    let outcome = loop {
        if let Err(err) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(err.into());
        }
        let Some(event) = rx.recv().await else {
            break Err(anyhow!("event channel closed unexpectedly"));
        };
        if handle_app_event(event, &client, &mut app, &tx, &mut reply) {
            break Ok(());
        }
    };

    if let Some(handle) = reply.take() {
        handle.abort();
    }
    restore_terminal(&mut terminal)?;
    outcome
}

/// Dispatch a UI event and return true when the app should exit.
fn handle_app_event(
    event: AppEvent,
    client: &ChatClient,
    app: &mut App,
    sender: &mpsc::UnboundedSender<AppEvent>,
    reply: &mut Option<JoinHandle<()>>,
) -> bool {
    match event {
        AppEvent::Input(key) => return handle_input(key, client, app, sender, reply),
        AppEvent::Scroll(delta) if delta < 0 => app.scroll_up(delta.unsigned_abs()),
        AppEvent::Scroll(delta) => app.scroll_down(delta.unsigned_abs()),
        AppEvent::Delta { seq, text } => app.apply_delta(seq, &text),
        AppEvent::Finished { seq } => {
            app.finish_reply(seq);
            *reply = None;
        }
        AppEvent::Failed { seq, message } => {
            app.fail_reply(seq, &message);
            *reply = None;
        }
    }
    false
}

fn handle_input(
    key: KeyEvent,
    client: &ChatClient,
    app: &mut App,
    sender: &mpsc::UnboundedSender<AppEvent>,
    reply: &mut Option<JoinHandle<()>>,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Char('l') if ctrl => {
            if let Err(err) = app.clear_conversation() {
                app.push_status(format!("cannot clear: {err}"));
            }
        }
        KeyCode::Tab => {
            app.cycle_starter_prompt();
        }
        KeyCode::PageUp => app.scroll_up(PAGE_LINES),
        KeyCode::PageDown => app.scroll_down(PAGE_LINES),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.enable_auto_scroll(),
        KeyCode::Enter => match app.session.begin_submission(&app.input) {
            Ok(submission) => {
                app.input.clear();
                app.enable_auto_scroll();
                app.push_status(STATUS_STREAMING);
                *reply = Some(spawn_reply(client.clone(), submission, sender.clone()));
            }
            Err(SubmitError::Empty) => {}
            Err(err @ SubmitError::Busy) => {
                debug!("submission rejected: {err}");
                app.push_status(err.to_string());
            }
        },
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(ch) if !ctrl => app.input.push(ch),
        _ => {}
    }
    false
}

/// Stream one reply, tagging every event with the submission's sequence.
fn spawn_reply(
    client: ChatClient,
    submission: Submission,
    sender: mpsc::UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let seq = submission.seq;
        let deltas = sender.clone();
        let result = client
            .stream_reply(&submission.transcript, |text| {
                let _ = deltas.send(AppEvent::Delta {
                    seq,
                    text: text.to_string(),
                });
            })
            .await;
        let event = match result {
            Ok(_) => AppEvent::Finished { seq },
            Err(err) => {
                warn!("reply failed (seq={}): {}", seq, err);
                AppEvent::Failed {
                    seq,
                    message: err.to_string(),
                }
            }
        };
        let _ = sender.send(event);
    })
}

fn spawn_input_handler(sender: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        const MOUSE_SCROLL_LINES: i16 = 3;
        loop {
            let ready = tokio::task::spawn_blocking(|| {
                matches!(crossterm::event::poll(Duration::from_millis(50)), Ok(true))
            })
            .await
            .unwrap_or(false);
            if !ready {
                if sender.is_closed() {
                    break;
                }
                continue;
            }
            let event = match crossterm::event::read() {
                Ok(event) => event,
                Err(err) => {
                    warn!("terminal read failed: {}", err);
                    break;
                }
            };
            let app_event = match event {
                CrosstermEvent::Key(key) => AppEvent::Input(key),
                CrosstermEvent::Mouse(mouse) => {
                    let lines = if mouse.modifiers.contains(KeyModifiers::SHIFT) {
                        MOUSE_SCROLL_LINES.saturating_mul(2)
                    } else {
                        MOUSE_SCROLL_LINES
                    };
                    match mouse.kind {
                        MouseEventKind::ScrollUp => AppEvent::Scroll(-lines),
                        MouseEventKind::ScrollDown => AppEvent::Scroll(lines),
                        _ => continue,
                    }
                }
                _ => continue,
            };
            if sender.send(app_event).is_err() {
                break;
            }
        }
    });
}

/// Configure terminal in raw mode with alternate screen.
fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    debug!("setting up terminal");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    debug!("restoring terminal");
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
