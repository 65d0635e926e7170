//! Library entry point for the help desk TUI.
//!
//! Provides a reusable [`run`] function that launches the Ratatui terminal UI
//! against a prepared [`HelpDesk`] and [`Dispatcher`].

mod app;
mod event;
mod render;
mod ui;

use anyhow::anyhow;
use app::{App, Focus};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEvent,
    KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use event::AppEvent;
use helpdesk_rs_core::{Dispatcher, HelpDesk, PendingTurn};
use log::{debug, info};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Settings for the TUI session.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Largest file accepted by `/attach`.
    pub max_attachment_bytes: u64,
}

/// Launch the TUI.
///
/// The caller is responsible for building the console and dispatcher from
/// config and for initializing logging before calling `run`.
///
/// # Errors
/// Returns an error if terminal setup or the event loop fails.
pub async fn run(
    desk: HelpDesk,
    dispatcher: Arc<Dispatcher>,
    config: TuiConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(desk, config.max_attachment_bytes);
    info!(
        "starting TUI (tool={}, tools={})",
        app.desk.active_tool().id,
        app.desk.catalog().len()
    );

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::channel(256);
    spawn_input_handler(tx.clone());
    spawn_tick(tx.clone());

    let result = async {
        loop {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
            let event = rx
                .recv()
                .await
                .ok_or_else(|| anyhow!("event channel closed unexpectedly"))?;
            if handle_app_event(event, &dispatcher, &mut app, &tx) {
                break;
            }
        }
        anyhow::Ok(())
    }
    .await;

    // Abandon any turn still running so its task stops polling.
    app.desk.reset();
    restore_terminal(&mut terminal)?;
    result
}

/// Dispatch a UI event and return true when the app should exit.
fn handle_app_event(
    event: AppEvent,
    dispatcher: &Arc<Dispatcher>,
    app: &mut App,
    sender: &mpsc::Sender<AppEvent>,
) -> bool {
    match event {
        AppEvent::Input(key) => handle_input(key, dispatcher, app, sender),
        AppEvent::Scroll(delta) => {
            if delta < 0 {
                app.scroll_up(delta.unsigned_abs());
            } else if delta > 0 {
                app.scroll_down(delta.unsigned_abs());
            }
            false
        }
        AppEvent::Tick => {
            app.on_tick();
            false
        }
        AppEvent::TurnSettled { id, outcome } => {
            app.settle(id, outcome);
            false
        }
    }
}

/// Handle keyboard input and dispatch actions.
fn handle_input(
    key: KeyEvent,
    dispatcher: &Arc<Dispatcher>,
    app: &mut App,
    sender: &mpsc::Sender<AppEvent>,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return true,
            KeyCode::Char('t') => {
                app.toggle_overlay();
                return false;
            }
            _ => {}
        }
    }
    match key.code {
        KeyCode::Esc => {
            if app.focus == Focus::Search {
                app.clear_search();
                app.focus = Focus::Sidebar;
                return false;
            }
            if app.desk.selector().overlay_open() {
                app.close_overlay();
                return false;
            }
            return true;
        }
        KeyCode::Tab => {
            app.focus_next();
            return false;
        }
        KeyCode::PageUp => {
            app.scroll_up(5);
            return false;
        }
        KeyCode::PageDown => {
            app.scroll_down(5);
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Sidebar => handle_sidebar_input(key, app),
        Focus::Search => handle_search_input(key, app),
        Focus::Input => handle_composer_input(key, dispatcher, app, sender),
    }
    false
}

fn handle_sidebar_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up => app.move_cursor(-1),
        KeyCode::Down => app.move_cursor(1),
        KeyCode::Left => app.collapse_row(),
        KeyCode::Right => app.expand_row(),
        KeyCode::Enter => activate_row(app),
        KeyCode::Char('/') => app.focus = Focus::Search,
        _ => {}
    }
}

fn handle_search_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up => app.move_cursor(-1),
        KeyCode::Down => app.move_cursor(1),
        KeyCode::Enter => activate_row(app),
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.push_search_char(ch)
        }
        _ => {}
    }
}

fn activate_row(app: &mut App) {
    if let Err(err) = app.activate_row() {
        app.status = err.to_string();
    }
}

fn handle_composer_input(
    key: KeyEvent,
    dispatcher: &Arc<Dispatcher>,
    app: &mut App,
    sender: &mpsc::Sender<AppEvent>,
) {
    match key.code {
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.enable_auto_scroll(),
        KeyCode::Enter => {
            if let Some(turn) = app.submit() {
                spawn_turn(dispatcher.clone(), turn, sender.clone());
            }
        }
        KeyCode::Backspace => app.pop_input_char(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.push_input_char(ch)
        }
        _ => {}
    }
}

/// Run a turn on its own task and report the outcome by turn id.
fn spawn_turn(dispatcher: Arc<Dispatcher>, turn: PendingTurn, sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let PendingTurn {
            id,
            request,
            cancel,
        } = turn;
        debug!("dispatching turn (turn_id={}, tool={})", id, request.tool.id);
        let outcome = dispatcher.dispatch(request, &cancel).await;
        let _ = sender.send(AppEvent::TurnSettled { id, outcome }).await;
    });
}

/// Spawn a task to poll for input events.
fn spawn_input_handler(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        const MOUSE_SCROLL_LINES: i16 = 3;
        loop {
            if matches!(crossterm::event::poll(Duration::from_millis(30)), Ok(true)) {
                while matches!(crossterm::event::poll(Duration::from_millis(0)), Ok(true)) {
                    let event = match crossterm::event::read() {
                        Ok(event) => event,
                        Err(_) => break,
                    };
                    let sent = match event {
                        CrosstermEvent::Key(key) => sender.send(AppEvent::Input(key)).await,
                        CrosstermEvent::Mouse(mouse) => match mouse.kind {
                            MouseEventKind::ScrollUp => {
                                sender.send(AppEvent::Scroll(-MOUSE_SCROLL_LINES)).await
                            }
                            MouseEventKind::ScrollDown => {
                                sender.send(AppEvent::Scroll(MOUSE_SCROLL_LINES)).await
                            }
                            _ => Ok(()),
                        },
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    });
}

/// Spawn a periodic tick event generator.
fn spawn_tick(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if sender.send(AppEvent::Tick).await.is_err() {
                return;
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
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal state on exit.
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
