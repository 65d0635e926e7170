//! TUI event types for input and dispatch results.

use crossterm::event::KeyEvent;
use helpdesk_rs_core::TurnOutcome;
use helpdesk_rs_protocol::TurnId;

/// Application event emitted by input handlers or dispatch tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event.
    Input(KeyEvent),
    /// Periodic tick event.
    Tick,
    /// Scroll event in the chat view.
    Scroll(i16),
    /// A dispatched turn finished.
    TurnSettled { id: TurnId, outcome: TurnOutcome },
}
