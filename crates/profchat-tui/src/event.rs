//! TUI event types for input and reply streaming.

use crossterm::event::KeyEvent;

/// Application event emitted by input handlers or a reply task.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event.
    Input(KeyEvent),
    /// Scroll event in the chat view.
    Scroll(i16),
    /// Decoded text for the reply tagged `seq`.
    Delta { seq: u64, text: String },
    /// The reply tagged `seq` ended normally.
    Finished { seq: u64 },
    /// The reply tagged `seq` failed.
    Failed { seq: u64, message: String },
}
