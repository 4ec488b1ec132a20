//! Application state for the profchat TUI.

use crate::markdown::render_markdown;
use crate::session::{ChatSession, SubmitError};
use log::{debug, info};
use profchat_protocol::Role;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::cmp::min;

/// Suggestions offered before the first question.
pub const STARTER_PROMPTS: [&str; 4] = [
    "Show me top 3 professors on computer science",
    "Show me top 3 professors on communication",
    "Show me top 3 professors on mathematics",
    "Show me top 3 professors on biology",
];

pub const STATUS_IDLE: &str = "idle";
pub const STATUS_STREAMING: &str = "streaming";

/// Top-level application state for the TUI.
pub struct App {
    /// Conversation and in-flight guard.
    pub session: ChatSession,
    /// Current input buffer.
    pub input: String,
    /// Status line text.
    pub status: String,
    /// Endpoint shown in the header.
    pub server_url: String,
    /// Starter prompt most recently placed in the input.
    pub starter: Option<usize>,
    /// Current scroll offset.
    pub scroll: u16,
    /// Whether to auto-scroll to the bottom.
    pub auto_scroll: bool,
    /// Maximum scroll offset for the chat view.
    pub chat_max_scroll: u16,
}

impl App {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            session: ChatSession::new(),
            input: String::new(),
            status: STATUS_IDLE.to_string(),
            server_url: server_url.into(),
            starter: None,
            scroll: 0,
            auto_scroll: true,
            chat_max_scroll: 0,
        }
    }

    /// Set the status line.
    pub fn push_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Replace the input with the next starter prompt.
    ///
    /// Only offered until the conversation has started.
    pub fn cycle_starter_prompt(&mut self) -> bool {
        if self.session.has_started() {
            return false;
        }
        let next = self
            .starter
            .map_or(0, |idx| (idx + 1) % STARTER_PROMPTS.len());
        self.starter = Some(next);
        self.input = STARTER_PROMPTS[next].to_string();
        true
    }

    /// Reset the conversation to the greeting when no reply is streaming.
    pub fn clear_conversation(&mut self) -> Result<(), SubmitError> {
        self.session.reset()?;
        info!("conversation cleared");
        self.starter = None;
        self.scroll = 0;
        self.chat_max_scroll = 0;
        self.auto_scroll = true;
        self.push_status(STATUS_IDLE);
        Ok(())
    }

    /// Apply a streamed delta and keep the view pinned if it was.
    pub fn apply_delta(&mut self, seq: u64, text: &str) {
        if self.session.apply_delta(seq, text) {
            self.maybe_enable_auto_scroll();
        }
    }

    pub fn finish_reply(&mut self, seq: u64) {
        if self.session.finish(seq) {
            debug!("reply finished (seq={})", seq);
            self.push_status(STATUS_IDLE);
        }
    }

    pub fn fail_reply(&mut self, seq: u64, message: &str) {
        if self.session.fail(seq, message) {
            self.push_status(format!("error: {message}"));
        }
    }

    /// Scroll the chat view upward by a number of lines.
    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scroll the chat view downward by a number of lines.
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = min(self.scroll.saturating_add(lines), self.chat_max_scroll);
        if self.scroll >= self.chat_max_scroll {
            self.auto_scroll = true;
        }
    }

    /// Scroll to the top of the chat view.
    pub fn scroll_to_top(&mut self) {
        self.auto_scroll = false;
        self.scroll = 0;
    }

    /// Enable auto-scrolling to the bottom.
    pub fn enable_auto_scroll(&mut self) {
        self.auto_scroll = true;
        self.scroll = self.chat_max_scroll;
    }

    /// Update scroll bounds after layout changes.
    ///
    /// Snaps to the new bottom only when following output or already there.
    pub fn update_scroll_bounds(&mut self, max_scroll: u16) {
        let was_at_bottom = self.scroll >= self.chat_max_scroll;
        self.chat_max_scroll = max_scroll;
        if self.auto_scroll || was_at_bottom {
            self.scroll = max_scroll;
            self.auto_scroll = true;
        } else {
            self.scroll = self.scroll.min(max_scroll);
        }
    }

    fn maybe_enable_auto_scroll(&mut self) {
        if self.auto_scroll {
            self.scroll = self.chat_max_scroll;
        }
    }

    /// Render the conversation into styled lines for the chat pane.
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let turns = self.session.turns();
        let badge = Style::default()
            .fg(Color::Rgb(10, 10, 10))
            .add_modifier(Modifier::BOLD);
        let text = Style::default().fg(Color::Rgb(238, 238, 238));

        for (idx, turn) in turns.iter().enumerate() {
            let (label, bg) = match turn.role {
                Role::User => (" you ", Color::Rgb(107, 161, 230)),
                Role::Model => (" assistant ", Color::Rgb(238, 121, 72)),
            };
            lines.push(Line::from(Span::styled(label, badge.bg(bg))));

            let streaming = self.session.is_busy() && idx + 1 == turns.len();
            if streaming && turn.content.is_empty() {
                lines.push(Line::from(Span::styled(
                    " …",
                    Style::default().fg(Color::Rgb(128, 128, 128)),
                )));
            } else if turn.role == Role::User {
                lines.extend(
                    turn.content
                        .lines()
                        .map(|line| Line::from(Span::styled(format!(" {line}"), text))),
                );
            } else {
                lines.extend(render_markdown(&turn.content, text));
            }

            if idx + 1 < turns.len() {
                lines.push(Line::from(""));
            }
        }

        if !self.session.has_started() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                " Try one of these (Tab to cycle):",
                Style::default().fg(Color::Rgb(128, 128, 128)),
            )));
            for (idx, prompt) in STARTER_PROMPTS.iter().enumerate() {
                let style = if self.starter == Some(idx) {
                    Style::default().fg(Color::Rgb(238, 121, 72))
                } else {
                    Style::default().fg(Color::Rgb(170, 170, 170))
                };
                lines.push(Line::from(Span::styled(format!("   › {prompt}"), style)));
            }
        }

        if let Some(error) = self.session.last_error() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" error: {error}"),
                Style::default().fg(Color::Rgb(255, 110, 110)),
            )));
        }

        // Trailing padding keeps the last wrapped line reachable.
        lines.push(Line::from(""));
        lines
    }
}
