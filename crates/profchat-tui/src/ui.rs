//! Rendering routines for the profchat TUI.

use crate::app::{App, STATUS_IDLE, STATUS_STREAMING};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};

const PRIMARY: Color = Color::Rgb(236, 91, 43);
const SECONDARY: Color = Color::Rgb(238, 121, 72);
const TEXT: Color = Color::Rgb(238, 238, 238);
const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);
const BORDER: Color = Color::Rgb(60, 60, 60);
const BORDER_ACTIVE: Color = Color::Rgb(238, 121, 72);
const YELLOW: Color = Color::Rgb(229, 192, 123);
const RED: Color = Color::Rgb(255, 110, 110);

const HEADER_HEIGHT: u16 = 3;
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, root[0]);
    draw_chat(frame, app, root[1]);
    draw_input(frame, app, root[2]);
    draw_status_bar(frame, app, root[3]);
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(area);

    let line = Line::from(vec![
        Span::styled(
            " Rate My Professor",
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  v{VERSION}"), Style::default().fg(TEXT_MUTED)),
        Span::styled("  server ", Style::default().fg(TEXT_MUTED)),
        Span::styled(app.server_url.as_str(), Style::default().fg(TEXT)),
    ]);

    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(line), inner);
}

/// Draw the chat transcript with border and scrollbar.
fn draw_chat(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let lines = app.render_lines();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(" Chat ", Style::default().fg(TEXT_MUTED)));

    let inner = block.inner(area);
    let content_width = inner.width.saturating_sub(1);
    let content_height = inner.height as usize;

    let total_lines = Paragraph::new(lines.clone())
        .wrap(Wrap { trim: false })
        .line_count(content_width)
        .max(1);

    let max_scroll = total_lines.saturating_sub(content_height) as u16;
    app.update_scroll_bounds(max_scroll);
    let scroll = app.scroll;

    let chat_area = Rect {
        width: content_width,
        ..inner
    };
    let chat = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(block, area);
    frame.render_widget(chat, chat_area);

    if total_lines > content_height {
        let mut state = ScrollbarState::default()
            .content_length(total_lines)
            .position(scroll as usize)
            .viewport_content_length(content_height);
        let scrollbar_area = Rect {
            x: inner.x + content_width,
            width: 1,
            ..inner
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(BORDER))
                .thumb_style(Style::default().fg(TEXT_MUTED)),
            scrollbar_area,
            &mut state,
        );
    }
}

/// Draw the input box; it stays editable while a reply streams.
fn draw_input(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let busy = app.session.is_busy();
    let (title, title_color, border_color) = if busy {
        (" Answering... ", PRIMARY, BORDER)
    } else {
        (" Ask about a professor ", SECONDARY, BORDER_ACTIVE)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title, Style::default().fg(title_color)));
    let inner = block.inner(area);

    let prompt = Span::styled(" ", Style::default().fg(PRIMARY));
    let text = if app.input.is_empty() {
        Line::from(vec![
            prompt,
            Span::styled("Type a message...", Style::default().fg(TEXT_MUTED)),
        ])
    } else {
        Line::from(vec![
            prompt,
            Span::styled(app.input.as_str(), Style::default().fg(TEXT)),
        ])
    };

    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(text), inner);

    let typed = app.input.chars().count() as u16;
    let cursor_x = inner.x.saturating_add(1).saturating_add(typed);
    frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let status_color = match app.status.as_str() {
        STATUS_STREAMING => PRIMARY,
        STATUS_IDLE => TEXT_MUTED,
        status if status.starts_with("error") => RED,
        _ => YELLOW,
    };

    let key = Style::default().fg(TEXT_MUTED);
    let label = Style::default().fg(BORDER);
    let shortcuts = vec![
        Span::styled(" Enter", key),
        Span::styled(" send", label),
        Span::styled("  Tab", key),
        Span::styled(" prompt", label),
        Span::styled("  Ctrl+L", key),
        Span::styled(" clear", label),
        Span::styled("  PgUp/PgDn", key),
        Span::styled(" scroll", label),
        Span::styled("  Esc", key),
        Span::styled(" quit", label),
    ];

    let right_text = format!(" {} ", app.status);
    let right_len = (right_text.chars().count() as u16).min(area.width);
    let left_area = Rect {
        width: area.width.saturating_sub(right_len),
        ..area
    };
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len),
        width: right_len,
        ..area
    };

    frame.render_widget(Paragraph::new(Line::from(shortcuts)), left_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right_text,
            Style::default().fg(status_color),
        ))),
        right_area,
    );
}
