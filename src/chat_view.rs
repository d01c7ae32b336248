use crate::chat_message::ChatMessage;
use crate::constants::SEND_BUTTON_LABEL;
use crate::conversation::RenderSink;
use crate::models::Message;
use crate::{api::ChatBackend, App};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// The message panel of the terminal UI. Receives messages from the
/// controller and keeps the scroll position.
#[derive(Debug)]
pub struct ChatView {
    entries: Vec<ChatMessage>,
    scroll: u16,
    follow: bool,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scroll: 0,
            follow: true,
        }
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scrolling past the bottom is clamped when drawn, and turns following
    /// back on.
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    /// All message lines for a panel `width` cells wide, with a blank line
    /// between messages.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in &self.entries {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.extend(message.render(width));
        }
        lines
    }

    /// Scroll offset to use for `total_lines` in a panel `height` rows tall.
    pub fn visible_scroll(&mut self, total_lines: u16, height: u16) -> u16 {
        let max_scroll = total_lines.saturating_sub(height);
        if self.follow || self.scroll >= max_scroll {
            self.follow = true;
            self.scroll = max_scroll;
        }
        self.scroll
    }
}

impl RenderSink for ChatView {
    fn render(&mut self, message: &Message) {
        self.entries.push(ChatMessage::from(message));
    }

    fn scroll_to_latest(&mut self) {
        self.follow = true;
    }
}

pub fn draw_chat<B: ChatBackend>(f: &mut Frame, app: &mut App<B>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(2),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    draw_messages(f, app, chunks[0]);

    app.status_indicator.update_spinner();
    app.status_indicator.render(f, chunks[1]);

    draw_input(f, app, chunks[2]);
}

fn draw_messages<B: ChatBackend>(f: &mut Frame, app: &mut App<B>, area: Rect) {
    let view = app.chat.sink_mut();
    let lines = view.lines(area.width);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let scroll = view.visible_scroll(total_lines, area.height);

    let messages = Paragraph::new(lines).block(Block::default());
    f.render_widget(messages.scroll((scroll, 0)), area);
}

fn draw_input<B: ChatBackend>(f: &mut Frame, app: &mut App<B>, area: Rect) {
    let button_width = SEND_BUTTON_LABEL.width() as u16;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(button_width + 2)])
        .split(area);

    let input_area = chunks[0];
    let input_text = app.chat.input();
    let visible_width = input_area.width.saturating_sub(4);
    let text_width = u16::try_from(input_text.width()).unwrap_or(u16::MAX);
    let scroll_offset = text_width.saturating_sub(visible_width);

    let input = Line::from(vec![
        Span::styled("→ ", Style::default().fg(Color::DarkGray)),
        Span::styled(input_text.to_string(), Style::default().fg(Color::White)),
    ]);
    f.render_widget(
        Paragraph::new(input)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .scroll((0, scroll_offset)),
        input_area,
    );

    let button_style = if app.chat.input().trim().is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    };
    f.render_widget(
        Paragraph::new(Span::styled(SEND_BUTTON_LABEL, button_style)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        chunks[1],
    );
    app.send_button = chunks[1];

    // border plus the two-cell arrow
    let cursor_x = input_area
        .x
        .saturating_add(3)
        .saturating_add(text_width.min(visible_width));
    f.set_cursor_position((cursor_x, input_area.y + 1));
}
