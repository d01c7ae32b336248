use crate::models::{Message, Sender};
use chrono::{DateTime, Local};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

/// Terminal rendering of one [`Message`]. Text is shown verbatim; nothing in
/// it is interpreted as markup.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    content: String,
    sender: Sender,
    timestamp: DateTime<Local>,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            content: message.text().to_string(),
            sender: message.sender(),
            timestamp: message.created_at(),
        }
    }
}

impl ChatMessage {
    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Lines for a panel `width` cells wide.
    pub fn render(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let style = self.base_style();

        self.render_header(&mut lines, style);
        self.render_content(&mut lines, width, style);
        self.render_footer(&mut lines, style);

        lines
    }

    fn base_style(&self) -> Style {
        Style::default().fg(match self.sender {
            Sender::User => Color::Rgb(255, 223, 128),
            Sender::Bot => Color::Rgb(144, 238, 144),
        })
    }

    fn indent(&self) -> &'static str {
        match self.sender {
            Sender::User => "  ",
            Sender::Bot => "",
        }
    }

    fn label(&self) -> &'static str {
        match self.sender {
            Sender::User => "you",
            Sender::Bot => "bot",
        }
    }

    fn render_header(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let timestamp = self.timestamp.format("%H:%M").to_string();

        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("┌─ ".to_string(), style),
            Span::styled(self.label().to_string(), style.add_modifier(Modifier::BOLD)),
            Span::styled(" ".to_string(), style),
            Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
        ]));
    }

    fn render_content(&self, lines: &mut Vec<Line<'static>>, width: u16, style: Style) {
        let indent = self.indent();
        let wrap_width = (width as usize)
            .saturating_sub(indent.len() + 2)
            .max(1);

        // An empty message still gets one (empty) body line.
        let body: Vec<&str> = if self.content.is_empty() {
            vec![""]
        } else {
            self.content.lines().collect()
        };

        for raw_line in body {
            let wrapped = wrap(raw_line, wrap_width);
            if wrapped.is_empty() {
                lines.push(self.body_line(indent, String::new(), style));
                continue;
            }
            for wrapped_line in wrapped {
                lines.push(self.body_line(indent, wrapped_line.into_owned(), style));
            }
        }
    }

    fn body_line(&self, indent: &str, text: String, style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled(text, style),
        ])
    }

    fn render_footer(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("╰─".to_string(), style),
        ]));
    }
}
