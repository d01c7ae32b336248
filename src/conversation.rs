// src/conversation.rs

use crate::models::{Message, Sender};

/// Consumer of rendered messages.
///
/// The controller hands every appended message to its sink exactly once, in
/// log order, and asks it to bring the newest entry into view afterwards.
/// Rendering cannot fail from the controller's point of view; a sink that
/// writes somewhere fallible logs its own errors.
pub trait RenderSink {
    fn render(&mut self, message: &Message);

    fn scroll_to_latest(&mut self) {}
}

/// Append-only, ordered record of the conversation.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<Message>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// `(sender, text)` pairs in log order.
    pub fn transcript(&self) -> Vec<(Sender, String)> {
        self.messages
            .iter()
            .map(|m| (m.sender(), m.text().to_string()))
            .collect()
    }
}
