use crate::api::{ChatBackend, HttpChatBackend};
use crate::chat_view::ChatView;
use crate::controller::ChatController;
use crate::status_indicator::StatusIndicator;
use ratatui::layout::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Chat,
    QuitConfirm,
    Quit,
}

/// State of the terminal UI.
pub struct App<B: ChatBackend = HttpChatBackend> {
    pub state: AppState,
    pub chat: ChatController<B, ChatView>,
    pub status_indicator: StatusIndicator,
    pub server_url: String,
    /// Where the send button was last drawn. Empty until the first frame.
    pub send_button: Rect,
}

impl<B: ChatBackend> App<B> {
    pub fn new(backend: B, server_url: impl Into<String>) -> Self {
        Self {
            state: AppState::Chat,
            chat: ChatController::new(backend, ChatView::new()),
            status_indicator: StatusIndicator::new(),
            server_url: server_url.into(),
            send_button: Rect::default(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quit
    }

    pub fn is_on_send_button(&self, column: u16, row: u16) -> bool {
        self.send_button.contains(Position::new(column, row))
    }

    /// Keeps the status line in step with outstanding requests.
    pub fn tick(&mut self) {
        self.status_indicator.set_waiting(self.chat.in_flight());
    }
}
