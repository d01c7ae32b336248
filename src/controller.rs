use crate::{
    api::ChatBackend,
    constants::RESPONSE_UNAVAILABLE,
    conversation::{ChatLog, RenderSink},
    errors::ChatResult,
    models::{Message, Sender},
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Sequence number of a send action. Only used for logging; replies are not
/// matched back to their requests.
pub type RequestId = u64;

/// Completion of one request, delivered back to the UI task.
#[derive(Debug)]
pub struct Reply {
    pub request: RequestId,
    pub outcome: ChatResult<String>,
}

/// Turns send actions into requests and renders both sides of each exchange.
///
/// The controller lives on the UI task. Requests run on their own tasks and
/// hand their outcome back through a channel; only [`ChatController::resolve`]
/// appends bot messages, so the log is only ever touched from one place.
pub struct ChatController<B, S> {
    backend: Arc<B>,
    sink: S,
    log: ChatLog,
    input: String,
    next_request: RequestId,
    in_flight: usize,
    replies_tx: mpsc::UnboundedSender<Reply>,
    replies_rx: mpsc::UnboundedReceiver<Reply>,
}

impl<B: ChatBackend, S: RenderSink> ChatController<B, S> {
    pub fn new(backend: B, sink: S) -> Self {
        Self::with_shared_backend(Arc::new(backend), sink)
    }

    pub fn with_shared_backend(backend: Arc<B>, sink: S) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            sink,
            log: ChatLog::new(),
            input: String::new(),
            next_request: 1,
            in_flight: 0,
            replies_tx,
            replies_rx,
        }
    }

    /// Records a message, renders it at the end of the view and scrolls to it.
    pub fn append_message(&mut self, sender: Sender, text: impl Into<String>) {
        let message = self.log.push(Message::new(sender, text));
        self.sink.render(message);
        self.sink.scroll_to_latest();
        log::trace!("Appended {} message ({} in log)", sender, self.log.len());
    }

    /// Sends the current input.
    ///
    /// Blank input is ignored and left as it is. Otherwise the trimmed text is
    /// appended as a user message, the input is cleared and one request is
    /// spawned. Must be called from within a tokio runtime.
    pub fn send_message(&mut self) -> Option<RequestId> {
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return None;
        }

        self.append_message(Sender::User, message.clone());
        self.clear_input();

        let request = self.next_request;
        self.next_request += 1;
        self.in_flight += 1;
        log::debug!("Request #{} issued ({} in flight)", request, self.in_flight);

        let backend = Arc::clone(&self.backend);
        let replies = self.replies_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.send(message).await;
            // The receiver lives as long as the controller.
            let _ = replies.send(Reply { request, outcome });
        });

        Some(request)
    }

    /// Same as pressing Enter.
    pub fn click_send(&mut self) -> Option<RequestId> {
        self.send_message()
    }

    /// Enter sends; printable characters and Backspace edit the input.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<RequestId> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Enter if !chord => self.send_message(),
            KeyCode::Char(c) if !chord => {
                self.push_char(c);
                None
            }
            KeyCode::Backspace => {
                self.backspace();
                None
            }
            _ => None,
        }
    }

    /// Appends the bot side of an exchange.
    pub fn resolve(&mut self, reply: Reply) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match reply.outcome {
            Ok(text) => {
                log::debug!("Request #{} answered", reply.request);
                self.append_message(Sender::Bot, text);
            }
            Err(e) => {
                log::warn!("Request #{} failed: {}", reply.request, e);
                self.append_message(Sender::Bot, RESPONSE_UNAVAILABLE);
            }
        }
    }

    /// Waits for the next finished request. Resolve it with [`Self::resolve`].
    pub async fn next_reply(&mut self) -> Option<Reply> {
        self.replies_rx.recv().await
    }

    /// Resolves every reply that has already arrived. Returns how many.
    pub fn drain_replies(&mut self) -> usize {
        let mut resolved = 0;
        while let Ok(reply) = self.replies_rx.try_recv() {
            self.resolve(reply);
            resolved += 1;
        }
        resolved
    }

    /// Waits until every issued request has been resolved.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.replies_rx.recv().await {
                Some(reply) => self.resolve(reply),
                None => break,
            }
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
