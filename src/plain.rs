//! Line-based front end for pipes and dumb terminals.

use crate::api::ChatBackend;
use crate::constants::{BOT_PREFIX, USER_PREFIX};
use crate::controller::ChatController;
use crate::conversation::RenderSink;
use crate::errors::ChatResult;
use crate::models::{Message, Sender};
use colored::Colorize;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::io::{self, IsTerminal, Write};
use std::thread;
use tokio::sync::mpsc;

const PROMPT: &str = "> ";

/// Writes each message as one tagged line, e.g. `bot> Hello!`.
pub struct TranscriptPrinter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TranscriptPrinter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }
}

impl<W: Write> RenderSink for TranscriptPrinter<W> {
    fn render(&mut self, message: &Message) {
        if let Err(e) = writeln!(self.out, "{}", format_line(message, self.color)) {
            log::warn!("Failed to print message: {}", e);
        }
    }

    fn scroll_to_latest(&mut self) {
        if let Err(e) = self.out.flush() {
            log::warn!("Failed to flush output: {}", e);
        }
    }
}

pub fn format_line(message: &Message, color: bool) -> String {
    let prefix = match message.sender() {
        Sender::User => USER_PREFIX,
        Sender::Bot => BOT_PREFIX,
    };
    if !color {
        return format!("{}{}", prefix, message.text());
    }
    let prefix = match message.sender() {
        Sender::User => prefix.bold().yellow(),
        Sender::Bot => prefix.bold().green(),
    };
    format!("{}{}", prefix, message.text())
}

enum PromptEvent {
    Line(String),
    Eof,
}

/// Reads lines until end of input, sending each one. Waits for outstanding
/// replies before returning.
pub async fn run_plain<B: ChatBackend>(backend: B) -> ChatResult<()> {
    let color = io::stdout().is_terminal();
    let mut chat = ChatController::new(backend, TranscriptPrinter::new(io::stdout(), color));

    let (tx, mut rx) = mpsc::channel::<PromptEvent>(16);
    spawn_reader(tx);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(PromptEvent::Line(line)) => {
                    chat.set_input(line);
                    chat.send_message();
                }
                Some(PromptEvent::Eof) | None => break,
            },
            Some(reply) = chat.next_reply() => chat.resolve(reply),
        }
    }

    chat.settle().await;
    Ok(())
}

fn spawn_reader(tx: mpsc::Sender<PromptEvent>) {
    thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                log::error!("Failed to start line editor: {}", e);
                let _ = tx.blocking_send(PromptEvent::Eof);
                return;
            }
        };

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if tx.blocking_send(PromptEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    log::error!("Failed to read line: {}", e);
                    break;
                }
            }
        }
        let _ = tx.blocking_send(PromptEvent::Eof);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RESPONSE_UNAVAILABLE;
    use crate::errors::ChatError;
    use reqwest::StatusCode;
    use std::future::Future;

    struct Backend;

    impl ChatBackend for Backend {
        fn send(&self, message: String) -> impl Future<Output = ChatResult<String>> + Send {
            async move {
                if message == "down?" {
                    Err(ChatError::status_error(StatusCode::BAD_GATEWAY))
                } else {
                    Ok(format!("You said: {}", message))
                }
            }
        }
    }

    #[test]
    fn test_format_line_without_color() {
        let user = Message::new(Sender::User, "hi");
        let bot = Message::new(Sender::Bot, "<b>hello</b>");
        assert_eq!(format_line(&user, false), "you> hi");
        assert_eq!(format_line(&bot, false), "bot> <b>hello</b>");
    }

    #[test]
    fn test_format_line_with_color_keeps_text() {
        let bot = Message::new(Sender::Bot, "hello");
        assert!(format_line(&bot, true).ends_with("hello"));
    }

    #[tokio::test]
    async fn test_transcript_of_exchanges() {
        let mut chat = ChatController::new(Backend, TranscriptPrinter::new(Vec::new(), false));

        chat.set_input("  hi ");
        chat.send_message();
        chat.settle().await;

        chat.set_input("   ");
        chat.send_message();

        chat.set_input("down?");
        chat.send_message();
        chat.settle().await;

        let output = String::from_utf8(chat.sink().out.clone()).unwrap();
        assert_eq!(
            output,
            format!(
                "you> hi\nbot> You said: hi\nyou> down?\nbot> {}\n",
                RESPONSE_UNAVAILABLE
            )
        );
    }
}
