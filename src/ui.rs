// src/ui.rs

pub mod footer;
pub mod header;
pub mod quit_confirm;

use crate::api::ChatBackend;
use crate::chat_view::draw_chat;
use crate::errors::ChatResult;
use crate::key_handlers::{handle_key_event, handle_mouse_event};
use crate::{App, AppState};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::{
    io, thread,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

const TICK_RATE: Duration = Duration::from_millis(250);
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Events fed from the input thread to the UI task.
enum Event {
    Input(CEvent),
    Tick,
}

/// Runs the terminal UI until the user quits.
pub async fn run_ui<B: ChatBackend>(mut app: App<B>) -> ChatResult<()> {
    let mut terminal = setup_terminal()?;

    let res = run_app(&mut terminal, &mut app).await;

    restore_terminal(terminal.backend_mut())?;
    terminal.show_cursor()?;

    if let Err(ref err) = res {
        log::error!("Terminal UI stopped: {}", err);
    }
    res
}

/// Enters raw mode and the alternate screen. Leaves the terminal as it was
/// if any step fails.
fn setup_terminal() -> ChatResult<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let terminal = execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .and_then(|_| Terminal::new(CrosstermBackend::new(stdout)));
    match terminal {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            if let Err(restore_err) = restore_terminal(&mut io::stdout()) {
                log::warn!("Failed to restore terminal: {}", restore_err);
            }
            Err(e.into())
        }
    }
}

fn restore_terminal<W: io::Write>(out: &mut W) -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(out, LeaveAlternateScreen, DisableMouseCapture)?;
    raw
}

async fn run_app<T: Backend, B: ChatBackend>(
    terminal: &mut Terminal<T>,
    app: &mut App<B>,
) -> ChatResult<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);
    spawn_input_thread(tx);

    app.status_indicator
        .set_status(format!("Connected to {}", app.server_url));

    loop {
        app.tick();
        terminal.draw(|f| ui(f, app))?;

        tokio::select! {
            event = rx.recv() => match event {
                Some(Event::Input(CEvent::Key(key))) => {
                    app.status_indicator.clear_status();
                    handle_key_event(key, app);
                }
                Some(Event::Input(CEvent::Mouse(mouse))) => handle_mouse_event(mouse, app),
                Some(Event::Input(_)) | Some(Event::Tick) => {}
                None => break,
            },
            Some(reply) = app.chat.next_reply() => app.chat.resolve(reply),
        }

        if app.should_quit() {
            break;
        }
    }

    if app.chat.in_flight() > 0 {
        log::info!("Quitting with {} replies outstanding", app.chat.in_flight());
    }
    Ok(())
}

/// Reads terminal events on a plain thread. Stops once the receiver is gone.
fn spawn_input_thread(tx: mpsc::Sender<Event>) {
    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            match event::poll(POLL_TIMEOUT) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if tx.blocking_send(Event::Input(event)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to read terminal event: {}", e);
                        return;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    log::error!("Failed to poll terminal events: {}", e);
                    return;
                }
            }

            if last_tick.elapsed() >= TICK_RATE {
                if tx.blocking_send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });
}

/// Draws one frame.
pub fn ui<B: ChatBackend>(f: &mut Frame, app: &mut App<B>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    header::draw_header(f, chunks[0], &app.server_url);
    draw_chat(f, app, chunks[1]);
    footer::draw_footer(f, chunks[2], app.state);

    if app.state == AppState::QuitConfirm {
        quit_confirm::draw_quit_confirm(f, centered_rect(50, 30, f.area()));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChatResult;
    use crate::models::Sender;
    use ratatui::backend::TestBackend;
    use std::future::Future;

    struct FixedBackend;

    impl ChatBackend for FixedBackend {
        fn send(&self, _message: String) -> impl Future<Output = ChatResult<String>> + Send {
            async { Ok("Visiting hours are 6-8pm.".to_string()) }
        }
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_frame_shows_conversation_and_send_button() {
        let mut app = App::new(FixedBackend, "http://127.0.0.1:5000");
        app.chat.append_message(Sender::User, "visiting hours?");
        app.chat.append_message(Sender::Bot, "Visiting hours are 6-8pm.");

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("visiting hours?"));
        assert!(text.contains("Visiting hours are 6-8pm."));
        assert!(text.contains("[ Send ]"));
        assert!(app.send_button.width > 0);
    }

    #[tokio::test]
    async fn test_drawn_button_accepts_clicks() {
        let mut app = App::new(FixedBackend, "http://127.0.0.1:5000");
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        app.chat.set_input("visiting hours?");
        let button = app.send_button;
        crate::key_handlers::handle_mouse_event(
            crossterm::event::MouseEvent {
                kind: crossterm::event::MouseEventKind::Down(crossterm::event::MouseButton::Left),
                column: button.x + 1,
                row: button.y + 1,
                modifiers: crossterm::event::KeyModifiers::NONE,
            },
            &mut app,
        );
        app.chat.settle().await;

        assert_eq!(
            app.chat.log().transcript(),
            vec![
                (Sender::User, "visiting hours?".to_string()),
                (Sender::Bot, "Visiting hours are 6-8pm.".to_string()),
            ]
        );
    }

    #[test]
    fn test_very_long_input_is_drawn() {
        let mut app = App::new(FixedBackend, "http://127.0.0.1:5000");
        app.chat.set_input(format!("{}z", "a".repeat(65532)));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("[ Send ]"));
        assert!(text.contains("az"));
        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < app.send_button.x);
    }

    #[test]
    fn test_restore_leaves_alternate_screen() {
        let mut out = Vec::new();
        restore_terminal(&mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1049l"));
        assert!(written.contains("\x1b[?1000l"));
    }

    #[test]
    fn test_quit_confirm_is_drawn() {
        let mut app = App::new(FixedBackend, "http://127.0.0.1:5000");
        app.state = AppState::QuitConfirm;

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        assert!(screen(&terminal).contains("Confirm Quit"));
    }
}
