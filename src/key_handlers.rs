use crate::api::ChatBackend;
use crate::{App, AppState};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

const PAGE: u16 = 10;

pub fn handle_key_event<B: ChatBackend>(key: KeyEvent, app: &mut App<B>) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    match app.state {
        AppState::Chat => handle_chat_input(key, app),
        AppState::QuitConfirm => handle_quit_confirm_input(key, app),
        AppState::Quit => {}
    }
}

pub fn handle_chat_input<B: ChatBackend>(key: KeyEvent, app: &mut App<B>) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::QuitConfirm;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.state = AppState::QuitConfirm;
        }
        KeyCode::PageUp => app.chat.sink_mut().scroll_up(PAGE),
        KeyCode::PageDown => app.chat.sink_mut().scroll_down(PAGE),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat.sink_mut().scroll_up(1)
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat.sink_mut().scroll_down(1)
        }
        _ => {
            app.chat.handle_key(key);
        }
    }
    app.tick();
}

pub fn handle_quit_confirm_input<B: ChatBackend>(key: KeyEvent, app: &mut App<B>) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.state = AppState::Quit;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.state = AppState::Chat;
        }
        _ => {}
    }
}

pub fn handle_mouse_event<B: ChatBackend>(mouse: MouseEvent, app: &mut App<B>) {
    if app.state != AppState::Chat {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if app.is_on_send_button(mouse.column, mouse.row) => {
            app.chat.click_send();
        }
        MouseEventKind::ScrollUp => app.chat.sink_mut().scroll_up(1),
        MouseEventKind::ScrollDown => app.chat.sink_mut().scroll_down(1),
        _ => {}
    }
    app.tick();
}
