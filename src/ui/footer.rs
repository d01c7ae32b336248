use crate::AppState;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Draws the footer with instructions for the current state.
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, state: AppState) {
    let instructions = match state {
        AppState::Chat => {
            "Enter or [ Send ] to send. PgUp/PgDn to scroll. Esc to quit."
        }
        AppState::QuitConfirm => "Press 'y' to confirm quit or 'n' to cancel.",
        AppState::Quit => "",
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(footer, area);
}
