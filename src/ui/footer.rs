use crate::app::{App, AppState, Focus};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Draws the footer with instructions for the focused pane
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &App) {
    let instructions = match (app.state, app.focus) {
        (AppState::QuitConfirm, _) => "Press 'y' to confirm quit or 'n' to cancel.",
        (_, Focus::Upload) => {
            "Type or drop paths, Enter: upload, Ctrl+U: clear. Tab: next pane, Esc: quit."
        }
        (_, Focus::Model) if app.selection.requires_api_key() => {
            "Up/Down: model, type key, Ctrl+V: show/hide, Enter: validate. Tab: next pane."
        }
        (_, Focus::Model) => "Up/Down: model, Enter: apply. Tab: next pane, Esc: quit.",
        (_, Focus::Chat) if app.keyboard_enhanced => {
            "Enter: send, Shift+Enter: new line, PgUp/PgDn: scroll. Tab: pane, Esc: quit."
        }
        (_, Focus::Chat) => {
            "Enter: send, Alt+Enter: new line, PgUp/PgDn: scroll. Tab: pane, Esc: quit."
        }
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(footer, area);
}
