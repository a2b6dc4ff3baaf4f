use crate::app::{App, Focus};
use crate::selection::ValidationKind;
use crate::ui::pane_border_style;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const KEY_LABEL: &str = "API Key: ";

pub fn draw_model_selection(f: &mut Frame<'_>, area: Rect, app: &App) {
    let selection = &app.selection;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" AI Model Selection ")
        .border_style(pane_border_style(app, Focus::Model));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let key_rows = if selection.requires_api_key() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(key_rows),
            Constraint::Length(2),
        ])
        .split(inner);

    let items: Vec<ListItem> = selection
        .options()
        .iter()
        .map(|option| ListItem::new(option.label.as_str()))
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");
    let mut state = ListState::default().with_selected(selection.selected_index());
    f.render_stateful_widget(list, chunks[0], &mut state);

    if selection.requires_api_key() {
        let shown = selection.display_key();
        let key_line = if shown.is_empty() {
            Line::from(vec![
                Span::styled(KEY_LABEL, Style::default().fg(Color::Gray)),
                Span::styled(
                    "Enter your API key",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled(KEY_LABEL, Style::default().fg(Color::Gray)),
                Span::styled(shown.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    if selection.key_visible() { "  [hide]" } else { "  [show]" },
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        };
        f.render_widget(Paragraph::new(key_line), chunks[1]);

        if app.focus == Focus::Model && chunks[1].width > 0 {
            let cursor_x = chunks[1].x + (KEY_LABEL.width() + shown.width()) as u16;
            let max_x = chunks[1].x + chunks[1].width - 1;
            f.set_cursor_position((cursor_x.min(max_x), chunks[1].y));
        }
    }

    let feedback = match selection.validation_message() {
        Some(message) => {
            let color = match message.kind {
                ValidationKind::Error => Color::LightRed,
                ValidationKind::Success => Color::LightGreen,
            };
            Line::from(Span::styled(message.text.as_str(), Style::default().fg(color)))
        }
        None => {
            let hint = if selection.requires_api_key() {
                "Enter: Validate"
            } else {
                "Runs locally, no API key needed. Enter: Apply"
            };
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
        }
    };
    f.render_widget(Paragraph::new(feedback).wrap(Wrap { trim: true }), chunks[2]);
}
