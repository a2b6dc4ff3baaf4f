use crate::app::{App, BackendStatus};
use crate::constants::APP_TITLE;
use crate::models::provider_for_model;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw_header(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} ", APP_TITLE),
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("✨", Style::default().fg(Color::LightBlue)),
    ]))
    .alignment(Alignment::Left);
    f.render_widget(title, chunks[0]);

    let (backend_icon, backend_style) = match &app.backend_status {
        BackendStatus::Unknown => ("○", Style::default().fg(Color::DarkGray)),
        BackendStatus::Online(_) => ("●", Style::default().fg(Color::LightGreen)),
        BackendStatus::Offline(_) => ("✗", Style::default().fg(Color::LightRed)),
    };

    let model = &app.validated().model;
    let provider = provider_for_model(model)
        .map(|p| p.name())
        .unwrap_or("unknown");

    let status = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} ", backend_icon), backend_style),
        Span::styled(app.backend_url.as_str(), Style::default().fg(Color::Gray)),
        Span::styled("  │  model: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} ({})", model, provider),
            Style::default().fg(Color::LightCyan),
        ),
    ]))
    .alignment(Alignment::Right);
    f.render_widget(status, chunks[1]);
}
