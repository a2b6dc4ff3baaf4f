use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn draw_quit_confirm(f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Confirm Quit")
        .style(Style::default().fg(Color::LightYellow).bg(Color::Black));

    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let text = vec![
        Line::from(Span::styled("Are you sure you want to quit?", bold)),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("'y'", bold.fg(Color::LightGreen)),
            Span::raw(" to quit or "),
            Span::styled("'n'", bold.fg(Color::LightRed)),
            Span::raw(" to cancel."),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
