use crate::app::{App, Focus};
use crate::ui::pane_border_style;
use crate::upload::{UploadStatus, SUPPORTED_LABEL};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn draw_upload(f: &mut Frame<'_>, area: Rect, app: &App) {
    let panel = &app.upload;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Upload Documents ")
        .border_style(pane_border_style(app, Focus::Upload));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // path input
            Constraint::Length(1), // supported types
            Constraint::Length(2), // status banner
            Constraint::Min(1),    // queue
        ])
        .split(inner);

    let prefix = "→ ";
    let input_line = if panel.input().is_empty() {
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(Color::DarkGray)),
            Span::styled(
                "drop files here or type a path",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(Color::DarkGray)),
            Span::styled(panel.input(), Style::default().fg(Color::White)),
        ])
    };

    let input_width = (prefix.width() + panel.input().width()) as u16;
    let scroll_offset = (input_width + 1).saturating_sub(chunks[0].width);
    f.render_widget(Paragraph::new(input_line).scroll((0, scroll_offset)), chunks[0]);

    f.render_widget(
        Paragraph::new(SUPPORTED_LABEL).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );

    let mut banner = Vec::new();
    if panel.status() != UploadStatus::Idle {
        let color = match panel.status() {
            UploadStatus::Uploading => Color::LightBlue,
            UploadStatus::Success => Color::LightGreen,
            UploadStatus::Error | UploadStatus::Idle => Color::LightRed,
        };
        banner.push(Line::from(Span::styled(panel.message(), Style::default().fg(color))));
    }
    if !panel.rejected().is_empty() {
        banner.push(Line::from(Span::styled(
            format!("Skipped: {}", panel.rejected().join(", ")),
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(Paragraph::new(banner).wrap(Wrap { trim: true }), chunks[2]);

    if !panel.queue().is_empty() {
        let items: Vec<ListItem> = panel
            .queue()
            .iter()
            .map(|file| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("• {} ", file.name)),
                    Span::styled(
                        format!("({} KB)", file.size_kb()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray))
                .title("Files Queued/Uploaded"),
        );
        f.render_widget(list, chunks[3]);
    }

    if app.focus == Focus::Upload && chunks[0].width > 0 {
        let cursor_x = chunks[0].x + input_width.saturating_sub(scroll_offset);
        let max_x = chunks[0].x + chunks[0].width - 1;
        f.set_cursor_position((cursor_x.min(max_x), chunks[0].y));
    }
}
