use crate::app::{App, Focus};
use crate::constants::INPUT_MAX_LINES;
use crate::conversation::{ConversationPanel, Message, Sender};
use crate::ui::pane_border_style;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

pub fn draw_chat(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Chat with BeautiRAG ")
        .border_style(pane_border_style(app, Focus::Chat));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let panel = &app.conversation;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(panel.input_height(input_text_width(inner.width)) + 1),
        ])
        .split(inner);

    if panel.is_empty() {
        draw_empty_state(f, chunks[0]);
    } else {
        draw_messages(f, panel, chunks[0]);
    }
    draw_input(f, app, chunks[1]);
}

fn draw_empty_state(f: &mut Frame<'_>, area: Rect) {
    let top = area.height.saturating_sub(3) / 2;
    let mut lines = vec![Line::from(""); top as usize];
    lines.push(Line::from(Span::styled("🤖", Style::default().fg(Color::DarkGray))));
    lines.push(Line::from(Span::styled(
        "No messages yet",
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "Upload some documents and start asking questions.",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_messages(f: &mut Frame<'_>, panel: &ConversationPanel, area: Rect) {
    let mut lines = Vec::new();
    for message in panel.messages() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(message_lines(message, area.width));
    }

    // Follow the newest message unless the user scrolled back.
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total_lines.saturating_sub(area.height);
    panel.set_scroll_limit(max_scroll);
    let scroll = max_scroll.saturating_sub(panel.scroll_from_bottom());

    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

fn bubble_style(message: &Message) -> Style {
    let mut style = Style::default().fg(match message.sender {
        Sender::User => Color::Rgb(255, 223, 128),
        Sender::Bot => Color::Rgb(144, 238, 144),
    });

    if message.is_error {
        style = style.fg(Color::LightRed);
    }
    if message.is_loading {
        style = style.add_modifier(Modifier::DIM | Modifier::ITALIC);
    }
    style
}

/// Lays a message out as a bubble; user bubbles hug the right edge.
pub fn message_lines(message: &Message, width: u16) -> Vec<Line<'static>> {
    let style = bubble_style(message);
    let alignment = match message.sender {
        Sender::User => Alignment::Right,
        Sender::Bot => Alignment::Left,
    };
    let who = match message.sender {
        Sender::User => "You",
        Sender::Bot if message.is_loading => "BeautiRAG is thinking",
        Sender::Bot => "BeautiRAG",
    };

    // Bubbles take at most three quarters of the pane.
    let wrap_width = ((width as usize) * 3 / 4).saturating_sub(2).max(8);

    let mut lines = vec![Line::from(vec![
        Span::styled("┌─ ".to_string(), style),
        Span::styled(who.to_string(), style.add_modifier(Modifier::BOLD)),
    ])
    .alignment(alignment)];

    for text_line in message.text.split('\n') {
        if text_line.is_empty() {
            lines.push(Line::from(Span::styled("│".to_string(), style)).alignment(alignment));
            continue;
        }
        for wrapped in wrap(text_line, wrap_width) {
            lines.push(
                Line::from(vec![
                    Span::styled("│ ".to_string(), style),
                    Span::styled(wrapped.into_owned(), style),
                ])
                .alignment(alignment),
            );
        }
    }

    lines.push(Line::from(Span::styled("╰─".to_string(), style)).alignment(alignment));
    lines
}

const INPUT_PREFIX_WIDTH: u16 = 2;

fn input_text_width(width: u16) -> u16 {
    width.saturating_sub(INPUT_PREFIX_WIDTH)
}

fn draw_input(f: &mut Frame<'_>, app: &App, area: Rect) {
    let panel = &app.conversation;
    let separator = "─".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            height: 1,
            ..area
        },
    );

    let text_area = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        ..area
    };

    let prefix_style = Style::default().fg(Color::DarkGray);
    let text_width = input_text_width(text_area.width);
    let input_lines = panel.input_lines(text_width);
    if panel.input().is_empty() {
        let placeholder = if panel.is_awaiting() {
            "waiting for the answer..."
        } else {
            "Ask BeautiRAG anything..."
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("→ ", prefix_style),
                Span::styled(placeholder, prefix_style.add_modifier(Modifier::ITALIC)),
            ])),
            text_area,
        );
    } else {
        // Keep the last lines visible, the cursor always sits at the end.
        let skip = input_lines.len().saturating_sub(INPUT_MAX_LINES as usize);
        let lines: Vec<Line> = input_lines[skip..]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let prefix = if i == 0 && skip == 0 { "→ " } else { "  " };
                Line::from(vec![
                    Span::styled(prefix, prefix_style),
                    Span::styled(line.as_str(), Style::default().fg(Color::White)),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), text_area);
    }

    if app.focus == Focus::Chat && !panel.is_awaiting() && text_area.width > 0 && text_area.height > 0 {
        let last_line = input_lines.last().map(String::as_str).unwrap_or("");
        let visible_rows = panel.input_height(text_width);
        let cursor_x = text_area.x + INPUT_PREFIX_WIDTH + last_line.width() as u16;
        let max_x = text_area.x + text_area.width - 1;
        let cursor_y = text_area.y + visible_rows.saturating_sub(1).min(text_area.height - 1);
        f.set_cursor_position((cursor_x.min(max_x), cursor_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::MessageId;

    fn message(text: &str, sender: Sender) -> Message {
        Message {
            id: MessageId(1),
            text: text.to_string(),
            sender,
            is_loading: false,
            is_error: false,
        }
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bubble_wraps_and_aligns() {
        let lines = message_lines(&message("one two three four five six", Sender::User), 20);
        assert_eq!(plain(&lines[0]), "┌─ You");
        assert_eq!(lines[0].alignment, Some(Alignment::Right));
        assert!(lines.len() > 3);
        assert_eq!(plain(lines.last().unwrap()), "╰─");
    }

    #[test]
    fn test_loading_bubble_is_labelled() {
        let mut msg = message("...", Sender::Bot);
        msg.is_loading = true;
        let lines = message_lines(&msg, 60);
        assert_eq!(plain(&lines[0]), "┌─ BeautiRAG is thinking");
        assert_eq!(lines[0].alignment, Some(Alignment::Left));
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let lines = message_lines(&message("a\n\nb", Sender::Bot), 60);
        let body: Vec<String> = lines[1..lines.len() - 1].iter().map(plain).collect();
        assert_eq!(body, vec!["│ a", "│", "│ b"]);
    }
}
