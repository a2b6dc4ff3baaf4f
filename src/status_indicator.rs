use crate::constants::SPINNER_FRAMES;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Spinner plus a short status text, shown while requests are outstanding.
#[derive(Debug, Default)]
pub struct StatusIndicator {
    busy: bool,
    status_text: String,
    spinner_idx: usize,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Sets the indicator from what is currently outstanding.
    pub fn update(&mut self, thinking: bool, uploading: bool) {
        self.busy = thinking || uploading;
        self.status_text = match (thinking, uploading) {
            (true, true) => "Thinking... (upload in progress)".to_string(),
            (true, false) => "Thinking...".to_string(),
            (false, true) => "Uploading...".to_string(),
            (false, false) => String::new(),
        };
    }

    pub fn advance_spinner(&mut self) {
        if self.busy {
            self.spinner_idx = self.spinner_idx.wrapping_add(1);
        }
    }

    pub fn spinner_frame(&self) -> &'static str {
        if self.busy {
            SPINNER_FRAMES[self.spinner_idx % SPINNER_FRAMES.len()]
        } else {
            " "
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let status = Line::from(vec![
            Span::styled(self.spinner_frame(), Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(self.status_text.as_str(), Style::default().fg(Color::DarkGray)),
        ]);

        frame.render_widget(Paragraph::new(status).alignment(Alignment::Left), area);
    }
}
