use crate::adapters::tui::event::typed_char;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FilterOutcome {
    Editing,
    Commit(String),
    Cancel,
}

/// The `/` text field. While active it captures every key of its view.
#[derive(Debug, Default)]
pub(crate) struct FilterInput {
    active: bool,
    buffer: String,
}

impl FilterInput {
    pub(crate) fn open(&mut self, current_query: &str) {
        self.active = true;
        self.buffer = current_query.to_string();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn buffer(&self) -> &str {
        &self.buffer
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> FilterOutcome {
        if let Some(c) = typed_char(&key) {
            self.buffer.push(c);
            return FilterOutcome::Editing;
        }
        match key.code {
            KeyCode::Backspace => {
                self.buffer.pop();
                FilterOutcome::Editing
            }
            KeyCode::Enter => {
                self.active = false;
                FilterOutcome::Commit(std::mem::take(&mut self.buffer))
            }
            KeyCode::Esc => {
                self.active = false;
                self.buffer.clear();
                FilterOutcome::Cancel
            }
            _ => FilterOutcome::Editing,
        }
    }
}

/// One-line filter bar: the live input while editing, otherwise the applied query.
pub(crate) fn draw_filter_bar(frame: &mut Frame, area: Rect, input: &FilterInput, applied: &str) {
    let line = if input.is_active() {
        Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}_", input.buffer())),
        ])
    } else {
        Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(Color::DarkGray)),
            Span::styled(applied.to_string(), Style::default().fg(Color::Cyan)),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}
