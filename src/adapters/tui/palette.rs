use crate::adapters::tui::event::{is_quit_event, typed_char};
use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PaletteOutcome {
    Pending,
    Cancel,
    Select(String),
}

/// The `:` overlay: a text field narrowing the registered service names.
#[derive(Debug, Clone)]
pub(crate) struct CommandPalette {
    names: Vec<&'static str>,
    input: String,
    candidates: Vec<&'static str>,
    highlighted: usize,
    error: Option<String>,
}

impl CommandPalette {
    pub(crate) fn new(names: Vec<&'static str>) -> Self {
        let candidates = names.clone();
        Self {
            names,
            input: String::new(),
            candidates,
            highlighted: 0,
            error: None,
        }
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn candidates(&self) -> &[&'static str] {
        &self.candidates
    }

    pub(crate) fn highlighted(&self) -> Option<&'static str> {
        self.candidates.get(self.highlighted).copied()
    }

    pub(crate) fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn refresh_candidates(&mut self) {
        let needle = self.input.trim().to_lowercase();
        self.candidates = self
            .names
            .iter()
            .copied()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect();
        self.highlighted = 0;
        self.error = None;
    }

    fn cycle(&mut self, forward: bool) {
        let len = self.candidates.len();
        if len == 0 {
            return;
        }
        self.highlighted = if forward {
            (self.highlighted + 1) % len
        } else {
            (self.highlighted + len - 1) % len
        };
    }

    fn commit(&mut self) -> PaletteOutcome {
        let typed = self.input.trim().to_lowercase();
        if let Some(exact) = self.names.iter().find(|name| name.to_lowercase() == typed) {
            return PaletteOutcome::Select(exact.to_string());
        }
        match self.highlighted() {
            Some(name) => PaletteOutcome::Select(name.to_string()),
            None => {
                self.error = Some(format!("Service not supported: {}", self.input.trim()));
                PaletteOutcome::Pending
            }
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> PaletteOutcome {
        if is_quit_event(&key) {
            return PaletteOutcome::Cancel;
        }
        if let Some(c) = typed_char(&key) {
            self.input.push(c);
            self.refresh_candidates();
            return PaletteOutcome::Pending;
        }
        match key.code {
            KeyCode::Esc => PaletteOutcome::Cancel,
            KeyCode::Enter => self.commit(),
            KeyCode::Backspace => {
                self.input.pop();
                self.refresh_candidates();
                PaletteOutcome::Pending
            }
            KeyCode::Tab | KeyCode::Down => {
                self.cycle(true);
                PaletteOutcome::Pending
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.cycle(false);
                PaletteOutcome::Pending
            }
            _ => PaletteOutcome::Pending,
        }
    }
}
