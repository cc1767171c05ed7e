use crate::adapters::tui::event::{AppEvent, EventManager, is_quit_event, typed_char};
use crate::adapters::tui::palette::{CommandPalette, PaletteOutcome};
use crate::adapters::tui::status::StatusLine;
use crate::adapters::tui::text_utils::SPINNER_FRAMES;
use crate::adapters::tui::ui;
use crate::adapters::tui::views::{ResourceView, ViewFactory, ViewFocus};
use crate::core::context::AppContext;
use crate::core::error::StartupError;
use crate::core::types::MessageLevel;
use crate::ports::ViewStateStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::collections::{HashSet, VecDeque};
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

const MAX_LOG_BUFFER_SIZE: usize = 2000;
const LOG_PAGE_SIZE: u16 = 10;

/// Shell-level overlays. While one is open it owns the keyboard and the
/// active view is deactivated.
#[derive(Debug)]
pub(crate) enum Overlay {
    None,
    Palette(CommandPalette),
    Help,
    Logs,
}

pub(crate) struct TuiApp {
    views: Vec<Box<dyn ResourceView>>,
    active: Option<usize>,
    pub(crate) overlay: Overlay,
    pub(crate) status: StatusLine,
    view_state: Arc<dyn ViewStateStore>,
    pub(crate) log_buffer: VecDeque<(String, MessageLevel)>,
    log_rx: mpsc::Receiver<(String, MessageLevel)>,
    pub(crate) log_scroll_offset: u16,
    pub(crate) log_follow_mode: bool,
    pub(crate) log_popup_height: u16,
    spinner_index: usize,
    pub(crate) aws_label: String,
    pub(crate) should_quit: bool,
}

impl TuiApp {
    pub(crate) fn new(
        views: Vec<Box<dyn ResourceView>>,
        view_state: Arc<dyn ViewStateStore>,
        log_rx: mpsc::Receiver<(String, MessageLevel)>,
    ) -> Result<Self, StartupError> {
        if views.is_empty() {
            return Err(StartupError::NoViews);
        }
        let mut seen = HashSet::new();
        for view in &views {
            if !seen.insert(view.name()) {
                return Err(StartupError::DuplicateView(view.name().to_string()));
            }
        }
        Ok(Self {
            views,
            active: None,
            overlay: Overlay::None,
            status: StatusLine::default(),
            view_state,
            log_buffer: VecDeque::with_capacity(MAX_LOG_BUFFER_SIZE),
            log_rx,
            log_scroll_offset: 0,
            log_follow_mode: true,
            log_popup_height: 0,
            spinner_index: 0,
            aws_label: String::new(),
            should_quit: false,
        })
    }

    pub(crate) fn from_factories(
        ctx: &AppContext,
        factories: &[ViewFactory],
        log_rx: mpsc::Receiver<(String, MessageLevel)>,
    ) -> Result<Self, StartupError> {
        let views = factories.iter().map(|factory| factory(ctx)).collect();
        let mut app = Self::new(views, ctx.view_state.clone(), log_rx)?;
        app.aws_label = format!(
            "profile: {} | region: {}",
            ctx.aws.profile.as_deref().unwrap_or("default"),
            ctx.aws.region.as_deref().unwrap_or("default")
        );
        Ok(app)
    }

    /// Fires every view's initial fetch and shows the first view: the
    /// requested one, else the remembered one, else the first registered.
    pub(crate) fn start(&mut self, requested: Option<&str>) {
        for view in self.views.iter_mut() {
            view.init(&mut self.status);
        }
        let remembered = self.view_state.load_last_active_view();
        let initial = [requested.map(str::to_string), remembered]
            .into_iter()
            .flatten()
            .find(|name| self.view_index(name).is_some())
            .unwrap_or_else(|| self.views[0].name().to_string());
        self.switch_to(&initial);
    }

    fn view_index(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.views.iter().position(|view| view.name() == name)
    }

    pub(crate) fn view_names(&self) -> Vec<&'static str> {
        self.views.iter().map(|view| view.name()).collect()
    }

    pub(crate) fn active_view(&self) -> Option<&dyn ResourceView> {
        self.active
            .and_then(|idx| self.views.get(idx))
            .map(|view| view.as_ref())
    }

    fn active_view_mut(&mut self) -> Option<&mut Box<dyn ResourceView>> {
        self.active.and_then(|idx| self.views.get_mut(idx))
    }

    /// Shows the named view. Unknown names leave everything as it is.
    pub(crate) fn switch_to(&mut self, name: &str) -> bool {
        let Some(idx) = self.view_index(name) else {
            debug!("Ignoring switch to unknown view '{}'", name);
            return false;
        };
        if let Some(current) = self.active_view_mut() {
            current.deactivate();
        }
        let view = &mut self.views[idx];
        view.activate();
        let (name, title) = (view.name(), view.title());
        self.active = Some(idx);
        self.status.set_status(format!("Showing {}", title));
        self.view_state.save_last_active_view(name);
        info!("Switched to view '{}'", name);
        true
    }

    fn open_overlay(&mut self, overlay: Overlay) {
        if let Some(view) = self.active_view_mut() {
            view.deactivate();
        }
        if matches!(overlay, Overlay::Logs) {
            self.log_follow_mode = true;
            self.scroll_to_log_end();
        }
        self.overlay = overlay;
    }

    fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
        if let Some(view) = self.active_view_mut() {
            view.activate();
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.overlay {
            Overlay::Palette(palette) => {
                match palette.handle_key(key) {
                    PaletteOutcome::Pending => {}
                    PaletteOutcome::Cancel => self.close_overlay(),
                    PaletteOutcome::Select(name) => {
                        self.overlay = Overlay::None;
                        if !self.switch_to(&name) {
                            self.close_overlay();
                        }
                    }
                }
                return;
            }
            Overlay::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) || is_quit_event(&key) {
                    self.close_overlay();
                }
                return;
            }
            Overlay::Logs => {
                self.handle_logs_key(key);
                return;
            }
            Overlay::None => {}
        }

        let status = &mut self.status;
        if let Some(view) = self.active.and_then(|idx| self.views.get_mut(idx)) {
            if view.in_filter_mode() || view.has_modal() {
                view.handle_input(key, status);
                return;
            }
        }

        if is_quit_event(&key) {
            info!("Quit requested");
            self.should_quit = true;
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('l') | KeyCode::Char('L'))
        {
            self.open_overlay(Overlay::Logs);
            return;
        }

        match typed_char(&key) {
            Some(':') => {
                let palette = CommandPalette::new(self.view_names());
                self.open_overlay(Overlay::Palette(palette));
            }
            Some('?') => self.open_overlay(Overlay::Help),
            Some('/') => {
                if let Some(view) = self.active.and_then(|idx| self.views.get_mut(idx)) {
                    view.enter_filter_mode(&mut self.status);
                }
            }
            Some('r') | Some('R') => {
                if let Some(view) = self.active.and_then(|idx| self.views.get_mut(idx)) {
                    view.refresh(&mut self.status);
                }
            }
            _ => {
                if let Some(view) = self.active.and_then(|idx| self.views.get_mut(idx)) {
                    view.handle_input(key, &mut self.status);
                }
            }
        }
    }

    fn handle_logs_key(&mut self, key: KeyEvent) {
        let close = is_quit_event(&key)
            || key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('l') | KeyCode::Char('L')));
        if close {
            self.close_overlay();
            return;
        }
        match key.code {
            KeyCode::Up => self.log_scroll_up(1),
            KeyCode::Down => self.log_scroll_down(1),
            KeyCode::PageUp => self.log_scroll_up(LOG_PAGE_SIZE),
            KeyCode::PageDown => self.log_scroll_down(LOG_PAGE_SIZE),
            KeyCode::Home => {
                self.log_follow_mode = false;
                self.log_scroll_offset = 0;
            }
            KeyCode::End => {
                self.log_follow_mode = true;
                self.scroll_to_log_end();
            }
            _ => {}
        }
    }

    fn add_log_message_internal(&mut self, message: String, level: MessageLevel) {
        if self.log_buffer.len() >= MAX_LOG_BUFFER_SIZE {
            self.log_buffer.pop_front();
        }
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.log_buffer
            .push_back((format!("[{}] {}", timestamp, message), level));

        if self.log_follow_mode {
            self.scroll_to_log_end();
        }
    }

    fn max_log_scroll(&self) -> u16 {
        let visible = self.log_popup_height.max(1) as usize;
        self.log_buffer
            .len()
            .saturating_sub(visible)
            .min(u16::MAX as usize) as u16
    }

    fn scroll_to_log_end(&mut self) {
        self.log_scroll_offset = self.max_log_scroll();
    }

    fn log_scroll_up(&mut self, amount: u16) {
        self.log_scroll_offset = self.log_scroll_offset.saturating_sub(amount);
        self.log_follow_mode = false;
    }

    fn log_scroll_down(&mut self, amount: u16) {
        let max_scroll = self.max_log_scroll();
        self.log_scroll_offset = self.log_scroll_offset.saturating_add(amount).min(max_scroll);
        self.log_follow_mode = self.log_scroll_offset >= max_scroll;
    }

    /// Per-iteration housekeeping: finished tasks, new log lines, expiry.
    pub(crate) fn tick(&mut self) {
        for view in self.views.iter_mut() {
            view.poll_tasks(&mut self.status);
        }
        while let Ok((message, level)) = self.log_rx.try_recv() {
            self.add_log_message_internal(message, level);
        }
        self.status.expire(Instant::now());
    }

    pub(crate) fn has_pending_tasks(&self) -> bool {
        self.views.iter().any(|view| view.has_pending_tasks())
    }

    pub(crate) fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_index % SPINNER_FRAMES.len()]
    }

    /// Every element that currently claims keyboard input.
    pub(crate) fn focused_elements(&self) -> Vec<&'static str> {
        let mut focused = Vec::new();
        match self.overlay {
            Overlay::Palette(_) => focused.push("palette"),
            Overlay::Help => focused.push("help"),
            Overlay::Logs => focused.push("logs"),
            Overlay::None => {}
        }
        for view in &self.views {
            match view.focus() {
                ViewFocus::Unfocused => {}
                ViewFocus::Table => focused.push("table"),
                ViewFocus::Filter => focused.push("filter"),
                ViewFocus::Modal => focused.push("modal"),
            }
        }
        focused
    }

    pub(crate) async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        mut event_manager: EventManager,
    ) -> anyhow::Result<()> {
        info!("TUI run loop started.");
        loop {
            if self.should_quit {
                info!("TUI: should_quit is true. Exiting run loop.");
                break;
            }

            self.tick();

            terminal.draw(|frame| ui::draw(frame, self))?;

            match tokio::time::timeout(Duration::from_millis(50), event_manager.next_event()).await
            {
                Ok(Some(AppEvent::Input(key_event))) => {
                    self.handle_key(key_event);
                    debug_assert!(
                        self.focused_elements().len() <= 1,
                        "more than one element focused: {:?}",
                        self.focused_elements()
                    );
                }
                Ok(Some(AppEvent::Tick)) => {
                    if self.has_pending_tasks() {
                        self.spinner_index = self.spinner_index.wrapping_add(1);
                    }
                }
                Ok(None) => {
                    debug!("Event channel closed, leaving run loop.");
                    self.should_quit = true;
                }
                Err(_) => {}
            }
        }
        event_manager.shutdown();
        Ok(())
    }
}
