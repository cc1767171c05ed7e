use crate::adapters::tui::components::filter_bar::{FilterInput, FilterOutcome};
use crate::adapters::tui::status::StatusLine;
use crate::core::context::AppContext;
use crate::core::filter::{DrillLevel, Searchable};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

pub(crate) mod ecr;
pub(crate) mod elb;
pub(crate) mod route53;
#[cfg(test)]
pub(crate) mod test_support;

const PAGE_SIZE: usize = 10;

/// Which element of a view currently owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewFocus {
    Unfocused,
    Table,
    Filter,
    Modal,
}

/// One resource kind with its drill-down hierarchy. The shell owns a list of
/// these and forwards input to the active one.
pub(crate) trait ResourceView {
    fn name(&self) -> &'static str;
    fn title(&self) -> &'static str;

    /// Fires the first fetch of the top level. Called once at startup.
    fn init(&mut self, status: &mut StatusLine);
    fn activate(&mut self);
    /// Releases focus. Loaded data stays.
    fn deactivate(&mut self);

    /// Re-fetches the level currently on screen.
    fn refresh(&mut self, status: &mut StatusLine);
    /// Returns false when the current level has nothing to filter on.
    fn enter_filter_mode(&mut self, status: &mut StatusLine) -> bool;
    fn in_filter_mode(&self) -> bool;
    fn has_modal(&self) -> bool;
    fn focus(&self) -> ViewFocus;

    /// Returns true when the key was consumed.
    fn handle_input(&mut self, key: KeyEvent, status: &mut StatusLine) -> bool;
    /// Applies finished background work. Runs on the UI loop only.
    fn poll_tasks(&mut self, status: &mut StatusLine);
    fn has_pending_tasks(&self) -> bool;

    fn breadcrumb(&self) -> String;
    fn total_items(&self) -> usize;
    fn draw(&self, frame: &mut Frame, area: Rect);
}

pub(crate) type ViewFactory = fn(&AppContext) -> Box<dyn ResourceView>;

fn ecr_view(ctx: &AppContext) -> Box<dyn ResourceView> {
    Box::new(ecr::EcrView::new(ctx))
}

fn route53_view(ctx: &AppContext) -> Box<dyn ResourceView> {
    Box::new(route53::Route53View::new(ctx))
}

fn elb_view(ctx: &AppContext) -> Box<dyn ResourceView> {
    Box::new(elb::ElbView::new(ctx))
}

/// Registered services in palette order.
pub(crate) fn default_view_factories() -> Vec<ViewFactory> {
    vec![
        ecr_view as ViewFactory,
        route53_view as ViewFactory,
        elb_view as ViewFactory,
    ]
}

pub(crate) fn view_focus(active: bool, modal: bool, filtering: bool) -> ViewFocus {
    if !active {
        ViewFocus::Unfocused
    } else if modal {
        ViewFocus::Modal
    } else if filtering {
        ViewFocus::Filter
    } else {
        ViewFocus::Table
    }
}

/// Moves the selection of `level` for the usual table keys.
pub(crate) fn handle_table_navigation<T>(level: &mut DrillLevel<T>, key: &KeyEvent) -> bool {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => level.select_previous(1),
        KeyCode::Down | KeyCode::Char('j') => level.select_next(1),
        KeyCode::PageUp => level.select_previous(PAGE_SIZE),
        KeyCode::PageDown => level.select_next(PAGE_SIZE),
        KeyCode::Home => level.select_first(),
        KeyCode::End => level.select_last(),
        _ => return false,
    }
    true
}

/// Feeds a key to the filter field; a committed query re-filters `level`.
pub(crate) fn handle_filter_key<T: Searchable>(
    filter: &mut FilterInput,
    level: &mut DrillLevel<T>,
    key: KeyEvent,
) {
    if let FilterOutcome::Commit(query) = filter.handle_key(key) {
        level.apply_filter(&query);
    }
}

pub(crate) struct ViewAreas {
    pub table: Rect,
    pub filter: Rect,
    pub footer: Rect,
}

pub(crate) fn split_view_area(area: Rect) -> ViewAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    ViewAreas {
        table: chunks[0],
        filter: chunks[1],
        footer: chunks[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Repository;

    fn repos(n: usize) -> DrillLevel<Repository> {
        let mut level = DrillLevel::default();
        level.replace_items(
            None,
            (0..n)
                .map(|i| Repository {
                    name: format!("repo-{}", i),
                    uri: String::new(),
                    created_at: None,
                })
                .collect(),
        );
        level
    }

    #[test]
    fn test_navigation_keys_move_and_clamp() {
        let mut level = repos(25);
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert!(handle_table_navigation(&mut level, &key(KeyCode::Char('j'))));
        assert_eq!(level.selected_index(), 1);
        handle_table_navigation(&mut level, &key(KeyCode::PageDown));
        assert_eq!(level.selected_index(), 11);
        handle_table_navigation(&mut level, &key(KeyCode::End));
        assert_eq!(level.selected_index(), 24);
        handle_table_navigation(&mut level, &key(KeyCode::Down));
        assert_eq!(level.selected_index(), 24);
        handle_table_navigation(&mut level, &key(KeyCode::Home));
        assert_eq!(level.selected_index(), 0);
        handle_table_navigation(&mut level, &key(KeyCode::Up));
        assert_eq!(level.selected_index(), 0);

        assert!(!handle_table_navigation(&mut level, &key(KeyCode::Char('x'))));
    }

    #[test]
    fn test_focus_priority() {
        assert_eq!(view_focus(false, true, true), ViewFocus::Unfocused);
        assert_eq!(view_focus(true, true, true), ViewFocus::Modal);
        assert_eq!(view_focus(true, false, true), ViewFocus::Filter);
        assert_eq!(view_focus(true, false, false), ViewFocus::Table);
    }

    #[test]
    fn test_default_views_are_ordered() {
        let ctx = test_support::context();
        let names: Vec<&str> = default_view_factories()
            .iter()
            .map(|factory| factory(&ctx.ctx).name())
            .collect();
        assert_eq!(names, vec!["ecr", "route53", "elb"]);
    }
}
