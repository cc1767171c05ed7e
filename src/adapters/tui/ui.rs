use crate::adapters::tui::app::{Overlay, TuiApp};
use crate::adapters::tui::components::popup::{self, PopupConfig, centered_box};
use crate::adapters::tui::palette::CommandPalette;
use crate::adapters::tui::text_utils::{HEADER_KEY_HELP, help_lines};
use crate::core::types::MessageLevel;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &mut TuiApp) {
    let screen = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(screen);

    draw_header(frame, app, chunks[0]);
    if let Some(view) = app.active_view() {
        view.draw(frame, chunks[1]);
    }
    draw_status_bar(frame, app, chunks[2]);
    draw_error_bar(frame, app, chunks[3]);

    match &app.overlay {
        Overlay::None | Overlay::Logs => {}
        Overlay::Palette(palette) => draw_palette(frame, palette, screen),
        Overlay::Help => {
            let lines = help_lines();
            popup::draw_popup(
                frame,
                PopupConfig {
                    title: "Help (Press '?' or 'Esc' to close)",
                    content_lines: &lines,
                    screen_area: screen,
                    percent_x: 70,
                    percent_y: 85,
                    scroll_offset: 0,
                },
            );
        }
    }
    if matches!(app.overlay, Overlay::Logs) {
        draw_logs(frame, app, screen);
    }
}

fn draw_header(frame: &mut Frame<'_>, app: &TuiApp, area: Rect) {
    let mut title_spans = match app.active_view() {
        Some(view) => vec![Span::styled(
            format!("Hibiscus – {}", view.title()),
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        )],
        None => vec![Span::styled(
            "Select a service with :",
            Style::default().fg(Color::Gray),
        )],
    };
    if !app.aws_label.is_empty() {
        title_spans.push(Span::styled(
            format!("  [{}]", app.aws_label),
            Style::default().fg(Color::Cyan),
        ));
    }
    let title_line = Line::from(title_spans);
    let help_line = Line::from(Span::styled(
        HEADER_KEY_HELP,
        Style::default().fg(Color::DarkGray),
    ));
    let header = Paragraph::new(vec![title_line, help_line]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, area);
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &TuiApp, area: Rect) {
    let mut spans = Vec::with_capacity(2);
    if app.has_pending_tasks() {
        spans.push(Span::styled(
            format!("{} ", app.spinner_frame()),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::styled(
        app.status.status().to_string(),
        Style::default().fg(Color::Green),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_error_bar(frame: &mut Frame<'_>, app: &TuiApp, area: Rect) {
    if let Some(error) = app.status.error() {
        let line = Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn draw_palette(frame: &mut Frame<'_>, palette: &CommandPalette, screen: Rect) {
    let list_height = palette.candidates().len().max(1) as u16;
    let popup_area = centered_box(40, list_height + 6, screen);
    let block = Block::default()
        .title(" Switch service ".bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup_area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let input_line = Line::from(vec![
        Span::styled(":", Style::default().fg(Color::Yellow)),
        Span::raw(format!("{}_", palette.input())),
    ]);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    if palette.candidates().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No matches",
                Style::default().fg(Color::DarkGray),
            )),
            chunks[2],
        );
    } else {
        let items: Vec<ListItem> = palette
            .candidates()
            .iter()
            .map(|name| ListItem::new(*name))
            .collect();
        let list = List::new(items).highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default().with_selected(Some(palette.highlighted_index()));
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    if let Some(error) = palette.error() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )),
            chunks[3],
        );
    }
}

fn log_style(level: &MessageLevel) -> Style {
    match level {
        MessageLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        MessageLevel::Warning => Style::default().fg(Color::Yellow),
        MessageLevel::Info => Style::default().fg(Color::White),
        MessageLevel::Debug => Style::default().fg(Color::Gray),
        MessageLevel::Trace => Style::default().fg(Color::DarkGray),
    }
}

fn draw_logs(frame: &mut Frame<'_>, app: &mut TuiApp, screen: Rect) {
    let lines: Vec<Line<'static>> = app
        .log_buffer
        .iter()
        .map(|(message, level)| Line::from(Span::styled(message.clone(), log_style(level))))
        .collect();
    let title = format!(
        "Logs (Follow: {}, Count: {}) - Esc to close",
        if app.log_follow_mode { "On" } else { "Off" },
        lines.len()
    );
    app.log_popup_height = popup::draw_popup(
        frame,
        PopupConfig {
            title: &title,
            content_lines: &lines,
            screen_area: screen,
            percent_x: 90,
            percent_y: 80,
            scroll_offset: app.log_scroll_offset,
        },
    );
}
