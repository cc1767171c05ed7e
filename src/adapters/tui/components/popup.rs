use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub(crate) struct PopupConfig<'a> {
    pub title: &'a str,
    pub content_lines: &'a [Line<'static>],
    pub screen_area: Rect,
    pub percent_x: u16,
    pub percent_y: u16,
    pub scroll_offset: u16,
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// A box of fixed height centred horizontally by percentage.
pub(crate) fn centered_box(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let top = r.y + (r.height - height) / 2;
    let horizontal = centered_rect(percent_x, 100, r);
    Rect::new(horizontal.x, top, horizontal.width, height)
}

/// Draws a scrollable text popup and returns the height of its content area,
/// which callers need to clamp their scroll offset.
pub(crate) fn draw_popup(frame: &mut Frame, config: PopupConfig<'_>) -> u16 {
    let area = centered_rect(config.percent_x, config.percent_y, config.screen_area);

    let popup_block = Block::default()
        .title(config.title.bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner_content_rect = popup_block.inner(area);
    let content_area_height = inner_content_rect.height;

    let total_text_lines = config.content_lines.len();
    let visible_viewport_height = content_area_height as usize;

    let clamped_scroll_offset = safe_scroll_clamp(
        config.scroll_offset,
        total_text_lines,
        visible_viewport_height,
    );

    let paragraph = Paragraph::new(Text::from(config.content_lines.to_vec()))
        .block(popup_block)
        .style(Style::default().bg(Color::DarkGray))
        .scroll((clamped_scroll_offset, 0));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);

    if total_text_lines > visible_viewport_height && visible_viewport_height > 0 {
        let scrollbar_x = inner_content_rect.right().saturating_sub(1);
        let track_height = inner_content_rect.height as f64;

        let content_ratio = visible_viewport_height as f64 / total_text_lines as f64;
        let thumb_size = (track_height * content_ratio).max(1.0).round() as u16;
        let max_scroll = (total_text_lines - visible_viewport_height).min(u16::MAX as usize) as u16;
        let scroll_ratio = if max_scroll > 0 {
            clamped_scroll_offset as f64 / max_scroll as f64
        } else {
            0.0
        };

        let available_thumb_travel = (track_height - thumb_size as f64).max(0.0);
        let thumb_position = (scroll_ratio * available_thumb_travel).round() as u16;

        for y_offset in 0..inner_content_rect.height {
            let cell_y = inner_content_rect.y + y_offset;
            let is_thumb = y_offset >= thumb_position
                && y_offset < (thumb_position + thumb_size).min(inner_content_rect.height);

            let (symbol, style) = if is_thumb {
                ("█", Style::default().fg(Color::LightYellow))
            } else {
                ("│", Style::default().fg(Color::Gray))
            };

            if scrollbar_x < area.right() && cell_y < area.bottom() {
                frame
                    .buffer_mut()
                    .set_string(scrollbar_x, cell_y, symbol, style);
            }
        }
    }

    content_area_height
}

pub(crate) fn safe_scroll_clamp(scroll_offset: u16, total_lines: usize, visible_height: usize) -> u16 {
    if total_lines <= visible_height {
        return 0;
    }
    let max_scroll = (total_lines - visible_height).min(u16::MAX as usize) as u16;
    scroll_offset.min(max_scroll)
}
