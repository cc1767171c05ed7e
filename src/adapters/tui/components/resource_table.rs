use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

pub(crate) struct TableView<'a> {
    pub title: String,
    pub headers: &'a [&'a str],
    pub widths: &'a [Constraint],
    pub rows: Vec<Row<'a>>,
    pub selected: usize,
    pub focused: bool,
    pub loading: bool,
    pub empty_message: &'a str,
}

fn create_table_header<'a>(headers: &[&'a str]) -> Row<'a> {
    let header_cells = headers.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(header_cells).height(1).bottom_margin(1)
}

pub(crate) fn draw_resource_table(frame: &mut Frame, area: Rect, view: TableView<'_>) {
    let border_style = if view.focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(view.title);

    if view.rows.is_empty() {
        let message = if view.loading {
            "Loading..."
        } else {
            view.empty_message
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let selected = view.selected.min(view.rows.len() - 1);
    let table = Table::new(view.rows, view.widths.to_vec())
        .header(create_table_header(view.headers))
        .block(block)
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default().with_selected(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Bottom line of a view: item count and drill path.
pub(crate) fn draw_footer(frame: &mut Frame, area: Rect, total: usize, breadcrumb: &str) {
    let line = Line::from(vec![
        Span::styled(
            format!("Total items: {}", total),
            Style::default().fg(Color::Gray),
        ),
        Span::styled("  │  ", Style::default().fg(Color::DarkGray)),
        Span::styled(breadcrumb.to_string(), Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// A multi-line cell: one line per value, with the row height to match.
pub(crate) fn multi_line_cell(values: &[String]) -> (Cell<'static>, u16) {
    if values.is_empty() {
        return (Cell::from("-"), 1);
    }
    let lines: Vec<Line<'static>> = values.iter().map(|v| Line::from(v.clone())).collect();
    let height = lines.len().min(u16::MAX as usize) as u16;
    (Cell::from(lines), height)
}
