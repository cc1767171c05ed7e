use crate::adapters::tui::components::popup::centered_box;
use crate::adapters::tui::edit_workflow::{
    DeleteChoice, DeleteConfirmation, EditWorkflow, FormField, RecordEditForm,
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const FORM_VALUES_HEIGHT: u16 = 6;

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn button<'a>(label: &'a str, focused: bool, accent: Color) -> Span<'a> {
    if focused {
        Span::styled(
            label,
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(label, Style::default().fg(accent))
    }
}

pub(crate) fn draw_edit_workflow(frame: &mut Frame, area: Rect, workflow: &EditWorkflow) {
    match workflow {
        EditWorkflow::Idle => {}
        EditWorkflow::FormOpen(form) => draw_record_form(frame, area, form),
        EditWorkflow::ConfirmDelete(confirm) => draw_delete_confirmation(frame, area, confirm),
        EditWorkflow::Submitting(label) => draw_submitting(frame, area, label),
    }
}

fn draw_record_form(frame: &mut Frame, area: Rect, form: &RecordEditForm) {
    let height = FORM_VALUES_HEIGHT + 14;
    let popup_area = centered_box(60, height, area);
    let block = Block::default()
        .title(format!(" Edit {} ", form.original().display_name()).bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup_area);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(FORM_VALUES_HEIGHT),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let focused = form.focused();

    let type_line = Line::from(vec![
        Span::raw("◀ "),
        Span::styled(
            form.record_type().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ▶"),
    ]);
    frame.render_widget(
        Paragraph::new(type_line).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Type")
                .border_style(field_style(focused == FormField::RecordType)),
        ),
        chunks[0],
    );

    let mut values_text = form.values_input().to_string();
    if focused == FormField::Values {
        values_text.push('_');
    }
    frame.render_widget(
        Paragraph::new(values_text)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Values (one per line or comma separated)")
                    .border_style(field_style(focused == FormField::Values)),
            ),
        chunks[1],
    );

    let mut ttl_text = form.ttl_input().to_string();
    if focused == FormField::Ttl {
        ttl_text.push('_');
    }
    frame.render_widget(
        Paragraph::new(ttl_text).block(
            Block::default()
                .borders(Borders::ALL)
                .title("TTL (seconds)")
                .border_style(field_style(focused == FormField::Ttl)),
        ),
        chunks[2],
    );

    let error_line = match form.error() {
        Some(e) => Line::from(Span::styled(e.to_string(), Style::default().fg(Color::Red))),
        None => Line::from(Span::styled(
            "Tab: next field  ←/→: change type  Ctrl+S: save  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(error_line), chunks[3]);

    let buttons = Line::from(vec![
        button("[ Save ]", focused == FormField::Save, Color::Green),
        Span::raw("   "),
        button("[ Cancel ]", focused == FormField::Cancel, Color::Gray),
    ]);
    frame.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        chunks[4],
    );
}

fn draw_delete_confirmation(frame: &mut Frame, area: Rect, confirm: &DeleteConfirmation) {
    let popup_area = centered_box(50, 7, area);
    let block = Block::default()
        .title(" Confirm delete ".bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let choice = confirm.choice();
    let lines = vec![
        Line::from(""),
        Line::from(confirm.prompt()).alignment(Alignment::Center),
        Line::from(""),
        Line::from(vec![
            button("[ Cancel ]", choice == DeleteChoice::Cancel, Color::Gray),
            Span::raw("   "),
            button("[ Delete ]", choice == DeleteChoice::Delete, Color::Red),
        ])
        .alignment(Alignment::Center),
    ];

    frame.render_widget(Clear, popup_area);
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn draw_submitting(frame: &mut Frame, area: Rect, label: &str) {
    let popup_area = centered_box(40, 3, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(
        Paragraph::new(label.to_string())
            .alignment(Alignment::Center)
            .block(block),
        popup_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DnsRecord, RoutingPolicy};
    use ratatui::{Terminal, backend::TestBackend};

    fn rendered(workflow: &EditWorkflow) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw_edit_workflow(frame, frame.area(), workflow))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn record() -> DnsRecord {
        DnsRecord {
            name: "www.a.com.".to_string(),
            record_type: "A".to_string(),
            ttl: Some(300),
            values: vec!["10.0.0.1".to_string()],
            alias: None,
            routing: RoutingPolicy::default(),
        }
    }

    #[test]
    fn test_delete_modal_shows_prompt_and_choices() {
        let mut workflow = EditWorkflow::default();
        workflow.open_delete("Z1".to_string(), record());
        let screen = rendered(&workflow);
        assert!(screen.contains("Delete www.a.com (A)?"));
        assert!(screen.contains("[ Cancel ]"));
        assert!(screen.contains("[ Delete ]"));
    }

    #[test]
    fn test_form_shows_current_values() {
        let mut workflow = EditWorkflow::default();
        workflow.open_form("Z1".to_string(), record());
        let screen = rendered(&workflow);
        assert!(screen.contains("Edit www.a.com"));
        assert!(screen.contains("10.0.0.1"));
        assert!(screen.contains("300"));
    }
}
