use crate::adapters::tui::event::typed_char;
use crate::core::error::ValidationError;
use crate::core::record_edit::{record_type_options, validate_record_input};
use crate::core::types::{DnsRecord, RecordChange};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A confirmed record mutation, ready to hand to the DNS data source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingMutation {
    Update { zone_id: String, record: DnsRecord },
    Delete { zone_id: String, record: DnsRecord },
}

impl PendingMutation {
    #[cfg(test)]
    pub(crate) fn record(&self) -> &DnsRecord {
        match self {
            PendingMutation::Update { record, .. } | PendingMutation::Delete { record, .. } => {
                record
            }
        }
    }

    pub(crate) fn zone_id(&self) -> &str {
        match self {
            PendingMutation::Update { zone_id, .. } | PendingMutation::Delete { zone_id, .. } => {
                zone_id
            }
        }
    }

    pub(crate) fn progress_message(&self) -> String {
        match self {
            PendingMutation::Update { record, .. } => {
                format!("Updating {}...", record.display_name())
            }
            PendingMutation::Delete { record, .. } => {
                format!("Deleting {}...", record.display_name())
            }
        }
    }

    pub(crate) fn done_message(&self) -> String {
        match self {
            PendingMutation::Update { record, .. } => format!("Updated {}", record.display_name()),
            PendingMutation::Delete { record, .. } => format!("Deleted {}", record.display_name()),
        }
    }

    pub(crate) fn error_prefix(&self) -> &'static str {
        match self {
            PendingMutation::Update { .. } => "update record",
            PendingMutation::Delete { .. } => "delete record",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    RecordType,
    Values,
    Ttl,
    Save,
    Cancel,
}

const FIELD_ORDER: [FormField; 5] = [
    FormField::RecordType,
    FormField::Values,
    FormField::Ttl,
    FormField::Save,
    FormField::Cancel,
];

#[derive(Debug, PartialEq)]
enum FormOutcome {
    Editing,
    Close,
    Submit(RecordChange),
}

#[derive(Debug, Clone)]
pub(crate) struct RecordEditForm {
    zone_id: String,
    original: DnsRecord,
    type_options: Vec<String>,
    type_index: usize,
    values_input: String,
    ttl_input: String,
    focused: FormField,
    error: Option<ValidationError>,
}

impl RecordEditForm {
    pub(crate) fn new(zone_id: String, original: DnsRecord) -> Self {
        let type_options = record_type_options(&original.record_type);
        let current = original.record_type.trim().to_uppercase();
        let type_index = type_options
            .iter()
            .position(|t| *t == current)
            .unwrap_or(0);
        let values_input = original.values.join("\n");
        let ttl_input = original.ttl.map(|t| t.to_string()).unwrap_or_default();
        Self {
            zone_id,
            original,
            type_options,
            type_index,
            values_input,
            ttl_input,
            focused: FormField::RecordType,
            error: None,
        }
    }

    pub(crate) fn original(&self) -> &DnsRecord {
        &self.original
    }

    pub(crate) fn record_type(&self) -> &str {
        self.type_options
            .get(self.type_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub(crate) fn values_input(&self) -> &str {
        &self.values_input
    }

    pub(crate) fn ttl_input(&self) -> &str {
        &self.ttl_input
    }

    pub(crate) fn focused(&self) -> FormField {
        self.focused
    }

    pub(crate) fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    fn move_focus(&mut self, forward: bool) {
        let idx = FIELD_ORDER
            .iter()
            .position(|f| *f == self.focused)
            .unwrap_or(0);
        let len = FIELD_ORDER.len();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.focused = FIELD_ORDER[next];
    }

    fn cycle_type(&mut self, forward: bool) {
        let len = self.type_options.len();
        if len == 0 {
            return;
        }
        self.type_index = if forward {
            (self.type_index + 1) % len
        } else {
            (self.type_index + len - 1) % len
        };
    }

    fn submit(&mut self) -> FormOutcome {
        match validate_record_input(self.record_type(), &self.values_input, &self.ttl_input) {
            Ok(change) => {
                self.error = None;
                FormOutcome::Submit(change)
            }
            Err(e) => {
                self.error = Some(e);
                FormOutcome::Editing
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') | KeyCode::Char('S') => self.submit(),
                _ => FormOutcome::Editing,
            };
        }

        match key.code {
            KeyCode::Esc => return FormOutcome::Close,
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                return FormOutcome::Editing;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                return FormOutcome::Editing;
            }
            _ => {}
        }

        match self.focused {
            FormField::RecordType => match key.code {
                KeyCode::Left => self.cycle_type(false),
                KeyCode::Right | KeyCode::Char(' ') => self.cycle_type(true),
                _ => {}
            },
            FormField::Values => {
                if let Some(c) = typed_char(&key) {
                    self.values_input.push(c);
                } else {
                    match key.code {
                        KeyCode::Backspace => {
                            self.values_input.pop();
                        }
                        KeyCode::Enter => self.values_input.push('\n'),
                        _ => {}
                    }
                }
            }
            FormField::Ttl => {
                if let Some(c) = typed_char(&key) {
                    self.ttl_input.push(c);
                } else {
                    match key.code {
                        KeyCode::Backspace => {
                            self.ttl_input.pop();
                        }
                        KeyCode::Enter => return self.submit(),
                        _ => {}
                    }
                }
            }
            FormField::Save => match key.code {
                KeyCode::Enter => return self.submit(),
                KeyCode::Right | KeyCode::Left => self.focused = FormField::Cancel,
                _ => {}
            },
            FormField::Cancel => match key.code {
                KeyCode::Enter => return FormOutcome::Close,
                KeyCode::Right | KeyCode::Left => self.focused = FormField::Save,
                _ => {}
            },
        }
        FormOutcome::Editing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteChoice {
    Cancel,
    Delete,
}

#[derive(Debug, Clone)]
pub(crate) struct DeleteConfirmation {
    zone_id: String,
    record: DnsRecord,
    choice: DeleteChoice,
}

impl DeleteConfirmation {
    pub(crate) fn choice(&self) -> DeleteChoice {
        self.choice
    }

    pub(crate) fn prompt(&self) -> String {
        format!(
            "Delete {} ({})?",
            self.record.display_name(),
            self.record.record_type
        )
    }

    fn toggle(&mut self) {
        self.choice = match self.choice {
            DeleteChoice::Cancel => DeleteChoice::Delete,
            DeleteChoice::Delete => DeleteChoice::Cancel,
        };
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum WorkflowOutcome {
    /// The overlay consumed the key and stays open.
    Pending,
    /// The overlay closed without side effects.
    Closed,
    Submit(PendingMutation),
}

/// Record edit and delete overlay. Anything other than `Idle` owns the
/// keyboard of the Route53 view.
#[derive(Debug, Clone, Default)]
pub(crate) enum EditWorkflow {
    #[default]
    Idle,
    FormOpen(Box<RecordEditForm>),
    ConfirmDelete(DeleteConfirmation),
    Submitting(String),
}

impl EditWorkflow {
    pub(crate) fn open_form(&mut self, zone_id: String, record: DnsRecord) {
        *self = EditWorkflow::FormOpen(Box::new(RecordEditForm::new(zone_id, record)));
    }

    pub(crate) fn open_delete(&mut self, zone_id: String, record: DnsRecord) {
        *self = EditWorkflow::ConfirmDelete(DeleteConfirmation {
            zone_id,
            record,
            choice: DeleteChoice::Cancel,
        });
    }

    pub(crate) fn owns_input(&self) -> bool {
        !matches!(self, EditWorkflow::Idle)
    }

    #[cfg(test)]
    pub(crate) fn is_submitting(&self) -> bool {
        matches!(self, EditWorkflow::Submitting(_))
    }

    /// Called once the mutation outcome has been applied.
    pub(crate) fn finish(&mut self) {
        *self = EditWorkflow::Idle;
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> WorkflowOutcome {
        let mutation = match self {
            EditWorkflow::Idle => return WorkflowOutcome::Closed,
            EditWorkflow::Submitting(_) => return WorkflowOutcome::Pending,
            EditWorkflow::FormOpen(form) => match form.handle_key(key) {
                FormOutcome::Editing => return WorkflowOutcome::Pending,
                FormOutcome::Close => {
                    *self = EditWorkflow::Idle;
                    return WorkflowOutcome::Closed;
                }
                FormOutcome::Submit(change) => PendingMutation::Update {
                    zone_id: form.zone_id.clone(),
                    record: change.apply_to(&form.original),
                },
            },
            EditWorkflow::ConfirmDelete(confirm) => {
                let confirmed = match key.code {
                    KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                        confirm.toggle();
                        return WorkflowOutcome::Pending;
                    }
                    KeyCode::Enter => confirm.choice == DeleteChoice::Delete,
                    KeyCode::Char('y') | KeyCode::Char('Y') => true,
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
                    _ => return WorkflowOutcome::Pending,
                };
                if !confirmed {
                    *self = EditWorkflow::Idle;
                    return WorkflowOutcome::Closed;
                }
                PendingMutation::Delete {
                    zone_id: confirm.zone_id.clone(),
                    record: confirm.record.clone(),
                }
            }
        };
        *self = EditWorkflow::Submitting(mutation.progress_message());
        WorkflowOutcome::Submit(mutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RoutingPolicy;
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn www_record() -> DnsRecord {
        DnsRecord {
            name: "www.a.com.".to_string(),
            record_type: "A".to_string(),
            ttl: Some(60),
            values: vec!["10.0.0.1".to_string()],
            alias: None,
            routing: RoutingPolicy {
                set_identifier: Some("blue".to_string()),
                weight: Some(10),
                ..Default::default()
            },
        }
    }

    fn open_form() -> EditWorkflow {
        let mut workflow = EditWorkflow::default();
        workflow.open_form("Z1".to_string(), www_record());
        workflow
    }

    fn type_text(workflow: &mut EditWorkflow, text: &str) {
        for c in text.chars() {
            workflow.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn set_ttl(workflow: &mut EditWorkflow, ttl: &str) {
        workflow.handle_key(key(KeyCode::Tab));
        workflow.handle_key(key(KeyCode::Tab));
        for _ in 0..8 {
            workflow.handle_key(key(KeyCode::Backspace));
        }
        type_text(workflow, ttl);
    }

    fn form(workflow: &EditWorkflow) -> &RecordEditForm {
        match workflow {
            EditWorkflow::FormOpen(form) => form,
            other => panic!("expected open form, got {:?}", other),
        }
    }

    #[test]
    fn test_form_is_prefilled_from_record() {
        let workflow = open_form();
        let form = form(&workflow);
        assert_eq!(form.record_type(), "A");
        assert_eq!(form.values_input(), "10.0.0.1");
        assert_eq!(form.ttl_input(), "60");
        assert_eq!(form.focused(), FormField::RecordType);
    }

    #[test]
    fn test_invalid_ttl_keeps_form_open() {
        for bad in ["0", "-5", "abc"] {
            let mut workflow = open_form();
            set_ttl(&mut workflow, bad);
            assert_eq!(
                workflow.handle_key(key(KeyCode::Enter)),
                WorkflowOutcome::Pending
            );
            assert_matches!(
                form(&workflow).error(),
                Some(ValidationError::InvalidTtl(_))
            );
        }
    }

    #[test]
    fn test_valid_submit_builds_update_and_enters_submitting() {
        let mut workflow = open_form();
        set_ttl(&mut workflow, "300");

        let outcome = workflow.handle_key(key(KeyCode::Enter));
        let mutation = match outcome {
            WorkflowOutcome::Submit(mutation) => mutation,
            other => panic!("expected submit, got {:?}", other),
        };
        assert_matches!(mutation, PendingMutation::Update { .. });
        assert_eq!(mutation.zone_id(), "Z1");
        let record = mutation.record();
        assert_eq!(record.name, "www.a.com.");
        assert_eq!(record.record_type, "A");
        assert_eq!(record.ttl, Some(300));
        assert_eq!(record.values, vec!["10.0.0.1"]);
        assert_eq!(record.routing.weight, Some(10));

        assert!(workflow.is_submitting());
        assert_eq!(
            workflow.handle_key(key(KeyCode::Esc)),
            WorkflowOutcome::Pending
        );
    }

    #[test]
    fn test_blank_values_are_rejected_inline() {
        let mut workflow = open_form();
        workflow.handle_key(key(KeyCode::Tab));
        for _ in 0..12 {
            workflow.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut workflow, " , ");
        let outcome = workflow.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(outcome, WorkflowOutcome::Pending);
        assert_eq!(form(&workflow).error(), Some(&ValidationError::NoValues));
    }

    #[test]
    fn test_values_field_accepts_multiple_lines() {
        let mut workflow = open_form();
        workflow.handle_key(key(KeyCode::Tab));
        workflow.handle_key(key(KeyCode::Enter));
        type_text(&mut workflow, "10.0.0.2");
        assert_eq!(form(&workflow).values_input(), "10.0.0.1\n10.0.0.2");
    }

    #[test]
    fn test_type_cycles_with_arrows() {
        let mut workflow = open_form();
        workflow.handle_key(key(KeyCode::Right));
        assert_eq!(form(&workflow).record_type(), "AAAA");
        workflow.handle_key(key(KeyCode::Left));
        workflow.handle_key(key(KeyCode::Left));
        assert_eq!(form(&workflow).record_type(), "DNSKEY");
    }

    #[test]
    fn test_escape_and_cancel_button_close_form() {
        let mut workflow = open_form();
        assert_eq!(
            workflow.handle_key(key(KeyCode::Esc)),
            WorkflowOutcome::Closed
        );
        assert!(!workflow.owns_input());

        let mut workflow = open_form();
        workflow.handle_key(key(KeyCode::BackTab));
        assert_eq!(form(&workflow).focused(), FormField::Cancel);
        assert_eq!(
            workflow.handle_key(key(KeyCode::Enter)),
            WorkflowOutcome::Closed
        );
    }

    #[test]
    fn test_delete_defaults_to_cancel() {
        let mut workflow = EditWorkflow::default();
        workflow.open_delete("Z1".to_string(), www_record());
        if let EditWorkflow::ConfirmDelete(confirm) = &workflow {
            assert_eq!(confirm.prompt(), "Delete www.a.com (A)?");
            assert_eq!(confirm.choice(), DeleteChoice::Cancel);
        }
        assert_eq!(
            workflow.handle_key(key(KeyCode::Enter)),
            WorkflowOutcome::Closed
        );
        assert!(!workflow.owns_input());
    }

    #[test]
    fn test_delete_confirmed_after_selecting_delete() {
        let mut workflow = EditWorkflow::default();
        workflow.open_delete("Z1".to_string(), www_record());
        assert_eq!(
            workflow.handle_key(key(KeyCode::Right)),
            WorkflowOutcome::Pending
        );
        let outcome = workflow.handle_key(key(KeyCode::Enter));
        assert_eq!(
            outcome,
            WorkflowOutcome::Submit(PendingMutation::Delete {
                zone_id: "Z1".to_string(),
                record: www_record(),
            })
        );
        assert!(workflow.is_submitting());
        workflow.finish();
        assert!(!workflow.owns_input());
    }

    #[test]
    fn test_delete_escape_has_no_side_effect() {
        let mut workflow = EditWorkflow::default();
        workflow.open_delete("Z1".to_string(), www_record());
        workflow.handle_key(key(KeyCode::Right));
        assert_eq!(
            workflow.handle_key(key(KeyCode::Esc)),
            WorkflowOutcome::Closed
        );
    }
}
