use crate::adapters::tui::components::filter_bar::{FilterInput, draw_filter_bar};
use crate::adapters::tui::components::record_form::draw_edit_workflow;
use crate::adapters::tui::components::resource_table::{
    TableView, draw_footer, draw_resource_table, multi_line_cell,
};
use crate::adapters::tui::edit_workflow::{EditWorkflow, PendingMutation, WorkflowOutcome};
use crate::adapters::tui::status::StatusLine;
use crate::adapters::tui::views::{
    ResourceView, ViewFocus, handle_filter_key, handle_table_navigation, split_view_area,
    view_focus,
};
use crate::adapters::tui::worker::TaskRunner;
use crate::core::context::AppContext;
use crate::core::error::AwsApiError;
use crate::core::filter::DrillLevel;
use crate::core::types::{DnsRecord, HostedZone, trim_dot};
use crate::ports::DnsDataSource;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    widgets::{Cell, Row},
};
use std::sync::Arc;
use tracing::debug;

const ZONE_HEADERS: [&str; 4] = ["Name", "Records", "Visibility", "ID"];
const ZONE_WIDTHS: [Constraint; 4] = [
    Constraint::Percentage(40),
    Constraint::Percentage(12),
    Constraint::Percentage(13),
    Constraint::Percentage(35),
];
const RECORD_HEADERS: [&str; 5] = ["Record name", "Type", "Value", "TTL", "Weight"];
const RECORD_WIDTHS: [Constraint; 5] = [
    Constraint::Percentage(30),
    Constraint::Percentage(8),
    Constraint::Percentage(46),
    Constraint::Percentage(8),
    Constraint::Percentage(8),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Zones,
    Records,
    Mutation,
}

enum Message {
    Zones(Result<Vec<HostedZone>, AwsApiError>),
    Records {
        zone: HostedZone,
        switch_level: bool,
        result: Result<Vec<DnsRecord>, AwsApiError>,
    },
    Mutation {
        mutation: PendingMutation,
        result: Result<(), AwsApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Zones,
    Records,
}

/// Hosted zones and their record sets, with record edit and delete.
pub(crate) struct Route53View {
    dns: Arc<dyn DnsDataSource>,
    tasks: TaskRunner<Slot, Message>,
    level: Level,
    zones: DrillLevel<HostedZone>,
    records: DrillLevel<DnsRecord>,
    records_zone: Option<HostedZone>,
    records_request: Option<String>,
    filter: FilterInput,
    workflow: EditWorkflow,
    active: bool,
}

impl Route53View {
    pub(crate) fn new(ctx: &AppContext) -> Self {
        Self {
            dns: ctx.dns.clone(),
            tasks: TaskRunner::new(),
            level: Level::Zones,
            zones: DrillLevel::default(),
            records: DrillLevel::default(),
            records_zone: None,
            records_request: None,
            filter: FilterInput::default(),
            workflow: EditWorkflow::default(),
            active: false,
        }
    }

    fn fetch_zones(&mut self, status: &mut StatusLine) {
        status.set_status("Fetching hosted zones...");
        status.clear_error();
        let dns = self.dns.clone();
        self.tasks.run(Slot::Zones, async move {
            Message::Zones(dns.list_hosted_zones().await)
        });
    }

    fn fetch_records(&mut self, zone: HostedZone, switch_level: bool, status: &mut StatusLine) {
        status.set_status(format!("Fetching records for {}...", trim_dot(&zone.name)));
        status.clear_error();
        self.records_request = Some(zone.id.clone());
        let dns = self.dns.clone();
        self.tasks.run(Slot::Records, async move {
            let result = dns.list_records(&zone.id).await;
            Message::Records {
                zone,
                switch_level,
                result,
            }
        });
    }

    fn submit(&mut self, mutation: PendingMutation, status: &mut StatusLine) {
        status.set_status(mutation.progress_message());
        status.clear_error();
        let dns = self.dns.clone();
        self.tasks.run(Slot::Mutation, async move {
            let result = match &mutation {
                PendingMutation::Update { zone_id, record } => {
                    dns.upsert_record(zone_id, record).await
                }
                PendingMutation::Delete { zone_id, record } => {
                    dns.delete_record(zone_id, record).await
                }
            };
            Message::Mutation { mutation, result }
        });
    }

    fn descend(&mut self, status: &mut StatusLine) {
        let Some(zone) = self.zones.selected_item().cloned() else {
            return;
        };
        if self.records.is_loaded_for(&zone.id) {
            debug!("Reusing cached records for zone {}", zone.id);
            self.tasks.cancel(Slot::Records);
            self.level = Level::Records;
            return;
        }
        self.fetch_records(zone, true, status);
    }

    /// The record an edit or delete would act on, or the status message
    /// explaining why there is none.
    fn actionable_record(&self, missing: &'static str) -> Result<(String, DnsRecord), &'static str> {
        if self.level != Level::Records {
            return Err("Select a hosted zone first");
        }
        let zone_id = self
            .records
            .parent_key()
            .ok_or("Select a hosted zone first")?
            .to_string();
        let record = self.records.selected_item().ok_or(missing)?;
        if record.is_alias() {
            return Err("Alias records are read-only");
        }
        Ok((zone_id, record.clone()))
    }

    fn begin_edit(&mut self, status: &mut StatusLine) {
        match self.actionable_record("Select a record to edit") {
            Ok((_, record)) if record.values.is_empty() => {
                status.set_status("This record has no editable values");
            }
            Ok((zone_id, record)) => self.workflow.open_form(zone_id, record),
            Err(message) => status.set_status(message),
        }
    }

    fn begin_delete(&mut self, status: &mut StatusLine) {
        match self.actionable_record("Select a record to delete") {
            Ok((zone_id, record)) => self.workflow.open_delete(zone_id, record),
            Err(message) => status.set_status(message),
        }
    }

    fn apply(&mut self, message: Message, status: &mut StatusLine) {
        match message {
            Message::Zones(Ok(zones)) => {
                status.set_status(format!("Loaded {} hosted zones", zones.len()));
                self.zones.replace_items(None, zones);
            }
            Message::Zones(Err(e)) => status.set_error(format!("list hosted zones: {}", e)),
            Message::Records {
                zone,
                switch_level,
                result,
            } => match result {
                Ok(records) => {
                    status.set_status(format!("Loaded {} records", records.len()));
                    self.records.replace_items(Some(zone.id.clone()), records);
                    self.records_zone = Some(zone);
                    if switch_level {
                        self.level = Level::Records;
                    }
                }
                Err(e) => status.set_error(format!("list records: {}", e)),
            },
            Message::Mutation { mutation, result } => {
                self.workflow.finish();
                match result {
                    Ok(()) => {
                        status.set_status(mutation.done_message());
                        let zone = self
                            .records_zone
                            .clone()
                            .filter(|z| z.id == mutation.zone_id());
                        let other_zone_loading = self.tasks.is_pending(Slot::Records)
                            && self.records_request.as_deref() != Some(mutation.zone_id());
                        match zone {
                            Some(_) if other_zone_loading => {
                                debug!("Skipping refetch, records of another zone are loading");
                            }
                            Some(zone) => self.fetch_records(zone, false, status),
                            None => {}
                        }
                    }
                    Err(e) => status.set_error(format!("{}: {}", mutation.error_prefix(), e)),
                }
            }
        }
    }

    fn zone_rows(&self) -> Vec<Row<'static>> {
        self.zones
            .visible_items()
            .map(|zone| {
                Row::new(vec![
                    Cell::from(trim_dot(&zone.name).to_string()),
                    Cell::from(zone.record_count.to_string()),
                    Cell::from(if zone.private_zone { "private" } else { "public" }),
                    Cell::from(zone.short_id().to_string()),
                ])
            })
            .collect()
    }

    fn record_rows(&self) -> Vec<Row<'static>> {
        self.records
            .visible_items()
            .map(|record| {
                let (values, height) = multi_line_cell(&record.display_values());
                let ttl = record
                    .ttl
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let weight = record
                    .routing
                    .weight
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    Cell::from(record.display_name().to_string()),
                    Cell::from(record.record_type.clone()),
                    values,
                    Cell::from(ttl),
                    Cell::from(weight),
                ])
                .height(height)
            })
            .collect()
    }
}

impl ResourceView for Route53View {
    fn name(&self) -> &'static str {
        "route53"
    }

    fn title(&self) -> &'static str {
        "Amazon Route53 – hosted zones › records"
    }

    fn init(&mut self, status: &mut StatusLine) {
        self.fetch_zones(status);
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn refresh(&mut self, status: &mut StatusLine) {
        match self.level {
            Level::Zones => self.fetch_zones(status),
            Level::Records => {
                if let Some(zone) = self.records_zone.clone() {
                    self.fetch_records(zone, false, status);
                }
            }
        }
    }

    fn enter_filter_mode(&mut self, _status: &mut StatusLine) -> bool {
        let current = match self.level {
            Level::Zones => self.zones.query().to_string(),
            Level::Records => self.records.query().to_string(),
        };
        self.filter.open(&current);
        true
    }

    fn in_filter_mode(&self) -> bool {
        self.filter.is_active()
    }

    fn has_modal(&self) -> bool {
        self.workflow.owns_input()
    }

    fn focus(&self) -> ViewFocus {
        view_focus(self.active, self.has_modal(), self.in_filter_mode())
    }

    fn handle_input(&mut self, key: KeyEvent, status: &mut StatusLine) -> bool {
        if self.workflow.owns_input() {
            if let WorkflowOutcome::Submit(mutation) = self.workflow.handle_key(key) {
                self.submit(mutation, status);
            }
            return true;
        }
        if self.filter.is_active() {
            match self.level {
                Level::Zones => handle_filter_key(&mut self.filter, &mut self.zones, key),
                Level::Records => handle_filter_key(&mut self.filter, &mut self.records, key),
            }
            return true;
        }

        let navigated = match self.level {
            Level::Zones => handle_table_navigation(&mut self.zones, &key),
            Level::Records => handle_table_navigation(&mut self.records, &key),
        };
        if navigated {
            return true;
        }

        match key.code {
            KeyCode::Char('d') | KeyCode::Char('D')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.begin_delete(status);
                true
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.begin_edit(status);
                true
            }
            KeyCode::Enter if self.level == Level::Zones => {
                self.descend(status);
                true
            }
            KeyCode::Esc if self.level == Level::Records => {
                self.level = Level::Zones;
                true
            }
            _ => false,
        }
    }

    fn poll_tasks(&mut self, status: &mut StatusLine) {
        for (_, message) in self.tasks.drain() {
            self.apply(message, status);
        }
        for slot in self.tasks.take_failed() {
            let operation = match slot {
                Slot::Zones => "list hosted zones",
                Slot::Records => "list records",
                Slot::Mutation => {
                    self.workflow.finish();
                    "change record"
                }
            };
            status.set_error(format!("{}: background task aborted", operation));
        }
    }

    fn has_pending_tasks(&self) -> bool {
        self.tasks.has_pending()
    }

    fn breadcrumb(&self) -> String {
        match (self.level, &self.records_zone) {
            (Level::Records, Some(zone)) => {
                format!("<hosted zones> › <records: {}>", trim_dot(&zone.name))
            }
            _ => "<hosted zones>".to_string(),
        }
    }

    fn total_items(&self) -> usize {
        match self.level {
            Level::Zones => self.zones.visible_len(),
            Level::Records => self.records.visible_len(),
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let areas = split_view_area(area);
        let focused = self.focus() == ViewFocus::Table;
        match self.level {
            Level::Zones => {
                draw_resource_table(
                    frame,
                    areas.table,
                    TableView {
                        title: " Hosted zones ".to_string(),
                        headers: &ZONE_HEADERS,
                        widths: &ZONE_WIDTHS,
                        rows: self.zone_rows(),
                        selected: self.zones.selected_index(),
                        focused,
                        loading: self.tasks.is_pending(Slot::Zones),
                        empty_message: "No hosted zones found",
                    },
                );
                draw_filter_bar(frame, areas.filter, &self.filter, self.zones.query());
            }
            Level::Records => {
                let zone_name = self
                    .records_zone
                    .as_ref()
                    .map(|z| trim_dot(&z.name).to_string())
                    .unwrap_or_default();
                draw_resource_table(
                    frame,
                    areas.table,
                    TableView {
                        title: format!(" Records – {} ", zone_name),
                        headers: &RECORD_HEADERS,
                        widths: &RECORD_WIDTHS,
                        rows: self.record_rows(),
                        selected: self.records.selected_index(),
                        focused,
                        loading: self.tasks.is_pending(Slot::Records),
                        empty_message: "No records found",
                    },
                );
                draw_filter_bar(frame, areas.filter, &self.filter, self.records.query());
            }
        }
        draw_footer(frame, areas.footer, self.total_items(), &self.breadcrumb());
        draw_edit_workflow(frame, area, &self.workflow);
    }
}
