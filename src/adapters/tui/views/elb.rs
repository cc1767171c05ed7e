use crate::adapters::tui::components::filter_bar::{FilterInput, draw_filter_bar};
use crate::adapters::tui::components::resource_table::{
    TableView, draw_footer, draw_resource_table,
};
use crate::adapters::tui::status::StatusLine;
use crate::adapters::tui::text_utils::format_timestamp;
use crate::adapters::tui::views::{
    ResourceView, ViewFocus, handle_filter_key, handle_table_navigation, split_view_area,
    view_focus,
};
use crate::adapters::tui::worker::TaskRunner;
use crate::core::context::AppContext;
use crate::core::error::AwsApiError;
use crate::core::filter::DrillLevel;
use crate::core::types::{Listener, ListenerRule, LoadBalancer, summarize_actions};
use crate::ports::LoadBalancerDataSource;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    widgets::{Cell, Row},
};
use std::sync::Arc;
use tracing::debug;

const LOAD_BALANCER_HEADERS: [&str; 5] = ["Name", "Type", "DNS name", "State", "Created"];
const LOAD_BALANCER_WIDTHS: [Constraint; 5] = [
    Constraint::Percentage(22),
    Constraint::Percentage(10),
    Constraint::Percentage(40),
    Constraint::Percentage(10),
    Constraint::Percentage(18),
];
const LISTENER_HEADERS: [&str; 3] = ["Protocol", "Port", "Default action"];
const LISTENER_WIDTHS: [Constraint; 3] = [
    Constraint::Percentage(15),
    Constraint::Percentage(10),
    Constraint::Percentage(75),
];
const RULE_HEADERS: [&str; 5] = ["Priority", "Condition", "Value", "Action", "Target"];
const RULE_WIDTHS: [Constraint; 5] = [
    Constraint::Percentage(10),
    Constraint::Percentage(15),
    Constraint::Percentage(30),
    Constraint::Percentage(15),
    Constraint::Percentage(30),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    LoadBalancers,
    Listeners,
    Rules,
}

enum Message {
    LoadBalancers(Result<Vec<LoadBalancer>, AwsApiError>),
    Listeners {
        load_balancer: LoadBalancer,
        switch_level: bool,
        result: Result<Vec<Listener>, AwsApiError>,
    },
    Rules {
        listener: Listener,
        switch_level: bool,
        result: Result<Vec<ListenerRule>, AwsApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    LoadBalancers,
    Listeners,
    Rules,
}

fn listener_label(listener: &Listener) -> String {
    match listener.port {
        Some(port) => format!("{}:{}", listener.protocol, port),
        None => listener.protocol.clone(),
    }
}

pub(crate) struct ElbView {
    source: Arc<dyn LoadBalancerDataSource>,
    tasks: TaskRunner<Slot, Message>,
    level: Level,
    load_balancers: DrillLevel<LoadBalancer>,
    listeners: DrillLevel<Listener>,
    rules: DrillLevel<ListenerRule>,
    listeners_parent: Option<LoadBalancer>,
    rules_parent: Option<Listener>,
    filter: FilterInput,
    active: bool,
}

impl ElbView {
    pub(crate) fn new(ctx: &AppContext) -> Self {
        Self {
            source: ctx.load_balancers.clone(),
            tasks: TaskRunner::new(),
            level: Level::LoadBalancers,
            load_balancers: DrillLevel::default(),
            listeners: DrillLevel::default(),
            rules: DrillLevel::default(),
            listeners_parent: None,
            rules_parent: None,
            filter: FilterInput::default(),
            active: false,
        }
    }

    fn fetch_load_balancers(&mut self, status: &mut StatusLine) {
        status.set_status("Fetching load balancers...");
        status.clear_error();
        let source = self.source.clone();
        self.tasks.run(Slot::LoadBalancers, async move {
            Message::LoadBalancers(source.list_load_balancers().await)
        });
    }

    fn fetch_listeners(
        &mut self,
        load_balancer: LoadBalancer,
        switch_level: bool,
        status: &mut StatusLine,
    ) {
        status.set_status(format!("Fetching listeners for {}...", load_balancer.name));
        status.clear_error();
        let source = self.source.clone();
        self.tasks.run(Slot::Listeners, async move {
            let result = source.list_listeners(&load_balancer.arn).await;
            Message::Listeners {
                load_balancer,
                switch_level,
                result,
            }
        });
    }

    fn fetch_rules(&mut self, listener: Listener, switch_level: bool, status: &mut StatusLine) {
        status.set_status(format!("Fetching rules for {}...", listener_label(&listener)));
        status.clear_error();
        let source = self.source.clone();
        self.tasks.run(Slot::Rules, async move {
            let result = source.list_rules(&listener.arn).await;
            Message::Rules {
                listener,
                switch_level,
                result,
            }
        });
    }

    fn descend(&mut self, status: &mut StatusLine) {
        match self.level {
            Level::LoadBalancers => {
                let Some(load_balancer) = self.load_balancers.selected_item().cloned() else {
                    return;
                };
                if self.listeners.is_loaded_for(&load_balancer.arn) {
                    debug!("Reusing cached listeners for {}", load_balancer.name);
                    self.tasks.cancel(Slot::Listeners);
                    self.level = Level::Listeners;
                } else {
                    self.fetch_listeners(load_balancer, true, status);
                }
            }
            Level::Listeners => {
                let Some(listener) = self.listeners.selected_item().cloned() else {
                    return;
                };
                if self.rules.is_loaded_for(&listener.arn) {
                    debug!("Reusing cached rules for {}", listener.arn);
                    self.tasks.cancel(Slot::Rules);
                    self.level = Level::Rules;
                } else {
                    self.fetch_rules(listener, true, status);
                }
            }
            Level::Rules => {}
        }
    }

    fn ascend(&mut self) -> bool {
        match self.level {
            Level::LoadBalancers => return false,
            Level::Listeners => {
                // A pending rules descent must not land on the load balancer level.
                self.tasks.cancel(Slot::Rules);
                self.level = Level::LoadBalancers;
            }
            Level::Rules => self.level = Level::Listeners,
        }
        true
    }

    fn apply(&mut self, message: Message, status: &mut StatusLine) {
        match message {
            Message::LoadBalancers(Ok(items)) => {
                status.set_status(format!("Loaded {} load balancers", items.len()));
                self.load_balancers.replace_items(None, items);
            }
            Message::LoadBalancers(Err(e)) => {
                status.set_error(format!("describe load balancers: {}", e))
            }
            Message::Listeners {
                load_balancer,
                switch_level,
                result,
            } => match result {
                Ok(items) => {
                    status.set_status(format!("Loaded {} listeners", items.len()));
                    self.listeners
                        .replace_items(Some(load_balancer.arn.clone()), items);
                    self.listeners_parent = Some(load_balancer);
                    if switch_level {
                        self.level = Level::Listeners;
                    }
                }
                Err(e) => status.set_error(format!("describe listeners: {}", e)),
            },
            Message::Rules {
                listener,
                switch_level,
                result,
            } => match result {
                Ok(items) => {
                    status.set_status(format!("Loaded {} rules", items.len()));
                    self.rules.replace_items(Some(listener.arn.clone()), items);
                    self.rules_parent = Some(listener);
                    if switch_level {
                        self.level = Level::Rules;
                    }
                }
                Err(e) => status.set_error(format!("describe rules: {}", e)),
            },
        }
    }

    fn load_balancer_rows(&self) -> Vec<Row<'static>> {
        self.load_balancers
            .visible_items()
            .map(|lb| {
                Row::new(vec![
                    Cell::from(lb.name.clone()),
                    Cell::from(lb.lb_type.clone()),
                    Cell::from(lb.dns_name.clone()),
                    Cell::from(lb.state.clone()),
                    Cell::from(format_timestamp(lb.created_at.as_ref())),
                ])
            })
            .collect()
    }

    fn listener_rows(&self) -> Vec<Row<'static>> {
        self.listeners
            .visible_items()
            .map(|listener| {
                Row::new(vec![
                    Cell::from(listener.protocol.clone()),
                    Cell::from(
                        listener
                            .port
                            .map(|p| p.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(summarize_actions(&listener.default_actions)),
                ])
            })
            .collect()
    }

    fn rule_rows(&self) -> Vec<Row<'static>> {
        self.rules
            .visible_items()
            .map(|rule| {
                let (condition, value) = rule.condition_summary();
                let (action, target) = rule.action_summary();
                Row::new(vec![
                    Cell::from(rule.priority_label().to_string()),
                    Cell::from(condition),
                    Cell::from(value),
                    Cell::from(action),
                    Cell::from(target),
                ])
            })
            .collect()
    }
}

impl ResourceView for ElbView {
    fn name(&self) -> &'static str {
        "elb"
    }

    fn title(&self) -> &'static str {
        "Elastic Load Balancing – load balancers › listeners › rules"
    }

    fn init(&mut self, status: &mut StatusLine) {
        self.fetch_load_balancers(status);
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn refresh(&mut self, status: &mut StatusLine) {
        match self.level {
            Level::LoadBalancers => self.fetch_load_balancers(status),
            Level::Listeners => {
                if let Some(load_balancer) = self.listeners_parent.clone() {
                    self.fetch_listeners(load_balancer, false, status);
                }
            }
            Level::Rules => {
                if let Some(listener) = self.rules_parent.clone() {
                    self.fetch_rules(listener, false, status);
                }
            }
        }
    }

    fn enter_filter_mode(&mut self, status: &mut StatusLine) -> bool {
        if self.level != Level::LoadBalancers {
            status.set_status("Filtering only applies to load balancers");
            return false;
        }
        self.filter.open(self.load_balancers.query());
        true
    }

    fn in_filter_mode(&self) -> bool {
        self.filter.is_active()
    }

    fn has_modal(&self) -> bool {
        false
    }

    fn focus(&self) -> ViewFocus {
        view_focus(self.active, false, self.in_filter_mode())
    }

    fn handle_input(&mut self, key: KeyEvent, status: &mut StatusLine) -> bool {
        if self.filter.is_active() {
            handle_filter_key(&mut self.filter, &mut self.load_balancers, key);
            return true;
        }

        let navigated = match self.level {
            Level::LoadBalancers => handle_table_navigation(&mut self.load_balancers, &key),
            Level::Listeners => handle_table_navigation(&mut self.listeners, &key),
            Level::Rules => handle_table_navigation(&mut self.rules, &key),
        };
        if navigated {
            return true;
        }

        match key.code {
            KeyCode::Enter => {
                self.descend(status);
                true
            }
            KeyCode::Esc => self.ascend(),
            _ => false,
        }
    }

    fn poll_tasks(&mut self, status: &mut StatusLine) {
        for (_, message) in self.tasks.drain() {
            self.apply(message, status);
        }
        for slot in self.tasks.take_failed() {
            let operation = match slot {
                Slot::LoadBalancers => "describe load balancers",
                Slot::Listeners => "describe listeners",
                Slot::Rules => "describe rules",
            };
            status.set_error(format!("{}: background task aborted", operation));
        }
    }

    fn has_pending_tasks(&self) -> bool {
        self.tasks.has_pending()
    }

    fn breadcrumb(&self) -> String {
        let mut crumbs = vec!["<load balancers>".to_string()];
        if matches!(self.level, Level::Listeners | Level::Rules) {
            if let Some(lb) = &self.listeners_parent {
                crumbs.push(format!("<listeners: {}>", lb.name));
            }
        }
        if self.level == Level::Rules {
            if let Some(listener) = &self.rules_parent {
                crumbs.push(format!("<rules: {}>", listener_label(listener)));
            }
        }
        crumbs.join(" › ")
    }

    fn total_items(&self) -> usize {
        match self.level {
            Level::LoadBalancers => self.load_balancers.visible_len(),
            Level::Listeners => self.listeners.visible_len(),
            Level::Rules => self.rules.visible_len(),
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let areas = split_view_area(area);
        let focused = self.focus() == ViewFocus::Table;
        let table = match self.level {
            Level::LoadBalancers => TableView {
                title: " Load balancers ".to_string(),
                headers: &LOAD_BALANCER_HEADERS,
                widths: &LOAD_BALANCER_WIDTHS,
                rows: self.load_balancer_rows(),
                selected: self.load_balancers.selected_index(),
                focused,
                loading: self.tasks.is_pending(Slot::LoadBalancers),
                empty_message: "No load balancers found",
            },
            Level::Listeners => TableView {
                title: format!(
                    " Listeners – {} ",
                    self.listeners_parent
                        .as_ref()
                        .map(|lb| lb.name.as_str())
                        .unwrap_or_default()
                ),
                headers: &LISTENER_HEADERS,
                widths: &LISTENER_WIDTHS,
                rows: self.listener_rows(),
                selected: self.listeners.selected_index(),
                focused,
                loading: self.tasks.is_pending(Slot::Listeners),
                empty_message: "No listeners found",
            },
            Level::Rules => TableView {
                title: format!(
                    " Rules – {} ",
                    self.rules_parent
                        .as_ref()
                        .map(listener_label)
                        .unwrap_or_default()
                ),
                headers: &RULE_HEADERS,
                widths: &RULE_WIDTHS,
                rows: self.rule_rows(),
                selected: self.rules.selected_index(),
                focused,
                loading: self.tasks.is_pending(Slot::Rules),
                empty_message: "No rules found",
            },
        };
        draw_resource_table(frame, areas.table, table);
        draw_filter_bar(frame, areas.filter, &self.filter, self.load_balancers.query());
        draw_footer(frame, areas.footer, self.total_items(), &self.breadcrumb());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::tui::views::test_support::{self, TestContext, pump};
    use crate::core::types::{ListenerAction, RuleCondition};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn load_balancer(name: &str) -> LoadBalancer {
        LoadBalancer {
            arn: format!(
                "arn:aws:elasticloadbalancing:eu-west-1:1:loadbalancer/app/{}/abc",
                name
            ),
            name: name.to_string(),
            lb_type: "application".to_string(),
            dns_name: format!("{}.eu-west-1.elb.amazonaws.com", name),
            state: "active".to_string(),
            created_at: None,
        }
    }

    fn https_listener(lb: &LoadBalancer) -> Listener {
        Listener {
            arn: format!("{}/listener/443", lb.arn),
            protocol: "HTTPS".to_string(),
            port: Some(443),
            default_actions: vec![ListenerAction::Forward {
                target_group_arns: vec![
                    "arn:aws:elasticloadbalancing:eu-west-1:1:targetgroup/web/1".to_string(),
                ],
            }],
        }
    }

    fn path_rule(listener: &Listener) -> ListenerRule {
        ListenerRule {
            arn: format!("{}/rule/1", listener.arn),
            priority: Some("10".to_string()),
            conditions: vec![RuleCondition {
                field: "path-pattern".to_string(),
                values: vec!["/api/*".to_string()],
            }],
            actions: vec![ListenerAction::FixedResponse {
                status_code: Some("404".to_string()),
            }],
        }
    }

    fn seed(ctx: &TestContext) -> (LoadBalancer, Listener) {
        let web = load_balancer("web");
        let listener = https_listener(&web);
        ctx.load_balancers
            .set_load_balancers(Ok(vec![web.clone(), load_balancer("internal")]));
        ctx.load_balancers
            .set_listeners(&web.arn, Ok(vec![listener.clone()]));
        ctx.load_balancers
            .set_rules(&listener.arn, Ok(vec![path_rule(&listener)]));
        (web, listener)
    }

    async fn loaded_view(ctx: &TestContext, status: &mut StatusLine) -> ElbView {
        let mut view = ElbView::new(&ctx.ctx);
        view.init(status);
        view.activate();
        pump(&mut view, status).await;
        view
    }

    async fn at_rules(ctx: &TestContext, status: &mut StatusLine) -> ElbView {
        let mut view = loaded_view(ctx, status).await;
        view.handle_input(key(KeyCode::Enter), status);
        pump(&mut view, status).await;
        view.handle_input(key(KeyCode::Enter), status);
        pump(&mut view, status).await;
        view
    }

    #[tokio::test]
    async fn test_drill_down_to_rules() {
        let ctx = test_support::context();
        seed(&ctx);
        let mut status = StatusLine::default();
        let view = at_rules(&ctx, &mut status).await;

        assert_eq!(view.level, Level::Rules);
        assert_eq!(
            view.breadcrumb(),
            "<load balancers> › <listeners: web> › <rules: HTTPS:443>"
        );
        let rule = view.rules.selected_item().cloned().unwrap();
        assert_eq!(rule.condition_summary().1, "/api/*");
        assert_eq!(
            rule.action_summary(),
            ("fixed-response".to_string(), "404".to_string())
        );
    }

    #[tokio::test]
    async fn test_cached_descent_supersedes_pending_fetch() {
        let ctx = test_support::context();
        seed(&ctx);
        let mut status = StatusLine::default();
        let mut view = loaded_view(&ctx, &mut status).await;
        view.handle_input(key(KeyCode::Enter), &mut status);
        pump(&mut view, &mut status).await;

        view.handle_input(key(KeyCode::Esc), &mut status);
        view.handle_input(key(KeyCode::Down), &mut status);
        view.handle_input(key(KeyCode::Enter), &mut status);
        view.handle_input(key(KeyCode::Up), &mut status);
        view.handle_input(key(KeyCode::Enter), &mut status);
        pump(&mut view, &mut status).await;

        assert_eq!(view.level, Level::Listeners);
        assert_eq!(view.breadcrumb(), "<load balancers> › <listeners: web>");
        assert_eq!(view.listeners.visible_len(), 1);
    }

    #[tokio::test]
    async fn test_pending_rules_descent_is_dropped_after_ascend() {
        let ctx = test_support::context();
        seed(&ctx);
        let mut status = StatusLine::default();
        let mut view = loaded_view(&ctx, &mut status).await;
        view.handle_input(key(KeyCode::Enter), &mut status);
        pump(&mut view, &mut status).await;

        view.handle_input(key(KeyCode::Enter), &mut status);
        view.handle_input(key(KeyCode::Esc), &mut status);
        pump(&mut view, &mut status).await;

        assert_eq!(view.level, Level::LoadBalancers);
        assert_eq!(view.breadcrumb(), "<load balancers>");
    }

    #[tokio::test]
    async fn test_successful_retry_clears_error() {
        let ctx = test_support::context();
        ctx.load_balancers
            .set_load_balancers(Err("throttled".to_string()));
        let mut status = StatusLine::default();
        let mut view = loaded_view(&ctx, &mut status).await;
        assert!(status.error().is_some());

        seed(&ctx);
        view.refresh(&mut status);
        pump(&mut view, &mut status).await;

        assert_eq!(status.status(), "Loaded 2 load balancers");
        assert_eq!(status.error(), None);
    }

    #[tokio::test]
    async fn test_filter_refused_below_load_balancers() {
        let ctx = test_support::context();
        seed(&ctx);
        let mut status = StatusLine::default();
        let mut view = loaded_view(&ctx, &mut status).await;
        view.handle_input(key(KeyCode::Enter), &mut status);
        pump(&mut view, &mut status).await;

        assert!(!view.enter_filter_mode(&mut status));
        assert!(!view.in_filter_mode());
        assert_eq!(status.status(), "Filtering only applies to load balancers");

        view.handle_input(key(KeyCode::Esc), &mut status);
        assert!(view.enter_filter_mode(&mut status));
        for c in "inter".chars() {
            view.handle_input(key(KeyCode::Char(c)), &mut status);
        }
        view.handle_input(key(KeyCode::Enter), &mut status);
        assert_eq!(
            view.load_balancers.selected_item().map(|lb| lb.name.as_str()),
            Some("internal")
        );
    }

    #[tokio::test]
    async fn test_refresh_on_listeners_refetches_listeners_only() {
        let ctx = test_support::context();
        let (web, _) = seed(&ctx);
        let mut status = StatusLine::default();
        let mut view = loaded_view(&ctx, &mut status).await;
        view.handle_input(key(KeyCode::Enter), &mut status);
        pump(&mut view, &mut status).await;

        view.refresh(&mut status);
        pump(&mut view, &mut status).await;

        assert_eq!(
            ctx.load_balancers.calls(),
            vec![
                ("list_load_balancers".to_string(), String::new()),
                ("list_listeners".to_string(), web.arn.clone()),
                ("list_listeners".to_string(), web.arn),
            ]
        );
        assert_eq!(view.level, Level::Listeners);
    }

    #[tokio::test]
    async fn test_ascend_keeps_cached_levels() {
        let ctx = test_support::context();
        seed(&ctx);
        let mut status = StatusLine::default();
        let mut view = at_rules(&ctx, &mut status).await;

        view.handle_input(key(KeyCode::Esc), &mut status);
        view.handle_input(key(KeyCode::Esc), &mut status);
        assert_eq!(view.level, Level::LoadBalancers);
        assert!(!view.handle_input(key(KeyCode::Esc), &mut status));

        view.handle_input(key(KeyCode::Enter), &mut status);
        view.handle_input(key(KeyCode::Enter), &mut status);
        assert!(!view.has_pending_tasks());
        assert_eq!(view.level, Level::Rules);
        assert_eq!(ctx.load_balancers.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_listener_error_is_reported() {
        let ctx = test_support::context();
        let (web, _) = seed(&ctx);
        ctx.load_balancers
            .set_listeners(&web.arn, Err("access denied".to_string()));
        let mut status = StatusLine::default();
        let mut view = loaded_view(&ctx, &mut status).await;

        view.handle_input(key(KeyCode::Enter), &mut status);
        pump(&mut view, &mut status).await;

        assert_eq!(view.level, Level::LoadBalancers);
        assert_eq!(
            status.error(),
            Some("describe listeners: ELBv2 DescribeListeners failed: access denied")
        );
    }
}
