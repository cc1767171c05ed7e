use crate::adapters::tui::status::StatusLine;
use crate::adapters::tui::views::ResourceView;
use crate::config::models::AwsSettings;
use crate::core::context::AppContext;
use crate::core::error::AwsApiError;
use crate::core::types::{
    ContainerImage, DnsRecord, HostedZone, Listener, ListenerRule, LoadBalancer, Repository,
    RoutingPolicy,
};
use crate::ports::{
    DnsDataSource, LoadBalancerDataSource, MockClipboardPort, RegistryDataSource, ViewStateStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type CallLog = Arc<Mutex<Vec<(String, String)>>>;

fn mock_error(service: &str, operation: &str, message: &str) -> AwsApiError {
    AwsApiError::api_call(service, operation, std::io::Error::other(message.to_string()))
}

fn log_call(log: &CallLog, operation: &str, key: &str) {
    log.lock()
        .unwrap()
        .push((operation.to_string(), key.to_string()));
}

/// Scripted list result: items, or an error message to fail with.
pub(crate) type Scripted<T> = Result<Vec<T>, String>;

#[derive(Default)]
pub(crate) struct MockDnsDataSource {
    zones: Mutex<Option<Scripted<HostedZone>>>,
    records: Mutex<HashMap<String, Scripted<DnsRecord>>>,
    mutation_error: Mutex<Option<String>>,
    panic_on_mutation: Mutex<bool>,
    call_log: CallLog,
}

impl MockDnsDataSource {
    pub(crate) fn set_zones(&self, zones: Scripted<HostedZone>) {
        *self.zones.lock().unwrap() = Some(zones);
    }

    pub(crate) fn set_records(&self, zone_id: &str, records: Scripted<DnsRecord>) {
        self.records
            .lock()
            .unwrap()
            .insert(zone_id.to_string(), records);
    }

    pub(crate) fn fail_mutations(&self, message: &str) {
        *self.mutation_error.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn panic_on_mutations(&self) {
        *self.panic_on_mutation.lock().unwrap() = true;
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.call_log.lock().unwrap().clone()
    }

    pub(crate) fn count_calls(&self, operation: &str) -> usize {
        self.calls().iter().filter(|(op, _)| op == operation).count()
    }

    pub(crate) fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear();
    }

    fn mutation_result(&self, operation: &str) -> Result<(), AwsApiError> {
        let should_panic = *self.panic_on_mutation.lock().unwrap();
        if should_panic {
            panic!("{} aborted", operation);
        }
        match self.mutation_error.lock().unwrap().as_deref() {
            Some(message) => Err(mock_error("Route53", operation, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DnsDataSource for MockDnsDataSource {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, AwsApiError> {
        log_call(&self.call_log, "list_hosted_zones", "");
        match self.zones.lock().unwrap().clone() {
            Some(Ok(zones)) => Ok(zones),
            Some(Err(message)) => Err(mock_error("Route53", "ListHostedZones", &message)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, AwsApiError> {
        log_call(&self.call_log, "list_records", zone_id);
        match self.records.lock().unwrap().get(zone_id).cloned() {
            Some(Ok(records)) => Ok(records),
            Some(Err(message)) => Err(mock_error("Route53", "ListResourceRecordSets", &message)),
            None => Ok(Vec::new()),
        }
    }

    async fn upsert_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), AwsApiError> {
        let key = format!(
            "{}|{}|{}|{:?}|{}",
            zone_id,
            record.name,
            record.record_type,
            record.ttl,
            record.values.join(",")
        );
        log_call(&self.call_log, "upsert_record", &key);
        self.mutation_result("ChangeResourceRecordSets")
    }

    async fn delete_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), AwsApiError> {
        log_call(
            &self.call_log,
            "delete_record",
            &format!("{}|{}|{}", zone_id, record.name, record.record_type),
        );
        self.mutation_result("ChangeResourceRecordSets")
    }
}

#[derive(Default)]
pub(crate) struct MockRegistryDataSource {
    repositories: Mutex<Option<Scripted<Repository>>>,
    images: Mutex<HashMap<String, Scripted<ContainerImage>>>,
    call_log: CallLog,
}

impl MockRegistryDataSource {
    pub(crate) fn set_repositories(&self, repositories: Scripted<Repository>) {
        *self.repositories.lock().unwrap() = Some(repositories);
    }

    pub(crate) fn set_images(&self, repository: &str, images: Scripted<ContainerImage>) {
        self.images
            .lock()
            .unwrap()
            .insert(repository.to_string(), images);
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.call_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryDataSource for MockRegistryDataSource {
    async fn list_repositories(&self) -> Result<Vec<Repository>, AwsApiError> {
        log_call(&self.call_log, "list_repositories", "");
        match self.repositories.lock().unwrap().clone() {
            Some(Ok(items)) => Ok(items),
            Some(Err(message)) => Err(mock_error("ECR", "DescribeRepositories", &message)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_images(&self, repository_name: &str) -> Result<Vec<ContainerImage>, AwsApiError> {
        log_call(&self.call_log, "list_images", repository_name);
        match self.images.lock().unwrap().get(repository_name).cloned() {
            Some(Ok(items)) => Ok(items),
            Some(Err(message)) => Err(mock_error("ECR", "DescribeImages", &message)),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockLoadBalancerDataSource {
    load_balancers: Mutex<Option<Scripted<LoadBalancer>>>,
    listeners: Mutex<HashMap<String, Scripted<Listener>>>,
    rules: Mutex<HashMap<String, Scripted<ListenerRule>>>,
    call_log: CallLog,
}

impl MockLoadBalancerDataSource {
    pub(crate) fn set_load_balancers(&self, items: Scripted<LoadBalancer>) {
        *self.load_balancers.lock().unwrap() = Some(items);
    }

    pub(crate) fn set_listeners(&self, load_balancer_arn: &str, items: Scripted<Listener>) {
        self.listeners
            .lock()
            .unwrap()
            .insert(load_balancer_arn.to_string(), items);
    }

    pub(crate) fn set_rules(&self, listener_arn: &str, items: Scripted<ListenerRule>) {
        self.rules
            .lock()
            .unwrap()
            .insert(listener_arn.to_string(), items);
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.call_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoadBalancerDataSource for MockLoadBalancerDataSource {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>, AwsApiError> {
        log_call(&self.call_log, "list_load_balancers", "");
        match self.load_balancers.lock().unwrap().clone() {
            Some(Ok(items)) => Ok(items),
            Some(Err(message)) => Err(mock_error("ELBv2", "DescribeLoadBalancers", &message)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_listeners(&self, load_balancer_arn: &str) -> Result<Vec<Listener>, AwsApiError> {
        log_call(&self.call_log, "list_listeners", load_balancer_arn);
        match self.listeners.lock().unwrap().get(load_balancer_arn).cloned() {
            Some(Ok(items)) => Ok(items),
            Some(Err(message)) => Err(mock_error("ELBv2", "DescribeListeners", &message)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_rules(&self, listener_arn: &str) -> Result<Vec<ListenerRule>, AwsApiError> {
        log_call(&self.call_log, "list_rules", listener_arn);
        match self.rules.lock().unwrap().get(listener_arn).cloned() {
            Some(Ok(items)) => Ok(items),
            Some(Err(message)) => Err(mock_error("ELBv2", "DescribeRules", &message)),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
pub(crate) struct MemoryViewStateStore {
    last: Mutex<Option<String>>,
    saves: Mutex<Vec<String>>,
}

impl MemoryViewStateStore {
    pub(crate) fn with_last(name: &str) -> Self {
        Self {
            last: Mutex::new(Some(name.to_string())),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn saves(&self) -> Vec<String> {
        self.saves.lock().unwrap().clone()
    }
}

impl ViewStateStore for MemoryViewStateStore {
    fn load_last_active_view(&self) -> Option<String> {
        self.last.lock().unwrap().clone()
    }

    fn save_last_active_view(&self, name: &str) {
        *self.last.lock().unwrap() = Some(name.to_string());
        self.saves.lock().unwrap().push(name.to_string());
    }
}

/// An `AppContext` wired to mocks, with handles kept for assertions.
pub(crate) struct TestContext {
    pub ctx: AppContext,
    pub dns: Arc<MockDnsDataSource>,
    pub registry: Arc<MockRegistryDataSource>,
    pub load_balancers: Arc<MockLoadBalancerDataSource>,
    pub view_state: Arc<MemoryViewStateStore>,
}

pub(crate) fn context() -> TestContext {
    context_with(MockClipboardPort::new(), MemoryViewStateStore::default())
}

pub(crate) fn context_with(
    clipboard: MockClipboardPort,
    view_state: MemoryViewStateStore,
) -> TestContext {
    let dns = Arc::new(MockDnsDataSource::default());
    let registry = Arc::new(MockRegistryDataSource::default());
    let load_balancers = Arc::new(MockLoadBalancerDataSource::default());
    let view_state = Arc::new(view_state);
    let ctx = AppContext {
        aws: AwsSettings::default(),
        dns: dns.clone(),
        registry: registry.clone(),
        load_balancers: load_balancers.clone(),
        view_state: view_state.clone(),
        clipboard: Arc::new(clipboard),
    };
    TestContext {
        ctx,
        dns,
        registry,
        load_balancers,
        view_state,
    }
}

/// Drives background tasks until the view has nothing in flight.
pub(crate) async fn pump(view: &mut dyn ResourceView, status: &mut StatusLine) {
    for _ in 0..400 {
        view.poll_tasks(status);
        if !view.has_pending_tasks() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("background tasks of '{}' did not settle", view.name());
}

pub(crate) fn zone(id: &str, name: &str) -> HostedZone {
    HostedZone {
        id: id.to_string(),
        name: name.to_string(),
        record_count: 2,
        private_zone: false,
    }
}

pub(crate) fn a_record(name: &str, value: &str) -> DnsRecord {
    DnsRecord {
        name: name.to_string(),
        record_type: "A".to_string(),
        ttl: Some(60),
        values: vec![value.to_string()],
        alias: None,
        routing: RoutingPolicy::default(),
    }
}
