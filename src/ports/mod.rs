use crate::config::models::AppConfig;
use crate::core::error::{AwsApiError, ClipboardError, ConfigError};
use crate::core::types::{
    ContainerImage, DnsRecord, HostedZone, Listener, ListenerRule, LoadBalancer, Repository,
};
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub(crate) trait DnsDataSource: Send + Sync {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, AwsApiError>;
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, AwsApiError>;
    async fn upsert_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), AwsApiError>;
    async fn delete_record(&self, zone_id: &str, record: &DnsRecord) -> Result<(), AwsApiError>;
}

#[async_trait]
pub(crate) trait RegistryDataSource: Send + Sync {
    async fn list_repositories(&self) -> Result<Vec<Repository>, AwsApiError>;
    async fn list_images(&self, repository_name: &str)
    -> Result<Vec<ContainerImage>, AwsApiError>;
}

#[async_trait]
pub(crate) trait LoadBalancerDataSource: Send + Sync {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>, AwsApiError>;
    async fn list_listeners(&self, load_balancer_arn: &str)
    -> Result<Vec<Listener>, AwsApiError>;
    async fn list_rules(&self, listener_arn: &str) -> Result<Vec<ListenerRule>, AwsApiError>;
}

pub(crate) trait ConfigurationStore: Send + Sync {
    fn load_app_config_file(&self, path: &Path) -> Result<AppConfig, ConfigError>;
    fn save_app_config_file(&self, config: &AppConfig, path: &Path) -> Result<(), ConfigError>;
}

/// Remembers which view was on screen last. Best effort: failures are logged
/// by the implementation and never reach the user.
pub(crate) trait ViewStateStore: Send + Sync {
    fn load_last_active_view(&self) -> Option<String>;
    fn save_last_active_view(&self, name: &str);
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait ClipboardPort: Send + Sync {
    fn copy_text(&self, text: &str) -> Result<(), ClipboardError>;
}
