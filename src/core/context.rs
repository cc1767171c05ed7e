use crate::config::models::AwsSettings;
use crate::ports::{
    ClipboardPort, DnsDataSource, LoadBalancerDataSource, RegistryDataSource, ViewStateStore,
};
use std::sync::Arc;

/// Everything a view or the shell needs from the outside world, handed over
/// explicitly at construction time.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub aws: AwsSettings,
    pub dns: Arc<dyn DnsDataSource>,
    pub registry: Arc<dyn RegistryDataSource>,
    pub load_balancers: Arc<dyn LoadBalancerDataSource>,
    pub view_state: Arc<dyn ViewStateStore>,
    pub clipboard: Arc<dyn ClipboardPort>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("aws", &self.aws)
            .finish_non_exhaustive()
    }
}
