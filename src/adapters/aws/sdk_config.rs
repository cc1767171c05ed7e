use crate::config::models::AwsSettings;
use aws_config::{BehaviorVersion, Region};
use chrono::{DateTime, Utc};
use tracing::info;

/// Loads the shared SDK configuration once; every service client is built from it.
pub(crate) async fn load_sdk_config(settings: &AwsSettings) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile_name) = settings.profile.as_deref() {
        loader = loader.profile_name(profile_name);
    }
    if let Some(region) = settings.region.as_deref() {
        loader = loader.region(Region::new(region.to_string()));
    }
    let sdk_config = loader.load().await;
    info!(
        "AWS SDK config loaded (profile: {}, region: {})",
        settings.profile.as_deref().unwrap_or("<default>"),
        sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| "<unset>".to_string())
    );
    sdk_config
}

pub(crate) fn to_chrono(value: &aws_sdk_ecr::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}
