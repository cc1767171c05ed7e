use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write configuration file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to deserialize configuration from {path}: {source}")]
    Deserialize {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Failed to serialize configuration: {0}")]
    Serialize(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum AwsApiError {
    #[error("{service} {operation} failed: {source}")]
    ApiCall {
        service: String,
        operation: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AwsApiError {
    pub(crate) fn api_call<E>(service: &str, operation: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AwsApiError::ApiCall {
            service: service.to_string(),
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }
}

/// Rejections produced by the record edit form. These stay inside the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record type is required")]
    MissingType,
    #[error("at least one record value is required")]
    NoValues,
    #[error("ttl is required")]
    MissingTtl,
    #[error("ttl must be a positive number")]
    InvalidTtl(String),
}

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("at least one service must be registered")]
    NoViews,
    #[error("service '{0}' is registered more than once")]
    DuplicateView(String),
}
