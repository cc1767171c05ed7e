use std::time::{Duration, Instant};
use tracing::{info, warn};

pub(crate) const DEFAULT_STATUS: &str = "Ready";
const MESSAGE_TTL: Duration = Duration::from_secs(8);

/// Transient status and error text shown under the active view. Every setter
/// overwrites the previous message; both expire on their own.
#[derive(Debug)]
pub(crate) struct StatusLine {
    status: String,
    status_set_at: Option<Instant>,
    error: Option<String>,
    error_set_at: Option<Instant>,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS.to_string(),
            status_set_at: None,
            error: None,
            error_set_at: None,
        }
    }
}

impl StatusLine {
    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "hibiscus::status", "{}", message);
        self.status = message;
        self.status_set_at = Some(Instant::now());
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "hibiscus::status", "{}", message);
        self.error = Some(message);
        self.error_set_at = Some(Instant::now());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
        self.error_set_at = None;
    }

    pub(crate) fn status(&self) -> &str {
        &self.status
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn expire(&mut self, now: Instant) {
        if self
            .status_set_at
            .is_some_and(|at| now.duration_since(at) >= MESSAGE_TTL)
        {
            self.status = DEFAULT_STATUS.to_string();
            self.status_set_at = None;
        }
        if self
            .error_set_at
            .is_some_and(|at| now.duration_since(at) >= MESSAGE_TTL)
        {
            self.clear_error();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_overwrite() {
        let mut status = StatusLine::default();
        assert_eq!(status.status(), "Ready");

        status.set_status("Fetching hosted zones...");
        status.set_status("Loaded 3 hosted zones");
        assert_eq!(status.status(), "Loaded 3 hosted zones");

        status.set_error("list records: boom");
        assert_eq!(status.error(), Some("list records: boom"));
        status.clear_error();
        assert_eq!(status.error(), None);
    }

    #[test]
    fn test_messages_expire() {
        let mut status = StatusLine::default();
        status.set_status("Loaded 3 hosted zones");
        status.set_error("boom");

        status.expire(Instant::now());
        assert_eq!(status.status(), "Loaded 3 hosted zones");

        status.expire(Instant::now() + MESSAGE_TTL + Duration::from_millis(1));
        assert_eq!(status.status(), DEFAULT_STATUS);
        assert_eq!(status.error(), None);
    }
}
