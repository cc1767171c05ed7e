use crate::core::types::MessageLevel;
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber, field::Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

pub(crate) type LogSender = mpsc::Sender<(String, MessageLevel)>;

#[derive(Default)]
struct FieldExtractor {
    fields: BTreeMap<String, String>,
    message: Option<String>,
}

impl Visit for FieldExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }
}

/// Routes tracing events into the in-app log buffer instead of the terminal,
/// which the UI owns while it runs.
pub struct TuiLoggingLayer {
    log_tx: LogSender,
}

impl TuiLoggingLayer {
    pub fn new(log_tx: LogSender) -> Self {
        Self { log_tx }
    }
}

fn to_message_level(level: &Level) -> MessageLevel {
    match *level {
        Level::ERROR => MessageLevel::Error,
        Level::WARN => MessageLevel::Warning,
        Level::INFO => MessageLevel::Info,
        Level::DEBUG => MessageLevel::Debug,
        Level::TRACE => MessageLevel::Trace,
    }
}

impl<S> Layer<S> for TuiLoggingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = if !metadata.target().is_empty() {
            metadata.target()
        } else {
            metadata.module_path().unwrap_or("<unknown>")
        };

        let mut extractor = FieldExtractor::default();
        event.record(&mut extractor);

        let mut extra_fields_str = String::new();
        for (name, value) in extractor.fields.iter() {
            if !extra_fields_str.is_empty() {
                extra_fields_str.push_str(", ");
            }
            write!(extra_fields_str, "{}={}", name, value).ok();
        }

        let mut final_message = format!(
            "[{}] {}",
            target,
            extractor.message.as_deref().unwrap_or("")
        );
        if !extra_fields_str.is_empty() {
            write!(final_message, " {{{}}}", extra_fields_str).ok();
        }
        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                write!(final_message, " [{}]", spans.join(" > ")).ok();
            }
        }

        // A full buffer drops the line; blocking here would stall the UI loop.
        let _ = self
            .log_tx
            .try_send((final_message.trim().to_string(), to_message_level(metadata.level())));
    }
}
