use crate::caller::CallSite;
use crate::context;
use crate::logger::Logger;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns ordinary `tracing` events into
/// enriched entries written through a [`Logger`].
///
/// Event fields become entry fields and `message` becomes the entry
/// message. File and line come from the event's metadata; the function
/// name is the innermost span's name, which matches the function when
/// spans come from `#[tracing::instrument]`. Request fields are taken
/// from the ambient [`context::current`].
pub struct EnrichLayer {
    logger: Arc<Logger>,
}

impl EnrichLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        EnrichLayer { logger }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

impl<S> Layer<S> for EnrichLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = *meta.level();
        if !self.logger.enabled(level) {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let func = ctx
            .event_span(event)
            .map(|span| span.name())
            .unwrap_or("");
        let site = CallSite::new(meta.file().unwrap_or(""), meta.line().unwrap_or(0), func);
        let request = context::current();

        self.logger
            .log(request.as_ref(), site)
            .with_fields(fields)
            .log(level, message.unwrap_or_default());
    }
}

/// Collects event fields into JSON values.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields
            .insert(field.name().to_string(), Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}
