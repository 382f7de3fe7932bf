//! Bridge from `tracing` events to a [`Handler`]
//!
//! Lets code that logs through `tracing` macros reach the same console and
//! file destinations as code using [`Logger`](crate::Logger).

use crate::handler::{Handler, SharedHandler};
use crate::{Attr, Level, Record, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record as SpanRecord};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

/// Target prefix of this crate's own diagnostics
const OWN_TARGET: &str = "mlogger";

/// `tracing_subscriber` layer that hands events to a handler
///
/// Span fields are attached to every event inside the span, outermost span
/// first. Events emitted by this crate are not forwarded, because they may
/// be raised while a handler is holding its writer.
pub struct HandlerLayer {
    handler: SharedHandler,
}

impl HandlerLayer {
    pub fn new(handler: SharedHandler) -> Self {
        Self { handler }
    }
}

/// Fields recorded on a span, kept in its extensions
struct SpanAttrs(Vec<Attr>);

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    attrs: Vec<Attr>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.attrs.push(Attr::new(field.name(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::I64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::U64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, Value::String(format!("{:?}", value)));
    }
}

fn is_own(metadata: &Metadata<'_>) -> bool {
    let target = metadata.target();
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<S> Layer<S> for HandlerLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        metadata.is_span() || self.handler.enabled(Level::from(metadata.level()))
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        if let Some(message) = visitor.message {
            visitor.attrs.insert(0, Attr::new("message", message));
        }
        span.extensions_mut().insert(SpanAttrs(visitor.attrs));
    }

    fn on_record(&self, id: &Id, values: &SpanRecord<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);
        let mut extensions = span.extensions_mut();
        if let Some(SpanAttrs(attrs)) = extensions.get_mut::<SpanAttrs>() {
            attrs.extend(visitor.attrs);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own(metadata) {
            return;
        }
        let level = Level::from(metadata.level());
        if !self.handler.enabled(level) {
            return;
        }

        let mut attrs = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanAttrs(span_attrs)) = span.extensions().get::<SpanAttrs>() {
                    attrs.extend(span_attrs.iter().cloned());
                }
            }
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        attrs.extend(visitor.attrs);

        let record = Record::new(level, visitor.message.unwrap_or_default()).with_attrs(attrs);
        if let Err(e) = self.handler.handle(&record) {
            eprintln!("mlogger: {}", e);
        }
    }
}

/// Route `tracing` events to `handler` through the global subscriber.
///
/// `RUST_LOG` narrows what reaches the handler when it is set. Fails if a
/// global subscriber is already installed.
pub fn install_tracing_bridge(handler: SharedHandler) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().ok();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(HandlerLayer::new(handler))
        .try_init()
}
