//! JSON-lines formatting layer.
//!
//! Each event becomes one object:
//! `{"ts","level","service","pid","target","msg",<fields...>,"span"?}`.
//! Event fields are flattened into the top level so `jq '.endpoint'` works.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// One serialized log line.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub ts: String,
    pub level: &'static str,
    pub service: String,
    pub pid: u32,
    pub target: String,
    pub msg: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

/// Fields that would collide with the fixed keys get an `f_` prefix.
const RESERVED: [&str; 7] = ["ts", "level", "service", "pid", "target", "msg", "span"];

#[derive(Default)]
struct Collector {
    msg: Option<String>,
    fields: Map<String, Value>,
}

impl Collector {
    fn put(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.msg = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else if RESERVED.contains(&name) {
            self.fields.insert(format!("f_{name}"), value);
        } else {
            self.fields.insert(name.to_string(), value);
        }
    }
}

impl Visit for Collector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::String(value.to_owned()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.put(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::String(value.to_string()));
    }
}

/// Layer writing [`LogLine`]s through a [`MakeWriter`].
pub struct JsonLayer<W> {
    service: String,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service: impl Into<String>, make_writer: W) -> Self {
        Self {
            service: service.into(),
            pid: std::process::id(),
            make_writer,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut collector = Collector::default();
        event.record(&mut collector);
        let metadata = event.metadata();

        let line = LogLine {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level: metadata.level().as_str(),
            service: self.service.clone(),
            pid: self.pid,
            target: metadata.target().to_string(),
            msg: collector.msg.unwrap_or_default(),
            fields: collector.fields,
            span: ctx.event_span(event).map(|span| span.name().to_string()),
        };

        if let Ok(mut json) = serde_json::to_string(&line) {
            json.push('\n');
            let _ = self.make_writer.make_writer().write_all(json.as_bytes());
        }
    }
}
