use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::{format::Writer, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Span fields rendered in dedicated columns of the pretty format
const JOB_ID_FIELD: &str = "job_id";
const JOB_TYPE_FIELD: &str = "job_type";

/// Fields recorded on a span, kept in the span's extensions
#[derive(Debug, Clone, Default)]
pub struct SpanFields {
    pub raw_fields: HashMap<String, String>,
}

#[derive(Default)]
struct SpanFieldCollector {
    fields: SpanFields,
}

impl SpanFieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        self.fields.raw_fields.insert(field.name().to_string(), value);
    }
}

impl Visit for SpanFieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{:?}", value).trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }
}

/// Stores span fields so the formatters can attach them to every event of the span
pub struct FieldCollectorLayer;

impl<S> Layer<S> for FieldCollectorLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut collector = SpanFieldCollector::default();
        attrs.record(&mut collector);
        span.extensions_mut().insert(collector.fields);
    }

    fn on_record(&self, id: &tracing::span::Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        let fields = extensions.remove::<SpanFields>().unwrap_or_default();

        let mut collector = SpanFieldCollector { fields };
        values.record(&mut collector);
        extensions.insert(collector.fields);
    }
}

/// Column layout for console readability
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let now = Utc::now().format("%y-%m-%d %H:%M:%S").to_string();

        let ts_color = "\x1b[96m";
        let level_color = match *meta.level() {
            Level::TRACE => "\x1b[90m",
            Level::DEBUG => "\x1b[34m",
            Level::INFO => "\x1b[32m",
            Level::WARN => "\x1b[33m",
            Level::ERROR => "\x1b[31m",
        };
        let msg_color = "\x1b[97m";
        let column_color = "\x1b[92m";
        let dim_color = "\x1b[90m";
        let reset = "\x1b[0m";

        let (job_type, job_id) = current_job(ctx);

        let mut visitor = FieldExtractor::default();
        event.record(&mut visitor);

        // Timestamp | Level | Job type | Job id | Component | Message (fields)
        write!(writer, "{}{}{} ", ts_color, now, reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;
        write!(writer, "{}{:<5}{} ", level_color, *meta.level(), reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;
        write!(writer, "{}{:<15}{} ", column_color, job_type, reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;
        write!(writer, "{}{:<8}{} ", column_color, job_id, reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;
        write!(writer, "{}{:<8}{} ", column_color, component_name(meta.target()), reset)?;
        write!(writer, "{}|{} ", dim_color, reset)?;

        write!(writer, "{}{}{}", msg_color, visitor.message, reset)?;
        if !visitor.fields.is_empty() {
            write!(writer, " ({}{}{})", msg_color, visitor.fields, reset)?;
        }

        writeln!(writer)
    }
}

/// Job type and the short form of the job id of the innermost job span
fn current_job<S, N>(ctx: &FmtContext<'_, S, N>) -> (String, String)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let mut job = (String::from("-"), String::from("-"));
    if let Some(span) = ctx.lookup_current() {
        for span in span.scope() {
            if let Some(fields) = span.extensions().get::<SpanFields>() {
                if let Some(job_type) = fields.raw_fields.get(JOB_TYPE_FIELD) {
                    job.0 = job_type.clone();
                }
                if let Some(job_id) = fields.raw_fields.get(JOB_ID_FIELD) {
                    job.1 = job_id.chars().take(8).collect();
                }
            }
            if job.0 != "-" {
                break;
            }
        }
    }
    job
}

#[derive(Default)]
struct FieldExtractor {
    message: String,
    fields: String,
}

impl Visit for FieldExtractor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let field_color = "\x1b[90m";
        let reset = "\x1b[0m";

        let formatted_value = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = formatted_value;
        } else {
            if !self.fields.is_empty() {
                self.fields.push_str(", ");
            }
            self.fields.push_str(&format!("{}{}={}{}", field_color, field.name(), formatted_value, reset));
        }
    }
}

/// One JSON object per line, span fields merged under `fields`
pub struct JsonEventFormatter;

#[derive(Default)]
struct JsonFieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl Visit for JsonFieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value = format!("{:?}", value).trim_matches('"').to_string();
        self.record_str(field, &value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();

        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let mut root = Map::new();
        root.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );
        root.insert("level".to_string(), Value::String(meta.level().to_string()));
        root.insert("target".to_string(), Value::String(meta.target().to_string()));
        root.insert("component".to_string(), Value::String(component_name(meta.target()).to_string()));
        if let Some(file) = meta.file() {
            root.insert("filename".to_string(), Value::String(file.to_string()));
        }
        if let Some(line) = meta.line() {
            root.insert("line_number".to_string(), Value::from(line));
        }
        if let Some(message) = visitor.message.take() {
            root.insert("message".to_string(), Value::String(message));
        }

        let mut fields = visitor.fields;
        if let Some(span) = ctx.lookup_current() {
            fields.insert("span_name".to_string(), Value::String(span.metadata().name().to_string()));
            for span in span.scope() {
                if let Some(span_fields) = span.extensions().get::<SpanFields>() {
                    for (key, value) in &span_fields.raw_fields {
                        fields.entry(key.clone()).or_insert_with(|| Value::String(value.clone()));
                    }
                }
            }
        }
        if !fields.is_empty() {
            root.insert("fields".to_string(), Value::Object(fields));
        }

        let line = serde_json::to_string(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Initialize the tracing subscriber with
/// - PrettyFormatter for console readability (when LOG_FORMAT != "json")
/// - JsonEventFormatter for json logging (when LOG_FORMAT = "json")
///
/// This will also install color_eyre to handle the panic in the application
pub fn init_logging() {
    color_eyre::install().expect("Unable to install color_eyre");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .parse("relayer=info")
            .expect("Invalid filter directive and Logger control")
    });

    let json = std::env::var("LOG_FORMAT").map(|format| format == "json").unwrap_or(false);
    let fmt_layer = fmt::layer().with_target(true).with_thread_ids(false).with_file(true).with_line_number(true);

    if json {
        let subscriber = Registry::default()
            .with(env_filter)
            .with(FieldCollectorLayer)
            .with(fmt_layer.event_format(JsonEventFormatter))
            .with(ErrorLayer::default());
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set global default subscriber");
    } else {
        let subscriber = Registry::default()
            .with(env_filter)
            .with(FieldCollectorLayer)
            .with(fmt_layer.event_format(PrettyFormatter))
            .with(ErrorLayer::default());
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set global default subscriber");
    }
}

/// Short name of the relayer component an event comes from
fn component_name(target: &str) -> &'static str {
    let Some(path) = target.strip_prefix("relayer") else {
        return "EXTERNAL";
    };
    let module = path.trim_start_matches("::").split("::").next().unwrap_or_default();
    match module {
        "worker" => "WORKER",
        "server" => "SERVER",
        "fee" => "FEE",
        "core" => "CLIENT",
        "config" => "CONFIG",
        _ => "-",
    }
}
