use crate::caller::CallSite;
use crate::config::{ConfigSource, EnvConfig, SERVER_NAME_KEY};
use crate::context::RequestContext;
use crate::entry::Entry;
use crate::level::{level_name, parse_level};
use crate::metadata::{BuildMetadata, MetadataProvider, MetadataSource};
use crate::record::{prefix_reserved, LogRecord};
use crate::sink::LogSink;
use crate::stack::{self, STACKTRACE_FIELD};
use crate::writer_sink::WriterSink;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Structured logger that enriches every entry with service, caller,
/// build and request metadata.
///
/// A `Logger` is immutable once built and can be shared freely between
/// threads (`Arc<Logger>` or `&'static Logger`). Reconfiguring means
/// building a new one.
pub struct Logger {
    sink: Arc<dyn LogSink>,
    config: Arc<dyn ConfigSource>,
    metadata: MetadataSource,
    max_level: LevelFilter,
    stack_on_error: bool,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    /// Whether every error-level entry gets a stack attached.
    pub fn stack_on_error(&self) -> bool {
        self.stack_on_error
    }

    /// Current `server.name`; empty if unset. Read on every call.
    pub fn server_name(&self) -> String {
        self.config.get_string(SERVER_NAME_KEY).unwrap_or_default()
    }

    /// Start an entry carrying the base fields for `site` and `ctx`.
    ///
    /// Usually called through [`log_entry!`](crate::log_entry), which
    /// fills in `site`.
    pub fn log(&self, ctx: Option<&RequestContext>, site: CallSite) -> Entry<'_> {
        Entry::new(self, self.base_fields(ctx, site))
    }

    /// Log `err` at error level with the current stack attached.
    ///
    /// Without `args` the error text becomes the message. Otherwise the
    /// error goes under `error` and the args, concatenated, become the
    /// message.
    pub fn error_with_stack(
        &self,
        ctx: Option<&RequestContext>,
        site: CallSite,
        err: &dyn fmt::Display,
        args: &[&dyn fmt::Display],
    ) {
        if !self.enabled(Level::ERROR) {
            return;
        }
        let entry = self
            .log(ctx, site)
            .with_field(STACKTRACE_FIELD, stack::capture());
        if args.is_empty() {
            entry.error(err);
        } else {
            let message: String = args.iter().map(|a| a.to_string()).collect();
            entry.with_error(err).error(message);
        }
    }

    /// Formatted variant of [`Logger::error_with_stack`]; the error always
    /// goes under `error`.
    pub fn errorf_with_stack(
        &self,
        ctx: Option<&RequestContext>,
        site: CallSite,
        err: &dyn fmt::Display,
        args: fmt::Arguments<'_>,
    ) {
        if !self.enabled(Level::ERROR) {
            return;
        }
        self.log(ctx, site)
            .with_field(STACKTRACE_FIELD, stack::capture())
            .with_error(err)
            .logf(Level::ERROR, args);
    }

    /// Flush the sink, reporting failures on stderr.
    pub fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            eprintln!("error flushing log sink: {}", e);
        }
    }

    fn base_fields(&self, ctx: Option<&RequestContext>, site: CallSite) -> BTreeMap<String, Value> {
        let mut fields = BTreeMap::new();
        fields.insert("server".to_string(), Value::from(self.server_name()));
        fields.insert("file".to_string(), Value::from(site.file));
        fields.insert("func".to_string(), Value::from(site.func));

        if let Some(ctx) = ctx {
            for (name, value) in ctx.fields() {
                fields.insert(name.to_string(), Value::from(value));
            }
        }

        let meta = self.metadata.current();
        for (name, value) in meta.fields() {
            fields.insert(name.to_string(), Value::from(value));
        }

        fields
    }

    pub(crate) fn emit(
        &self,
        level: Level,
        message: String,
        error: Option<String>,
        mut fields: BTreeMap<String, Value>,
    ) {
        if level == Level::ERROR && self.stack_on_error && !fields.contains_key(STACKTRACE_FIELD) {
            fields.insert(STACKTRACE_FIELD.to_string(), Value::from(stack::capture()));
        }
        prefix_reserved(&mut fields);

        let record = LogRecord {
            timestamp: Utc::now(),
            level: level_name(level).to_string(),
            message,
            error,
            fields,
        };

        if let Err(e) = self.sink.write(&record) {
            eprintln!("error writing log record: {}", e);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("max_level", &self.max_level)
            .field("stack_on_error", &self.stack_on_error)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Logger`].
///
/// **Defaults**
/// - sink: JSON lines on stdout
/// - config: [`EnvConfig`] (`server.name` from `SERVER_NAME`)
/// - metadata: the process-wide [`BuildMetadata::global`] snapshot
/// - level: `INFO`
/// - `stack_on_error`: off
pub struct LoggerBuilder {
    sink: Option<Arc<dyn LogSink>>,
    config: Option<Arc<dyn ConfigSource>>,
    metadata: Option<MetadataSource>,
    max_level: LevelFilter,
    stack_on_error: bool,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        LoggerBuilder {
            sink: None,
            config: None,
            metadata: None,
            max_level: LevelFilter::INFO,
            stack_on_error: false,
        }
    }
}

impl LoggerBuilder {
    /// Minimum level by name; see [`parse_level`].
    pub fn level(mut self, name: &str) -> Self {
        self.max_level = parse_level(name);
        self
    }

    pub fn max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = level;
        self
    }

    /// Write JSON lines to `out`.
    pub fn output<W>(self, out: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.sink(Arc::new(WriterSink::new(out)))
    }

    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a fixed metadata snapshot instead of the process environment.
    pub fn metadata(mut self, metadata: BuildMetadata) -> Self {
        self.metadata = Some(MetadataSource::Snapshot(Arc::new(metadata)));
        self
    }

    /// Query `provider` on every call. Deprecated in favour of a snapshot.
    pub fn metadata_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(MetadataSource::Live(provider));
        self
    }

    pub fn stack_on_error(mut self, enabled: bool) -> Self {
        self.stack_on_error = enabled;
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            sink: self.sink.unwrap_or_else(|| Arc::new(WriterSink::stdout())),
            config: self.config.unwrap_or_else(|| Arc::new(EnvConfig::new())),
            metadata: self.metadata.unwrap_or_default(),
            max_level: self.max_level,
            stack_on_error: self.stack_on_error,
        }
    }
}

/// Start an entry for the calling function.
///
/// ```
/// use enriched_log::{log_entry, Logger, NoopSink, RequestContext};
/// use std::sync::Arc;
///
/// let logger = Logger::builder().sink(Arc::new(NoopSink)).build();
/// let ctx = RequestContext::new().with_trace_id("abc123");
/// log_entry!(logger, Some(&ctx)).with_field("order", 42).info("order created");
/// ```
#[macro_export]
macro_rules! log_entry {
    ($logger:expr, $ctx:expr) => {
        $logger.log($ctx, $crate::call_site!())
    };
}

/// Log an error with the stack attached; extra args are concatenated
/// into the message.
#[macro_export]
macro_rules! error_with_stack {
    ($logger:expr, $ctx:expr, $err:expr) => {
        $logger.error_with_stack($ctx, $crate::call_site!(), &$err, &[])
    };
    ($logger:expr, $ctx:expr, $err:expr, $($arg:expr),+ $(,)?) => {
        $logger.error_with_stack(
            $ctx,
            $crate::call_site!(),
            &$err,
            &[$(&$arg as &dyn ::std::fmt::Display),+],
        )
    };
}

/// Log an error with the stack attached and a formatted message.
#[macro_export]
macro_rules! errorf_with_stack {
    ($logger:expr, $ctx:expr, $err:expr, $($fmt:tt)+) => {
        $logger.errorf_with_stack($ctx, $crate::call_site!(), &$err, format_args!($($fmt)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use crate::memory_sink::MemorySink;
    use crate::metadata::MetadataError;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const OPTIONAL: [&str; 9] = [
        "trace",
        "ip",
        "merchantId",
        "operator",
        "image",
        "git_commit",
        "git_branch",
        "build_time",
        "instance",
    ];

    fn logger_with(sink: &Arc<MemorySink>) -> LoggerBuilder {
        Logger::builder()
            .sink(sink.clone())
            .config(Arc::new(StaticConfig::new().with(SERVER_NAME_KEY, "orders")))
            .metadata(BuildMetadata::default())
    }

    #[test]
    fn always_present_fields_without_context() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).build();

        crate::log_entry!(logger, None).info("hello");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.field_str("server"), Some("orders"));
        assert_eq!(record.field_str("func"), Some("always_present_fields_without_context"));
        assert!(record.field_str("file").unwrap().starts_with("logger.rs:"));
        assert_eq!(record.level, "info");
        assert_eq!(record.message, "hello");
        for key in OPTIONAL.iter().chain([&STACKTRACE_FIELD]) {
            assert!(!record.fields.contains_key(*key), "{key}");
        }
    }

    #[test]
    fn trace_only_context_adds_trace_field() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).build();
        let ctx = RequestContext::new().with_trace_id("abc123").with_client_ip("");

        logger.log(Some(&ctx), CallSite::unknown()).warn("slow");

        let record = &sink.records()[0];
        assert_eq!(record.field_str("trace"), Some("abc123"));
        assert_eq!(record.level, "warning");
        for key in ["ip", "merchantId", "operator"] {
            assert!(!record.fields.contains_key(key), "{key}");
        }
    }

    #[test]
    fn build_metadata_is_attached_when_present() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink)
            .metadata(BuildMetadata {
                image: "product-api:v1.2.3".into(),
                git_commit: "a1b2c3d".into(),
                ..BuildMetadata::default()
            })
            .build();

        logger.log(None, CallSite::unknown()).info("x");

        let record = &sink.records()[0];
        assert_eq!(record.field_str("image"), Some("product-api:v1.2.3"));
        assert_eq!(record.field_str("git_commit"), Some("a1b2c3d"));
        assert!(!record.fields.contains_key("git_branch"));
        assert!(!record.fields.contains_key("instance"));
    }

    #[test]
    fn server_name_is_read_per_call() {
        let sink = Arc::new(MemorySink::new());
        let config = Arc::new(StaticConfig::new().with(SERVER_NAME_KEY, "a"));
        let logger = Logger::builder()
            .sink(sink.clone())
            .config(config.clone())
            .metadata(BuildMetadata::default())
            .build();

        logger.log(None, CallSite::unknown()).info("1");
        config.set(SERVER_NAME_KEY, "b");
        logger.log(None, CallSite::unknown()).info("2");

        let servers: Vec<_> = sink
            .records()
            .iter()
            .map(|r| r.field_str("server").unwrap().to_string())
            .collect();
        assert_eq!(servers, vec!["a", "b"]);
    }

    #[test]
    fn entries_below_min_level_are_dropped() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).level("warn").build();

        logger.log(None, CallSite::unknown()).debug("d");
        logger.log(None, CallSite::unknown()).info("i");
        logger.log(None, CallSite::unknown()).warn("w");
        logger.log(None, CallSite::unknown()).error("e");

        let msgs: Vec<_> = sink.records().into_iter().map(|r| r.message).collect();
        assert_eq!(msgs, vec!["w", "e"]);
    }

    #[test]
    fn error_with_stack_uses_error_as_message_without_args() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).build();
        let err = io::Error::new(io::ErrorKind::NotFound, "order missing");

        crate::error_with_stack!(logger, None, err);

        let record = &sink.records()[0];
        assert_eq!(record.level, "error");
        assert_eq!(record.message, "order missing");
        assert_eq!(record.error, None);
        assert!(!record.field_str(STACKTRACE_FIELD).unwrap().is_empty());
        assert_eq!(
            record.field_str("func"),
            Some("error_with_stack_uses_error_as_message_without_args")
        );
    }

    #[test]
    fn error_with_stack_concatenates_args() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).build();
        let err = io::Error::new(io::ErrorKind::Other, "timeout");

        crate::error_with_stack!(logger, None, err, "charge failed for ", 42);

        let record = &sink.records()[0];
        assert_eq!(record.message, "charge failed for 42");
        assert_eq!(record.error.as_deref(), Some("timeout"));
        assert!(record.fields.contains_key(STACKTRACE_FIELD));
    }

    #[test]
    fn errorf_with_stack_formats_message() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).build();
        let ctx = RequestContext::new().with_operator_id("op-1");
        let err = io::Error::new(io::ErrorKind::Other, "refused");

        crate::errorf_with_stack!(logger, Some(&ctx), err, "refund {} of {}", 3, "EUR");

        let record = &sink.records()[0];
        assert_eq!(record.message, "refund 3 of EUR");
        assert_eq!(record.error.as_deref(), Some("refused"));
        assert_eq!(record.field_str("operator"), Some("op-1"));
        assert!(!record.field_str(STACKTRACE_FIELD).unwrap().is_empty());
    }

    #[test]
    fn plain_error_has_no_stack_unless_policy_enabled() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).build();
        logger.log(None, CallSite::unknown()).error("plain");
        assert!(!sink.records()[0].fields.contains_key(STACKTRACE_FIELD));

        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).stack_on_error(true).build();
        logger.log(None, CallSite::unknown()).warn("not an error");
        logger.log(None, CallSite::unknown()).error("hooked");
        let records = sink.records();
        assert!(!records[0].fields.contains_key(STACKTRACE_FIELD));
        assert!(records[1].fields.contains_key(STACKTRACE_FIELD));
    }

    #[test]
    fn user_fields_cannot_shadow_record_keys() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(&sink).build();
        logger
            .log(None, CallSite::unknown())
            .with_field("level", "fake")
            .info("real");

        let record = &sink.records()[0];
        assert_eq!(record.level, "info");
        assert_eq!(record.field_str("fields.level"), Some("fake"));
    }

    struct CountingProvider(AtomicUsize);

    impl MetadataProvider for CountingProvider {
        fn fetch(&self) -> Result<BuildMetadata, MetadataError> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(BuildMetadata {
                instance: "container-1".into(),
                ..BuildMetadata::default()
            })
        }
    }

    #[test]
    fn live_provider_is_queried_per_call() {
        let sink = Arc::new(MemorySink::new());
        let provider = Arc::new(CountingProvider(AtomicUsize::new(0)));
        let logger = logger_with(&sink).metadata_provider(provider.clone()).build();

        logger.log(None, CallSite::unknown()).info("1");
        logger.log(None, CallSite::unknown()).info("2");

        assert_eq!(provider.0.load(Ordering::Relaxed), 2);
        assert_eq!(sink.records()[1].field_str("instance"), Some("container-1"));
    }
}
