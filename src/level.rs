use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Parse a minimum severity name.
///
/// Only `debug`, `info`, `warn` and `error` are recognized; any other
/// string (including `trace` or a differently-cased name) falls back to
/// `INFO`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name {
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Name written into the `level` field of a serialized entry.
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warning",
        _ => "error",
    }
}
