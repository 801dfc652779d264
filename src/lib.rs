pub mod audit;
pub mod caller;
pub mod config;
pub mod context;
pub mod entry;
pub mod env;
pub mod level;
pub mod logger;
pub mod metadata;
pub mod record;
pub mod sink;
pub mod stack;

#[cfg(feature = "tracing-layer")]
pub mod layer;

pub mod init;
pub mod memory_sink;
pub mod noop_sink;
pub mod writer_sink;

pub use caller::CallSite;
pub use config::{ConfigSource, EnvConfig, StaticConfig};
pub use context::RequestContext;
pub use entry::Entry;
pub use init::init;
pub use logger::{Logger, LoggerBuilder};
pub use memory_sink::MemorySink;
pub use metadata::{BuildMetadata, MetadataProvider, MetadataSource};
pub use noop_sink::NoopSink;
pub use record::LogRecord;
pub use sink::{LogSink, SinkError};
pub use writer_sink::WriterSink;
