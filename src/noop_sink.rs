use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};

/// A sink that simply drops all records.
///
/// Useful for measuring the cost of entry construction without any I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
