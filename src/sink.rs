use crate::record::LogRecord;

/// Error returned by a [`LogSink`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for finished [`LogRecord`]s.
///
/// Implementations are called inline from the logging thread, possibly
/// from many threads at once, and must keep each record intact (no
/// interleaving of two records' bytes).
pub trait LogSink: Send + Sync {
    /// Write a single record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was accepted.
    /// - `Err(..)` on encoding or I/O failure. The logger reports the
    ///   failure on stderr and drops the record; callers never see it.
    fn write(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush any buffered records. Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
