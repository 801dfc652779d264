use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

/// Writes each record as one JSON line to an [`io::Write`].
///
/// The line is encoded before the lock is taken and written with a
/// single `write_all`, so concurrent records never interleave.
pub struct WriterSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl WriterSink {
    pub fn new<W>(out: W) -> Self
    where
        W: Write + Send + 'static,
    {
        WriterSink {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LogSink for WriterSink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = record.to_json_line()?;
        self.lock().write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.lock().flush()?;
        Ok(())
    }
}
