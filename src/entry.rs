use crate::logger::Logger;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::Level;

/// An enriched, not yet written log entry.
///
/// Returned by [`Logger::log`]; add more fields if needed and finish it
/// with one of the level methods. Nothing is written until then.
#[must_use = "an entry is only written when finished with a level method"]
pub struct Entry<'a> {
    logger: &'a Logger,
    fields: BTreeMap<String, Value>,
    error: Option<String>,
}

impl<'a> Entry<'a> {
    pub(crate) fn new(logger: &'a Logger, fields: BTreeMap<String, Value>) -> Self {
        Entry {
            logger,
            fields,
            error: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach an error, written under the `error` key.
    pub fn with_error(mut self, err: &dyn fmt::Display) -> Self {
        self.error = Some(err.to_string());
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Text of the attached error, if any.
    pub fn attached_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Write the entry at `level`. Entries below the logger's minimum
    /// level are dropped without formatting `msg`.
    pub fn log(self, level: Level, msg: impl fmt::Display) {
        if !self.logger.enabled(level) {
            return;
        }
        self.logger
            .emit(level, msg.to_string(), self.error, self.fields);
    }

    pub fn logf(self, level: Level, args: fmt::Arguments<'_>) {
        self.log(level, args);
    }

    pub fn trace(self, msg: impl fmt::Display) {
        self.log(Level::TRACE, msg);
    }

    pub fn debug(self, msg: impl fmt::Display) {
        self.log(Level::DEBUG, msg);
    }

    pub fn info(self, msg: impl fmt::Display) {
        self.log(Level::INFO, msg);
    }

    pub fn warn(self, msg: impl fmt::Display) {
        self.log(Level::WARN, msg);
    }

    pub fn error(self, msg: impl fmt::Display) {
        self.log(Level::ERROR, msg);
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("fields", &self.fields)
            .field("error", &self.error)
            .finish()
    }
}
