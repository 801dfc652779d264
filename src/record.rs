use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Keys owned by the record itself; user fields with these names are
/// written as `fields.<name>`.
pub const RESERVED_KEYS: [&str; 4] = ["time", "level", "msg", "error"];

/// A finished log entry as handed to a [`LogSink`](crate::sink::LogSink).
///
/// Serializes to one flat JSON object: `time`, `level`, `msg`, an
/// optional `error`, then the fields in key order.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(rename = "time", serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
    pub level: String,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogRecord {
    /// String value of a field, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Encode as a single JSON line including the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Move user fields that collide with [`RESERVED_KEYS`] out of the way.
pub(crate) fn prefix_reserved(fields: &mut BTreeMap<String, serde_json::Value>) {
    for key in RESERVED_KEYS {
        if let Some(value) = fields.remove(key) {
            fields.insert(format!("fields.{}", key), value);
        }
    }
}

fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
