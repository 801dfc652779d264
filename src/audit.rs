//! Persisted audit trail of operations performed through the API.

use chrono::Utc;
use serde::{Deserialize, Serialize};

const COLLECTION_PREFIX: &str = "auth_";
const COLLECTION_SUFFIX: &str = "_log";
const MODEL_NAME: &str = "operation";

/// Naming of a persisted model.
pub trait Collection {
    /// Logical resource name, e.g. `operation`.
    fn resource_name(&self) -> &'static str;

    /// Storage collection/table name.
    fn collection_name(&self) -> String;
}

/// One audited operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLog {
    /// Storage id, assigned on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unix seconds.
    pub timestamp: u64,
    pub client_ip: String,
    pub remote_ip: String,
    pub full_path: String,
    pub method: String,
    pub resp_code: i32,
    pub target_id: String,
    pub device: String,
    pub operator: String,
    pub user_id: String,
    pub account_id: String,
    /// Serialized state before the operation.
    pub before: String,
    /// Serialized state after the operation.
    pub after: String,
}

impl OperationLog {
    /// Empty record stamped with the current time.
    pub fn new() -> Self {
        OperationLog {
            timestamp: u64::try_from(Utc::now().timestamp()).unwrap_or_default(),
            ..Self::default()
        }
    }
}

impl Collection for OperationLog {
    fn resource_name(&self) -> &'static str {
        MODEL_NAME
    }

    fn collection_name(&self) -> String {
        format!("{}{}{}", COLLECTION_PREFIX, MODEL_NAME, COLLECTION_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names() {
        let log = OperationLog::default();
        assert_eq!(log.resource_name(), "operation");
        assert_eq!(log.collection_name(), "auth_operation_log");
    }

    #[test]
    fn new_is_stamped() {
        assert!(OperationLog::new().timestamp > 1_600_000_000);
    }

    #[test]
    fn id_is_omitted_until_assigned() {
        let log = OperationLog {
            method: "POST".into(),
            resp_code: 201,
            ..OperationLog::default()
        };
        let value = serde_json::to_value(&log).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["resp_code"], json!(201));
        assert_eq!(value["full_path"], json!(""));

        let back: OperationLog = serde_json::from_value(value).unwrap();
        assert_eq!(back, log);
    }
}
