use crate::env::{env_opt, key_to_env};
use std::collections::HashMap;
use std::sync::RwLock;

/// Configuration key holding the service name written into every entry.
pub const SERVER_NAME_KEY: &str = "server.name";

/// Key-value configuration consulted on every log call.
pub trait ConfigSource: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
}

/// Reads keys from environment variables, `server.name` -> `SERVER_NAME`.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    prefix: Option<String>,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `<PREFIX>_<KEY>` instead of `<KEY>`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        EnvConfig {
            prefix: Some(prefix.into()),
        }
    }
}

impl ConfigSource for EnvConfig {
    fn get_string(&self, key: &str) -> Option<String> {
        env_opt(&key_to_env(self.prefix.as_deref(), key))
    }
}

/// In-memory configuration that can be changed while loggers use it.
#[derive(Debug, Default)]
pub struct StaticConfig {
    values: RwLock<HashMap<String, String>>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = match self.values.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.insert(key.into(), value.into());
    }
}

impl ConfigSource for StaticConfig {
    fn get_string(&self, key: &str) -> Option<String> {
        let values = match self.values.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(key).cloned()
    }
}
