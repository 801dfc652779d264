//! Environment variable names read by this crate.
//!
//! The build/instance variables are read once into a
//! [`BuildMetadata`](crate::metadata::BuildMetadata) snapshot; the
//! configuration helpers read theirs on every call.

/// Container image reference, e.g. `product-api:v1.2.3`.
pub const IMAGE_TAG_ENV: &str = "IMAGE_TAG";

/// Short git revision the artifact was built from.
pub const GIT_COMMIT_ENV: &str = "GIT_COMMIT";

/// Git branch the artifact was built from (`main`, `release`, ...).
pub const GIT_BRANCH_ENV: &str = "GIT_BRANCH";

/// Build timestamp, e.g. `2025-12-28T15:00:00Z`.
pub const BUILD_TIME_ENV: &str = "BUILD_TIME";

/// Container instance id. Set by the container runtime.
pub const HOSTNAME_ENV: &str = "HOSTNAME";

/// Read an environment variable, treating unset and non-UTF-8 values as absent.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Map a dotted configuration key to its environment variable name.
///
/// `server.name` becomes `SERVER_NAME`; with prefix `APP` it becomes
/// `APP_SERVER_NAME`.
pub fn key_to_env(prefix: Option<&str>, key: &str) -> String {
    let body = key.replace(['.', '-'], "_").to_ascii_uppercase();
    match prefix {
        Some(p) if !p.is_empty() => format!("{}_{}", p.to_ascii_uppercase(), body),
        _ => body,
    }
}
