//! Request-scoped values attached to log entries.
//!
//! A [`RequestContext`] is usually built by request middleware and either
//! passed explicitly to the logger or installed as the ambient context of
//! the current tokio task with [`scope`].

use serde_json::{Map, Value};
use std::future::Future;

/// Context key under which the trace identifier is stored.
pub const TRACE_ID_KEY: &str = "traceid";
/// Context key under which the client IP is stored.
pub const CLIENT_IP_KEY: &str = "ip";
/// Context key under which the merchant identifier is stored.
pub const MERCHANT_KEY: &str = "MERCHANT_KEY";
/// Context key under which the operator identifier is stored.
pub const OPERATOR_KEY: &str = "OPERATOR_KEY";

/// Optional per-request identifiers.
///
/// Values are passed through as-is; no format validation is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub trace_id: Option<String>,
    pub client_ip: Option<String>,
    pub merchant_id: Option<String>,
    pub operator_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn with_merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }

    pub fn with_operator_id(mut self, operator_id: impl Into<String>) -> Self {
        self.operator_id = Some(operator_id.into());
        self
    }

    /// Extract the well-known keys from an untyped value map.
    ///
    /// Only non-empty strings are taken; numbers, nulls, objects and so on
    /// are treated as absent.
    pub fn from_values(values: &Map<String, Value>) -> Self {
        let get = |key: &str| match values.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        RequestContext {
            trace_id: get(TRACE_ID_KEY),
            client_ip: get(CLIENT_IP_KEY),
            merchant_id: get(MERCHANT_KEY),
            operator_id: get(OPERATOR_KEY),
        }
    }

    /// Present, non-empty values paired with their entry field name.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("trace", self.trace_id.as_deref()),
            ("ip", self.client_ip.as_deref()),
            ("merchantId", self.merchant_id.as_deref()),
            ("operator", self.operator_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| match value {
            Some(v) if !v.is_empty() => Some((name, v)),
            _ => None,
        })
    }
}

tokio::task_local! {
    static CURRENT: RequestContext;
}

/// Run `fut` with `ctx` as the ambient request context.
pub async fn scope<F>(ctx: RequestContext, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT.scope(ctx, fut).await
}

/// Synchronous variant of [`scope`].
pub fn sync_scope<F, R>(ctx: RequestContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT.sync_scope(ctx, f)
}

/// Ambient request context, if one was installed with [`scope`].
pub fn current() -> Option<RequestContext> {
    CURRENT.try_with(|ctx| ctx.clone()).ok()
}
