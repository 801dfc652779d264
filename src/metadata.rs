use crate::env::{
    env_opt, BUILD_TIME_ENV, GIT_BRANCH_ENV, GIT_COMMIT_ENV, HOSTNAME_ENV, IMAGE_TAG_ENV,
};
use std::sync::{Arc, OnceLock};

/// Identifiers of the running artifact and its instance.
///
/// Empty strings mean "absent"; such fields are never written into an
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    pub image: String,
    pub git_commit: String,
    pub git_branch: String,
    pub build_time: String,
    pub instance: String,
}

static GLOBAL: OnceLock<Arc<BuildMetadata>> = OnceLock::new();

impl BuildMetadata {
    /// Read `IMAGE_TAG`, `GIT_COMMIT`, `GIT_BRANCH`, `BUILD_TIME` and
    /// `HOSTNAME` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(env_opt)
    }

    /// Same as [`BuildMetadata::from_env`] but with an injected lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        BuildMetadata {
            image: get(IMAGE_TAG_ENV),
            git_commit: get(GIT_COMMIT_ENV),
            git_branch: get(GIT_BRANCH_ENV),
            build_time: get(BUILD_TIME_ENV),
            instance: get(HOSTNAME_ENV),
        }
    }

    /// Process-wide snapshot, taken from the environment on first use.
    pub fn global() -> Arc<BuildMetadata> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(BuildMetadata::from_env())))
    }

    /// Present fields in output order, paired with their entry field name.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("image", self.image.as_str()),
            ("git_commit", self.git_commit.as_str()),
            ("git_branch", self.git_branch.as_str()),
            ("build_time", self.build_time.as_str()),
            ("instance", self.instance.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
    }
}

/// Error returned by a [`MetadataProvider`].
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("metadata provider unavailable: {0}")]
    Unavailable(String),
}

/// Live source of build metadata, e.g. a container-runtime inspect call.
///
/// Queried on every log call when installed through
/// [`MetadataSource::Live`]. Prefer the snapshot: a live provider adds an
/// external call to each entry.
pub trait MetadataProvider: Send + Sync {
    fn fetch(&self) -> Result<BuildMetadata, MetadataError>;
}

/// Where a [`Logger`](crate::logger::Logger) takes build metadata from.
#[derive(Clone)]
pub enum MetadataSource {
    /// Immutable snapshot taken once at startup.
    Snapshot(Arc<BuildMetadata>),
    /// Deprecated per-call lookup.
    Live(Arc<dyn MetadataProvider>),
}

impl MetadataSource {
    /// Metadata for the current call. Provider failures yield empty
    /// metadata so the entry is still written.
    pub fn current(&self) -> Arc<BuildMetadata> {
        match self {
            MetadataSource::Snapshot(meta) => Arc::clone(meta),
            MetadataSource::Live(provider) => Arc::new(provider.fetch().unwrap_or_default()),
        }
    }
}

impl Default for MetadataSource {
    fn default() -> Self {
        MetadataSource::Snapshot(BuildMetadata::global())
    }
}

impl std::fmt::Debug for MetadataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataSource::Snapshot(meta) => f.debug_tuple("Snapshot").field(meta).finish(),
            MetadataSource::Live(_) => f.write_str("Live(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_produce_no_fields() {
        let meta = BuildMetadata::from_lookup(|_| None);
        assert_eq!(meta, BuildMetadata::default());
        assert_eq!(meta.fields().count(), 0);
    }

    #[test]
    fn present_fields_keep_fixed_order_and_skip_empty() {
        let meta = BuildMetadata::from_lookup(lookup(&[
            ("HOSTNAME", "pod-7f9c"),
            ("IMAGE_TAG", "product-api:v1.2.3"),
            ("GIT_BRANCH", ""),
        ]));
        let fields: Vec<_> = meta.fields().collect();
        assert_eq!(
            fields,
            vec![("image", "product-api:v1.2.3"), ("instance", "pod-7f9c")]
        );
    }

    struct Failing;

    impl MetadataProvider for Failing {
        fn fetch(&self) -> Result<BuildMetadata, MetadataError> {
            Err(MetadataError::Unavailable("docker socket missing".into()))
        }
    }

    #[test]
    fn live_provider_failure_degrades_to_empty() {
        let source = MetadataSource::Live(Arc::new(Failing));
        assert_eq!(source.current().fields().count(), 0);
    }
}
