use crate::logger::Logger;
use std::io::Write;

/// Build a [`Logger`] writing JSON lines to `output` (stdout when `None`)
/// at the minimum level named by `level`.
///
/// **Parameters**
/// - `level`: one of `debug`, `info`, `warn`, `error`; anything else
///   means `info`.
/// - `output`: destination stream.
///
/// Server name comes from the `SERVER_NAME` environment variable and
/// build metadata from the process-wide snapshot. Use
/// [`Logger::builder`] to inject either.
pub fn init<W>(level: &str, output: Option<W>) -> Logger
where
    W: Write + Send + 'static,
{
    let builder = Logger::builder().level(level);
    match output {
        Some(out) => builder.output(out).build(),
        None => builder.build(),
    }
}

#[cfg(feature = "tracing-layer")]
pub use self::tracing_init::{init_tracing, InitError, LayerConfig};

#[cfg(feature = "tracing-layer")]
mod tracing_init {
    use crate::layer::EnrichLayer;
    use crate::logger::Logger;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    /// Options for [`init_tracing`].
    ///
    /// - `enable_fmt`: if `true`, a `tracing_subscriber::fmt::Layer` is
    ///   stacked on top of [`EnrichLayer`] for human-readable console output.
    #[derive(Clone, Debug, Default)]
    pub struct LayerConfig {
        pub enable_fmt: bool,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum InitError {
        #[error("global tracing subscriber already installed: {0}")]
        AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
    }

    /// Route every `tracing` event in the process through `logger`.
    ///
    /// Installs a [`Registry`] with [`EnrichLayer`] as the global default
    /// subscriber. This can only happen once per process.
    pub fn init_tracing(logger: Arc<Logger>, config: LayerConfig) -> Result<(), InitError> {
        let layer = EnrichLayer::new(logger);

        // The two subscriber stacks have different types.
        if config.enable_fmt {
            let fmt_layer = tracing_subscriber::fmt::layer();
            let subscriber = Registry::default().with(layer).with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber)?;
        } else {
            let subscriber = Registry::default().with(layer);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        Ok(())
    }
}
