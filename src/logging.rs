use tracing::Subscriber;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

/// `RUST_LOG` when set, otherwise info, or debug with `-v`
pub fn default_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose > 0 { "debug" } else { "info" })
    })
}

/// Log formatter writing to `writer`. The binary hands it stderr, since stdout
/// carries the JSON lines of print-only comment crawls.
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}
