use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unzipper_core::config::LogFormat;

const DEFAULT_FILTER: &str = "unzipper=info";

/// Initialize tracing for the binary; `RUST_LOG` overrides the default filter.
pub fn init_telemetry(format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    }
}
