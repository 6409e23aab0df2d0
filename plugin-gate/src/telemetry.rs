//! Logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Priority: `RUST_LOG` env var > `level` parameter. Output goes to stderr so
/// reports on stdout stay machine-readable.
pub fn init_telemetry(level: &str) {
    let default_filter = format!("{level},plugin_gate={level},plugin_signature={level}");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .ok();
}
