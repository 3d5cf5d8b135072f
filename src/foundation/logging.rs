//! Tracing subscriber setup for the binary and ad hoc tooling.

/// Log output configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit newline-delimited JSON instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// Logs go to stderr. `RUST_LOG` takes precedence over `config.level`. A second call is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
