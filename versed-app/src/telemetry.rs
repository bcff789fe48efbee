//! Tracing subscriber setup for shells embedding Versed.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use versed_core::config::GeneralConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level`; an unparsable level falls back
/// to `info`. Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &GeneralConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = config.json_logs.then(|| fmt::layer().json());
    let text = (!config.json_logs).then(fmt::layer);

    tracing_subscriber::registry()
        .with(json)
        .with(text)
        .with(env_filter)
        .try_init()
        .is_ok()
}
