//! Logging setup for binaries built on the client
//!
//! The sub-crates log through `log`; the registry's log bridge picks those
//! records up alongside this crate's `tracing` events.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`; JSON
/// output is used when `ENVIRONMENT=production`.
pub fn init() {
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let is_production = environment == "production";

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "reelhouse={level},reelhouse_auth={level},reelhouse_postgrest={level},reelhouse_storage={level}",
            level = log_level
        ))
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    // A second init (tests, embedding) keeps the subscriber already installed.
    let installed = if is_production {
        subscriber
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };

    if installed.is_ok() {
        tracing::debug!("Logging initialized for {} environment", environment);
    }
}
