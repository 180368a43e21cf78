//! Hardware Message Relay Core Library
//!
//! Carries human-readable status text from BLE/hardware callbacks on any
//! thread to the one UI context that shows it to the user.

pub mod config;
pub mod error;
pub mod message;
pub mod relay;

// Re-export important types for easier access
pub use config::{Config, RelayConfig};
pub use error::RelayError;
pub use message::HardwareMessage;
pub use relay::{MessageRelay, PresentationSink, RecordingSink, RelayStats, UiDispatcher};

use anyhow::{Context, Result};
use tracing::info;

/// Build the relay described by `config` and register it as the process-wide instance.
///
/// Call once from the application's composition root, before any producer
/// touches [`MessageRelay::shared`].
pub fn init(config: &Config) -> Result<MessageRelay> {
    config.validate().context("Invalid relay configuration")?;

    let relay = MessageRelay::new(config.relay.clone());
    MessageRelay::install_shared(relay.clone())
        .context("Relay must be initialized before first use of the shared instance")?;

    info!(
        "✅ {} relay ready (queue capacity {})",
        config.app_name, config.relay.queue_capacity
    );
    Ok(relay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_rejects_invalid_config() {
        let mut config = Config::default();
        config.relay.queue_capacity = 0;
        assert!(init(&config).is_err());
    }

    #[test]
    fn test_init_after_shared_access_fails() {
        MessageRelay::shared();
        let err = init(&Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RelayError>(),
            Some(RelayError::AlreadyInstalled)
        ));
    }
}
