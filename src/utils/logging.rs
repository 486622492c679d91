//! Structured logging setup.
//!
//! The codec itself only emits `tracing` events; installing a subscriber is
//! left to the embedding application. `init_logging` is the convenience path
//! for binaries and tests that want the configured defaults.

use crate::config::LoggingConfig;
use crate::error::Result;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber for `config`.
///
/// `RUST_LOG` directives take precedence over the configured level. Calling
/// this after a global subscriber is already installed does nothing.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json_format {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        debug!(app = %config.app_name, level = %config.log_level, "logging initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }
}
