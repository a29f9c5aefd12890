use super::{types::Config, ConfigError, SourceBackend};

/// Smallest accepted gateway poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Gateway poll interval and broadcast capacity are usable
/// - The selected source backend has its section
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Gateway validation
    if config.gateway.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(ConfigError::ValidationError(format!(
            "gateway.poll_interval_ms must be at least {}",
            MIN_POLL_INTERVAL_MS
        )));
    }
    if config.gateway.broadcast_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "gateway.broadcast_capacity cannot be 0".to_string(),
        ));
    }

    // Source validation
    if let Some(source) = &config.source {
        match source.backend {
            SourceBackend::QBittorrent => {
                let qbit = source.qbittorrent.as_ref().ok_or_else(|| {
                    ConfigError::ValidationError(
                        "source.qbittorrent is required when backend = \"qbittorrent\""
                            .to_string(),
                    )
                })?;
                if qbit.url.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "source.qbittorrent.url cannot be empty".to_string(),
                    ));
                }
            }
        }
    }

    Ok(())
}
