use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub source: Option<SourceConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Client gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// How often to list torrents and run a taxonomy cycle (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Capacity of the channel fanning taxonomy changes out to subscribers.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_broadcast_capacity() -> usize {
    256
}

/// Torrent source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Source backend type
    pub backend: SourceBackend,
    /// qBittorrent-specific configuration (required when backend = "qbittorrent")
    #[serde(default)]
    pub qbittorrent: Option<QBittorrentConfig>,
}

/// Available torrent source backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum SourceBackend {
    #[serde(rename = "qbittorrent")]
    QBittorrent,
}

impl SourceBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceBackend::QBittorrent => "qbittorrent",
        }
    }
}

/// qBittorrent WebUI configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// WebUI URL (e.g., "http://localhost:8080")
    pub url: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SanitizedSourceConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSourceConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qbittorrent: Option<SanitizedQBittorrentConfig>,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            gateway: config.gateway.clone(),
            source: config.source.as_ref().map(|s| SanitizedSourceConfig {
                backend: s.backend.as_str().to_string(),
                qbittorrent: s.qbittorrent.as_ref().map(|q| SanitizedQBittorrentConfig {
                    url: q.url.clone(),
                    username: q.username.clone(),
                    password_configured: !q.password.is_empty(),
                    timeout_secs: q.timeout_secs,
                }),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.gateway.poll_interval_ms, 2000);
        assert_eq!(config.gateway.broadcast_capacity, 256);
        assert!(config.source.is_none());
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_with_source_config() {
        let toml = r#"
[source]
backend = "qbittorrent"

[source.qbittorrent]
url = "http://localhost:8080"
username = "admin"
password = "secret"
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let source = config.source.as_ref().unwrap();
        assert_eq!(source.backend, SourceBackend::QBittorrent);

        let qbit = source.qbittorrent.as_ref().unwrap();
        assert_eq!(qbit.url, "http://localhost:8080");
        assert_eq!(qbit.password, "secret");
        assert_eq!(qbit.timeout_secs, 10);
    }

    #[test]
    fn test_deserialize_qbittorrent_missing_password_fails() {
        let toml = r#"
[source]
backend = "qbittorrent"

[source.qbittorrent]
url = "http://localhost:8080"
username = "admin"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_without_source() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert_eq!(sanitized.server.port, 8080);
        assert!(sanitized.source.is_none());
    }

    #[test]
    fn test_sanitized_config_hides_password() {
        let config = Config {
            source: Some(SourceConfig {
                backend: SourceBackend::QBittorrent,
                qbittorrent: Some(QBittorrentConfig {
                    url: "http://localhost:8080".to_string(),
                    username: "admin".to_string(),
                    password: "secret".to_string(),
                    timeout_secs: 30,
                }),
            }),
            ..Default::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let source = sanitized.source.as_ref().unwrap();
        assert_eq!(source.backend, "qbittorrent");

        let qbit = source.qbittorrent.as_ref().unwrap();
        assert!(qbit.password_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
