//! qBittorrent torrent source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QBittorrentConfig;
use crate::torrent::{TorrentProperties, TorrentStatus};

use super::{SourceError, TorrentSource};

/// qBittorrent source backed by the WebUI API.
pub struct QBittorrentSource {
    client: Client,
    config: QBittorrentConfig,
    /// Whether the cookie jar holds a session (reset on auth failure).
    authenticated: Arc<RwLock<bool>>,
}

impl QBittorrentSource {
    /// Create a new qBittorrent source.
    pub fn new(config: QBittorrentConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            authenticated: Arc::new(RwLock::new(false)),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Login and keep the session cookie in the client's jar.
    async fn login(&self) -> Result<(), SourceError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            *self.authenticated.write().await = true;
            Ok(())
        } else if body.contains("Fails.") || status == StatusCode::FORBIDDEN {
            Err(SourceError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(SourceError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    /// Ensure we have a valid session, logging in if needed.
    async fn ensure_authenticated(&self) -> Result<(), SourceError> {
        if *self.authenticated.read().await {
            return Ok(());
        }
        self.login().await
    }

    /// Make an authenticated GET request, re-authenticating once on 403.
    async fn get(&self, endpoint: &str) -> Result<String, SourceError> {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        if response.status() == StatusCode::FORBIDDEN {
            warn!("qBittorrent session expired, re-authenticating");
            *self.authenticated.write().await = false;
            self.login().await?;

            response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(map_request_error)?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::ApiError(e.to_string()))
    }

    /// Tracker host names of one torrent.
    async fn tracker_hosts(&self, hash: &str) -> Result<Vec<String>, SourceError> {
        let endpoint = format!(
            "/api/v2/torrents/trackers?hash={}",
            urlencoding::encode(hash)
        );
        let response = self.get(&endpoint).await?;
        let trackers: Vec<QBTracker> = serde_json::from_str(&response)
            .map_err(|e| SourceError::ApiError(format!("Failed to parse trackers: {}", e)))?;

        Ok(tracker_hosts(trackers.iter().map(|t| t.url.as_str())))
    }
}

fn map_request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else if e.is_connect() {
        SourceError::ConnectionFailed(e.to_string())
    } else {
        SourceError::ApiError(e.to_string())
    }
}

/// qBittorrent torrent info response.
#[derive(Debug, Deserialize)]
struct QBTorrentInfo {
    hash: String,
    name: String,
    state: String,
    size: i64,
    dlspeed: i64,
    upspeed: i64,
    save_path: String,
    #[serde(default)]
    tags: String,
}

/// qBittorrent tracker entry.
#[derive(Debug, Deserialize)]
struct QBTracker {
    url: String,
}

impl QBTorrentInfo {
    fn into_properties(self, tracker_uris: Vec<String>) -> TorrentProperties {
        let transferring = self.dlspeed > 0 || self.upspeed > 0;
        TorrentProperties {
            hash: self.hash.to_lowercase(),
            name: self.name,
            status: parse_qb_state(&self.state, transferring),
            tags: parse_tags(&self.tags),
            tracker_uris,
            directory: self.save_path,
            size_bytes: self.size.max(0) as u64,
        }
    }
}

/// Map a qBittorrent state string to status labels.
fn parse_qb_state(state: &str, transferring: bool) -> Vec<TorrentStatus> {
    let mut statuses = match state {
        "uploading" | "forcedUP" | "stalledUP" => {
            vec![TorrentStatus::Seeding, TorrentStatus::Complete]
        }
        "queuedUP" => vec![TorrentStatus::Complete],
        "downloading" | "forcedDL" | "metaDL" | "forcedMetaDL" | "allocating" | "stalledDL"
        | "queuedDL" => vec![TorrentStatus::Downloading],
        "pausedDL" => vec![TorrentStatus::Paused],
        "pausedUP" => vec![TorrentStatus::Paused, TorrentStatus::Complete],
        "stoppedDL" => vec![TorrentStatus::Stopped],
        "stoppedUP" => vec![TorrentStatus::Stopped, TorrentStatus::Complete],
        "checkingDL" | "checkingResumeData" | "moving" => vec![TorrentStatus::Checking],
        "checkingUP" => vec![TorrentStatus::Checking, TorrentStatus::Complete],
        "error" | "missingFiles" => vec![TorrentStatus::Error],
        _ => Vec::new(),
    };

    statuses.push(if transferring {
        TorrentStatus::Active
    } else {
        TorrentStatus::Inactive
    });
    statuses
}

/// Split qBittorrent's comma-separated tag string.
fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Host names of real tracker URLs, deduplicated in first-seen order.
///
/// DHT, PeX and LSD show up as `** [DHT] **` style entries and are skipped.
fn tracker_hosts<'a>(urls: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for url in urls {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        else {
            continue;
        };
        if !hosts.contains(&host) {
            hosts.push(host);
        }
    }
    hosts
}

#[async_trait]
impl TorrentSource for QBittorrentSource {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn list_torrents(&self) -> Result<Vec<TorrentProperties>, SourceError> {
        let response = self.get("/api/v2/torrents/info").await?;
        let torrents: Vec<QBTorrentInfo> = serde_json::from_str(&response)
            .map_err(|e| SourceError::ApiError(format!("Failed to parse response: {}", e)))?;

        let mut results = Vec::with_capacity(torrents.len());
        for torrent in torrents {
            let trackers = self.tracker_hosts(&torrent.hash).await?;
            results.push(torrent.into_properties(trackers));
        }

        debug!("qBittorrent listed {} torrents", results.len());
        Ok(results)
    }
}
