//! Torrent listing API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use taxonomy_core::{FacetFilter, FilterType, GatewayError, TorrentProperties};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TorrentFilterParams {
    /// Facet to filter on; no filtering when absent.
    #[serde(default, rename = "type")]
    pub facet: Option<FilterType>,
    /// Comma-separated selected values.
    #[serde(default)]
    pub values: Option<String>,
}

impl TorrentFilterParams {
    fn into_filter(self) -> Option<FacetFilter> {
        let facet = self.facet?;
        let values = self
            .values
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|value| !value.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();
        Some(FacetFilter::new(facet, values))
    }
}

#[derive(Debug, Serialize)]
pub struct TorrentListResponse {
    pub torrents: Vec<TorrentProperties>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Id of the emitted diff, absent when the cycle changed nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub operations: usize,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/torrents
///
/// List the torrents of the last cycle, optionally filtered by one facet.
pub async fn list_torrents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TorrentFilterParams>,
) -> Result<Json<TorrentListResponse>, ApiError> {
    let gateway = state.gateway().ok_or_else(|| {
        error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Torrent source not configured",
        )
    })?;

    let torrents = match params.into_filter() {
        Some(filter) => gateway.filter_torrents(&filter).await,
        None => gateway.torrents().await,
    };

    Ok(Json(TorrentListResponse {
        count: torrents.len(),
        torrents,
    }))
}

/// POST /api/v1/torrents/refresh
///
/// Run one list cycle now instead of waiting for the next poll.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let gateway = state.gateway().ok_or_else(|| {
        error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Torrent source not configured",
        )
    })?;

    match gateway.refresh().await {
        Ok(change) => Ok(Json(RefreshResponse {
            id: change.as_ref().map(|c| c.id),
            operations: change.map_or(0, |c| c.diff.len()),
        })),
        Err(GatewayError::Source(e)) => {
            warn!("Manual refresh failed: {}", e);
            Err(error(StatusCode::BAD_GATEWAY, e.to_string()))
        }
        Err(e) => Err(error(StatusCode::CONFLICT, e.to_string())),
    }
}
