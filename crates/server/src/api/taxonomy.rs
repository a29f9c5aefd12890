//! Taxonomy API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use taxonomy_core::{facet_rows, FacetRow, FilterType, TaxonomyResponse};

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FacetListingResponse {
    pub facet: FilterType,
    pub rows: Vec<FacetRow>,
}

/// GET /api/v1/taxonomy
///
/// Current snapshot with a fresh id, usable as a baseline for diffs.
pub async fn get_taxonomy(State(state): State<Arc<AppState>>) -> Json<TaxonomyResponse> {
    Json(state.taxonomy().read().await.get_taxonomy())
}

/// GET /api/v1/taxonomy/{facet}
///
/// Display rows of one facet, `""` (all torrents) first.
pub async fn get_facet(
    State(state): State<Arc<AppState>>,
    Path(facet): Path<String>,
) -> Result<Json<FacetListingResponse>, (StatusCode, Json<ErrorResponse>)> {
    let facet = FilterType::from_name(&facet).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unknown facet: {}", facet),
            }),
        )
    })?;

    let taxonomy = state.taxonomy().read().await;
    Ok(Json(FacetListingResponse {
        facet,
        rows: facet_rows(taxonomy.taxonomy(), facet),
    }))
}
