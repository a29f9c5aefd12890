//! Types for the client gateway.

use thiserror::Error;

use crate::source::SourceError;
use crate::taxonomy::TaxonomyError;

/// Errors that can occur during a gateway refresh.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Torrent source error: {0}")]
    Source(#[from] SourceError),

    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),
}
