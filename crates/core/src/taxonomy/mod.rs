//! Torrent taxonomy index.
//!
//! The taxonomy aggregates per-facet counts and byte totals over the full
//! torrent list on every list cycle and publishes only the changes:
//! - **Accumulate**: one seed-then-increment mutation per facet
//! - **Diff**: JSON Patch operations between the previous and current snapshot
//! - **Service**: the cycle controller driving reset, accumulation and emission

mod accumulate;
mod diff;
mod listing;
mod service;
mod types;

pub use diff::{apply, compare, PatchOperation};
pub use listing::{facet_listing, facet_rows, locale_compare, FacetRow};
pub use service::{TaxonomyChangeHandler, TaxonomyService};
pub use types::*;
