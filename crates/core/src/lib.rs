pub mod config;
pub mod filter;
pub mod gateway;
pub mod metrics;
pub mod source;
pub mod taxonomy;
pub mod testing;
pub mod torrent;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, GatewayConfig,
    QBittorrentConfig, SanitizedConfig, ServerConfig, SourceBackend, SourceConfig,
};
pub use filter::{filter_torrents, FacetFilter, FilterType};
pub use gateway::{ClientGateway, GatewayError};
pub use source::{QBittorrentSource, SourceError, TorrentSource};
pub use taxonomy::{
    apply, compare, facet_listing, facet_rows, Buckets, Facet, FacetRow, PatchOperation,
    TaxonomyChangeHandler, TaxonomyDiffChange, TaxonomyError, TaxonomyResponse, TaxonomyService,
    TaxonomySnapshot, ALL_KEY, UNTAGGED_KEY,
};
pub use torrent::{torrent_list, TorrentList, TorrentProperties, TorrentStatus};
