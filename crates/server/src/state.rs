use std::sync::Arc;

use tokio::sync::RwLock;
use taxonomy_core::{ClientGateway, Config, SanitizedConfig, TaxonomyService};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    taxonomy: Arc<RwLock<TaxonomyService>>,
    /// Client gateway (None if no torrent source is configured)
    gateway: Option<ClientGateway>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        taxonomy: Arc<RwLock<TaxonomyService>>,
        gateway: Option<ClientGateway>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            taxonomy,
            gateway,
            ws_broadcaster,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn taxonomy(&self) -> &Arc<RwLock<TaxonomyService>> {
        &self.taxonomy
    }

    pub fn gateway(&self) -> Option<&ClientGateway> {
        self.gateway.as_ref()
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
