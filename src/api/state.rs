use crate::core::config::Config;
use crate::core::system_info::geolocation::{GeoResolver, GeoSettings, ReqwestFetcher};
use crate::core::system_info::{IoCounterOffsetStore, LiveSystemProbe, SystemProbe};
use crate::platform::{
    default_connections, default_inventory, default_temperature_detector, NvmlMemorySource,
    SysinfoNetworks,
};
use std::sync::Arc;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub probe: Arc<dyn SystemProbe>,
    pub offsets: Arc<IoCounterOffsetStore>,
}

impl AppState {
    pub fn new(probe: Arc<dyn SystemProbe>, offsets: Arc<IoCounterOffsetStore>) -> Self {
        Self { probe, offsets }
    }

    /// Wire the live OS and hardware sources.
    pub fn from_config(config: &Config) -> Self {
        let networks = Arc::new(SysinfoNetworks);
        let offsets = Arc::new(IoCounterOffsetStore::new());

        let geo = Arc::new(GeoResolver::new(
            Box::new(ReqwestFetcher),
            networks.clone(),
            GeoSettings {
                cache_duration: config.cache_duration(),
                request_timeout: config.request_timeout(),
                max_retries: config.max_retries,
            },
        ));

        let probe = LiveSystemProbe::new(
            default_temperature_detector(config),
            default_inventory(),
            Arc::new(NvmlMemorySource),
            networks.clone(),
            networks,
            default_connections(),
            offsets.clone(),
            geo,
        );

        Self::new(Arc::new(probe), offsets)
    }
}
