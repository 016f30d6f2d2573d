//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::activision::ActivisionAdapter;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::epic::EpicAdapter;
use crate::infrastructure::playstation::PlayStationAdapter;
use crate::infrastructure::registry::AdapterRegistry;
use crate::infrastructure::roblox::{RobloxAdapter, RobloxEndpoints};
use crate::infrastructure::steam::SteamAdapter;
use crate::infrastructure::xbox::XboxAdapter;
use crate::use_cases::ProfileGateway;

/// Main application state.
///
/// Wires all six platform adapters into the registry and exposes the
/// lookup gateway. Passed to HTTP handlers via Axum state.
pub struct App {
    pub registry: Arc<AdapterRegistry>,
    pub gateway: ProfileGateway,
}

impl App {
    /// Create a new App with every adapter wired up from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        let timeout = config.upstream_timeout;
        let include_raw = config.include_raw_data;

        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(SteamAdapter::new(
            &config.steam_api_base,
            config.steam_api_key.clone(),
            timeout,
            include_raw,
        )));
        registry.register(Arc::new(RobloxAdapter::new(
            RobloxEndpoints::default(),
            timeout,
            include_raw,
        )));
        registry.register(Arc::new(EpicAdapter::new(
            &config.fortnite_api_base,
            config.fortnite_api_key.clone(),
            timeout,
            include_raw,
        )));
        registry.register(Arc::new(XboxAdapter::new(
            &config.openxbl_api_base,
            config.openxbl_api_key.clone(),
            timeout,
            include_raw,
        )));
        registry.register(Arc::new(PlayStationAdapter::new(
            &config.psn_auth_base,
            &config.psn_data_base,
            config.psn_npsso.clone(),
            timeout,
            include_raw,
        )));
        registry.register(Arc::new(ActivisionAdapter::new(
            &config.tracker_api_base,
            config.tracker_api_key.clone(),
            timeout,
            include_raw,
        )));

        let registry = Arc::new(registry);
        Self {
            gateway: ProfileGateway::new(registry.clone()),
            registry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamefindr_domain::Platform;

    #[test]
    fn app_registers_an_adapter_for_every_platform() {
        let app = App::new(&EngineConfig::default());
        assert_eq!(app.registry.platforms(), Platform::ALL.to_vec());
        for platform in Platform::ALL {
            assert!(app.registry.resolve(platform.id()).is_ok());
        }
    }
}
