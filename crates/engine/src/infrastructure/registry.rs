//! Adapter registry - the platform dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use gamefindr_domain::Platform;

use crate::infrastructure::ports::PlatformAdapter;

/// The caller named a platform with no adapter. A caller input error,
/// distinct from [`AdapterError`](crate::infrastructure::ports::AdapterError)
/// so the gateway can tell "bad input" from "upstream broke".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported platform: {0}")]
pub struct UnsupportedPlatform(pub String);

/// Maps a platform identifier to its adapter. Built once at startup and
/// immutable afterwards.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Platform, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under the platform it reports.
    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters.insert(adapter.platform(), adapter);
    }

    /// Resolve a case-insensitive platform identifier to its adapter.
    pub fn resolve(
        &self,
        platform_id: &str,
    ) -> Result<Arc<dyn PlatformAdapter>, UnsupportedPlatform> {
        let platform: Platform = platform_id
            .parse()
            .map_err(|_| UnsupportedPlatform(platform_id.to_string()))?;
        self.adapters
            .get(&platform)
            .cloned()
            .ok_or_else(|| UnsupportedPlatform(platform_id.to_string()))
    }

    /// Platforms with a registered adapter.
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.adapters.contains_key(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockPlatformAdapter;

    fn registry_with_all_platforms() -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        for platform in Platform::ALL {
            let mut adapter = MockPlatformAdapter::new();
            adapter.expect_platform().return_const(platform);
            registry.register(Arc::new(adapter));
        }
        registry
    }

    #[test]
    fn resolves_every_supported_identifier_in_any_case() {
        let registry = registry_with_all_platforms();
        for platform in Platform::ALL {
            for id in [
                platform.id().to_string(),
                platform.id().to_ascii_uppercase(),
                format!(
                    "{}{}",
                    platform.id()[..1].to_ascii_uppercase(),
                    &platform.id()[1..]
                ),
            ] {
                let adapter = registry.resolve(&id).expect("should resolve");
                assert_eq!(adapter.platform(), platform);
            }
        }
    }

    #[test]
    fn rejects_unknown_platforms() {
        let registry = registry_with_all_platforms();
        for id in ["minecraft", "", "steam2", "play station"] {
            let err = registry.resolve(id).err().expect("should not resolve");
            assert_eq!(err, UnsupportedPlatform(id.to_string()), "{id:?}");
        }
    }

    #[test]
    fn rejects_known_platform_without_registered_adapter() {
        let mut registry = AdapterRegistry::new();
        let mut adapter = MockPlatformAdapter::new();
        adapter.expect_platform().return_const(Platform::Steam);
        registry.register(Arc::new(adapter));

        assert!(registry.resolve("steam").is_ok());
        let err = registry.resolve("roblox").err().expect("no roblox adapter");
        assert_eq!(err, UnsupportedPlatform("roblox".to_string()));
        assert_eq!(registry.platforms(), vec![Platform::Steam]);
    }
}
