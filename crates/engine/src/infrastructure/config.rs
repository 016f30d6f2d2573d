//! Engine configuration loaded from the environment.
//!
//! Credentials are provisioning concerns: the engine receives them at
//! construction time and never embeds them. A missing credential is not an
//! error — the affected adapter degrades to an informational profile.

use std::time::Duration;

/// Default per-call timeout for upstream platform APIs. Third parties are
/// uncontrolled; never wait on them indefinitely.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 8;

pub const DEFAULT_STEAM_API_BASE: &str = "https://api.steampowered.com";
pub const DEFAULT_FORTNITE_API_BASE: &str = "https://fortnite-api.com";
pub const DEFAULT_OPENXBL_API_BASE: &str = "https://xbl.io";
pub const DEFAULT_TRACKER_API_BASE: &str = "https://public-api.tracker.gg";
pub const DEFAULT_PSN_AUTH_BASE: &str = "https://ca.account.sony.com/api/authz/v3/oauth";
pub const DEFAULT_PSN_DATA_BASE: &str = "https://m.np.playstation.com/api";

/// All engine settings, gathered once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origins: Option<String>,

    /// Per-call timeout applied to every upstream request.
    pub upstream_timeout: Duration,
    /// Attach unprocessed upstream payloads to profiles (diagnostics only).
    pub include_raw_data: bool,

    pub steam_api_key: Option<String>,
    pub steam_api_base: String,
    pub fortnite_api_key: Option<String>,
    pub fortnite_api_base: String,
    pub openxbl_api_key: Option<String>,
    pub openxbl_api_base: String,
    pub tracker_api_key: Option<String>,
    pub tracker_api_base: String,
    pub psn_npsso: Option<String>,
    pub psn_auth_base: String,
    pub psn_data_base: String,
}

impl EngineConfig {
    /// Read configuration from environment variables, applying defaults.
    pub fn from_env() -> Self {
        let server_host = env_or("SERVER_HOST", "0.0.0.0");
        let server_port = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let upstream_timeout_secs = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        Self {
            server_host,
            server_port,
            cors_allowed_origins: env_non_empty("CORS_ALLOWED_ORIGINS"),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            include_raw_data: env_flag("INCLUDE_RAW_DATA"),
            steam_api_key: env_non_empty("STEAM_API_KEY"),
            steam_api_base: env_or("STEAM_API_BASE", DEFAULT_STEAM_API_BASE),
            fortnite_api_key: env_non_empty("FORTNITE_API_KEY"),
            fortnite_api_base: env_or("FORTNITE_API_BASE", DEFAULT_FORTNITE_API_BASE),
            openxbl_api_key: env_non_empty("OPENXBL_API_KEY"),
            openxbl_api_base: env_or("OPENXBL_API_BASE", DEFAULT_OPENXBL_API_BASE),
            tracker_api_key: env_non_empty("TRACKER_API_KEY"),
            tracker_api_base: env_or("TRACKER_API_BASE", DEFAULT_TRACKER_API_BASE),
            psn_npsso: env_non_empty("PSN_NPSSO"),
            psn_auth_base: env_or("PSN_AUTH_BASE", DEFAULT_PSN_AUTH_BASE),
            psn_data_base: env_or("PSN_DATA_BASE", DEFAULT_PSN_DATA_BASE),
        }
    }
}

impl Default for EngineConfig {
    /// Defaults with no credentials configured; every credentialed adapter
    /// serves informational profiles.
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            cors_allowed_origins: None,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            include_raw_data: false,
            steam_api_key: None,
            steam_api_base: DEFAULT_STEAM_API_BASE.to_string(),
            fortnite_api_key: None,
            fortnite_api_base: DEFAULT_FORTNITE_API_BASE.to_string(),
            openxbl_api_key: None,
            openxbl_api_base: DEFAULT_OPENXBL_API_BASE.to_string(),
            tracker_api_key: None,
            tracker_api_base: DEFAULT_TRACKER_API_BASE.to_string(),
            psn_npsso: None,
            psn_auth_base: DEFAULT_PSN_AUTH_BASE.to_string(),
            psn_data_base: DEFAULT_PSN_DATA_BASE.to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_credentials() {
        let config = EngineConfig::default();
        assert!(config.steam_api_key.is_none());
        assert!(config.psn_npsso.is_none());
        assert_eq!(config.upstream_timeout, Duration::from_secs(8));
        assert!(!config.include_raw_data);
    }
}
