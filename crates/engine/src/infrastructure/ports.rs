//! Port traits for infrastructure boundaries.
//!
//! The one abstraction in the engine: a port per upstream platform API, so
//! the gateway and registry can be tested without network access. Everything
//! else is concrete types.

use async_trait::async_trait;

use gamefindr_domain::{Platform, Profile};

// =============================================================================
// Error Types
// =============================================================================

/// Failures reported by platform adapters.
///
/// `NotFound` means the upstream explicitly had no match for the identifier
/// (including "expected field absent" responses). `Upstream` is everything
/// else that broke a primary call: timeouts, non-2xx statuses, malformed
/// bodies. The original cause stays attached for logs and never reaches
/// external callers.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("{0} profile not found")]
    NotFound(Platform),

    #[error("{platform} request failed: {message}")]
    Upstream {
        platform: Platform,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl AdapterError {
    /// Upstream failure without a typed cause.
    pub fn upstream(platform: Platform, message: impl Into<String>) -> Self {
        Self::Upstream {
            platform,
            message: message.into(),
            source: None,
        }
    }

    /// Upstream failure retaining the original cause for diagnostics.
    pub fn upstream_with_source(
        platform: Platform,
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Upstream {
            platform,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            Self::NotFound(platform) => *platform,
            Self::Upstream { platform, .. } => *platform,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// =============================================================================
// Platform Adapter Port
// =============================================================================

/// One adapter per platform: wraps that platform's upstream HTTP calls and
/// produces a normalized [`Profile`] or a typed failure.
///
/// Implementations follow a common shape: resolve the identity, fetch the
/// primary profile (absence of expected fields is `NotFound`, not a
/// transport error), run best-effort enrichment calls whose failures are
/// swallowed with placeholder values, then normalize.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// The platform this adapter serves.
    fn platform(&self) -> Platform;

    /// Fetch and normalize the profile behind `identifier`.
    async fn fetch_profile(&self, identifier: &str) -> Result<Profile, AdapterError>;
}

/// Degraded-but-successful profile for adapters constructed without an API
/// credential. Lookups never fail solely because a key is missing; callers
/// get an informational payload instead.
pub(crate) fn unconfigured_profile(platform: Platform, identifier: &str) -> Profile {
    Profile::builder(platform, identifier)
        .last_online("API not configured")
        .stat(
            "note",
            format!(
                "Live {} data requires an API credential; returning placeholder profile",
                platform.display_name()
            ),
        )
        .stat("platform", platform.display_name())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_platform() {
        let err = AdapterError::NotFound(Platform::Roblox);
        assert_eq!(err.to_string(), "Roblox profile not found");
        assert!(err.is_not_found());
        assert_eq!(err.platform(), Platform::Roblox);
    }

    #[test]
    fn upstream_error_keeps_cause_out_of_display() {
        let cause = anyhow::anyhow!("connection reset by peer");
        let err =
            AdapterError::upstream_with_source(Platform::Steam, "player summaries call", cause);
        assert_eq!(err.to_string(), "Steam request failed: player summaries call");
        assert!(!err.is_not_found());
        match err {
            AdapterError::Upstream { source, .. } => assert!(source.is_some()),
            AdapterError::NotFound(_) => panic!("expected upstream variant"),
        }
    }

    #[test]
    fn unconfigured_profile_is_well_formed() {
        let profile = unconfigured_profile(Platform::Activision, "SomePlayer#123");
        assert_eq!(profile.username(), "SomePlayer#123");
        assert_eq!(profile.platform(), "Activision");
        assert!(!profile.avatar().is_empty());
        assert_eq!(profile.last_online(), "API not configured");
        assert!(profile.stats().contains_key("note"));
    }
}
