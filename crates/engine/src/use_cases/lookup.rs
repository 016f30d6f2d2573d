//! Profile lookup - validate, dispatch, categorize failures.

use std::sync::Arc;

use tracing::Instrument;

use gamefindr_domain::{Platform, Profile};

use crate::infrastructure::correlation::CorrelationId;
use crate::infrastructure::ports::AdapterError;
use crate::infrastructure::registry::{AdapterRegistry, UnsupportedPlatform};

/// Failures surfaced by [`ProfileGateway::lookup`], one variant per response
/// category so callers pattern-match instead of sniffing messages.
///
/// Display strings are safe for external callers; upstream detail stays in
/// `detail`/`source` for logs only.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Username and platform are required")]
    InvalidRequest,

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{0} profile not found")]
    NotFound(Platform),

    #[error("{platform} is currently unavailable")]
    Upstream {
        platform: Platform,
        detail: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl From<UnsupportedPlatform> for LookupError {
    fn from(err: UnsupportedPlatform) -> Self {
        Self::UnsupportedPlatform(err.0)
    }
}

impl From<AdapterError> for LookupError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::NotFound(platform) => Self::NotFound(platform),
            AdapterError::Upstream {
                platform,
                message,
                source,
            } => Self::Upstream {
                platform,
                detail: message,
                source,
            },
        }
    }
}

/// Entry point invoked by the HTTP layer: validates input, resolves the
/// adapter, invokes it, and maps failures onto response categories.
///
/// No retries happen here - the adapters' best-effort/fatal split is the
/// only failure absorption in the engine.
pub struct ProfileGateway {
    registry: Arc<AdapterRegistry>,
}

impl ProfileGateway {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self { registry }
    }

    pub async fn lookup(&self, username: &str, platform: &str) -> Result<Profile, LookupError> {
        let username = username.trim();
        let platform_id = platform.trim();
        if username.is_empty() || platform_id.is_empty() {
            return Err(LookupError::InvalidRequest);
        }

        let adapter = self.registry.resolve(platform_id)?;

        let correlation = CorrelationId::new();
        let span = tracing::info_span!(
            "profile_lookup",
            correlation = %correlation.short(),
            platform = adapter.platform().id(),
        );

        async {
            match adapter.fetch_profile(username).await {
                Ok(profile) => {
                    tracing::info!(username, "profile lookup succeeded");
                    Ok(profile)
                }
                Err(error) => {
                    if error.is_not_found() {
                        tracing::info!(username, "profile not found");
                    } else {
                        tracing::error!(username, error = ?error, "profile lookup failed");
                    }
                    Err(error.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}
