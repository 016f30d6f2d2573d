//! Shared upstream HTTP plumbing for platform adapters.
//!
//! Adapters differ in endpoints and payload shapes, not in transport
//! handling: every primary call wraps failures the same way (404 means the
//! identifier does not exist, anything else broken is an upstream failure),
//! and every enrichment call degrades to a fallback instead of failing the
//! lookup.

use std::time::Duration;

use reqwest::{Client, IntoUrl, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use gamefindr_domain::Platform;

use crate::infrastructure::ports::AdapterError;

/// One platform's HTTP client with a per-call timeout.
pub(crate) struct UpstreamClient {
    client: Client,
    platform: Platform,
}

impl UpstreamClient {
    pub fn new(platform: Platform, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, platform }
    }

    /// Client that does not follow redirects. PlayStation's authorize step
    /// answers with a 302 whose Location header carries the access code.
    pub fn without_redirects(platform: Platform, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, platform }
    }

    pub fn get(&self, url: impl IntoUrl) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: impl IntoUrl) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a prepared request and read the JSON body.
    ///
    /// 404 maps to `NotFound`; other non-2xx statuses and malformed bodies
    /// map to `Upstream` with `call` naming the failed operation.
    pub async fn json(&self, request: RequestBuilder, call: &'static str) -> Result<Value, AdapterError> {
        let response = self.send(request, call).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(self.platform));
        }
        if !response.status().is_success() {
            return Err(AdapterError::upstream(
                self.platform,
                format!("{call} returned HTTP {}", response.status()),
            ));
        }
        response.json().await.map_err(|e| {
            AdapterError::upstream_with_source(
                self.platform,
                format!("{call} returned a malformed body"),
                e,
            )
        })
    }

    /// Send a prepared request, wrapping transport failures only. Status
    /// handling stays with the caller.
    pub async fn send(
        &self,
        request: RequestBuilder,
        call: &'static str,
    ) -> Result<Response, AdapterError> {
        request.send().await.map_err(|e| {
            AdapterError::upstream_with_source(self.platform, format!("{call} call failed"), e)
        })
    }
}

/// Extract a typed view from an upstream payload, keeping the raw value
/// available for diagnostics.
pub(crate) fn parse<T: DeserializeOwned>(
    platform: Platform,
    call: &'static str,
    value: &Value,
) -> Result<T, AdapterError> {
    serde_json::from_value(value.clone()).map_err(|e| {
        AdapterError::upstream_with_source(
            platform,
            format!("{call} returned an unexpected shape"),
            e,
        )
    })
}

/// Resolve a best-effort enrichment call: failures are logged and replaced
/// with `fallback`, never escalated.
pub(crate) fn best_effort<T>(
    platform: Platform,
    call: &'static str,
    result: Result<T, AdapterError>,
    fallback: T,
) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                platform = platform.id(),
                call,
                error = %error,
                "enrichment call failed, continuing with fallback"
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        count: u32,
    }

    #[test]
    fn parse_reports_unexpected_shapes() {
        let ok = serde_json::json!({"count": 3});
        assert_eq!(
            parse::<Sample>(Platform::Steam, "sample", &ok).expect("should parse"),
            Sample { count: 3 }
        );

        let bad = serde_json::json!({"count": "three"});
        let err = parse::<Sample>(Platform::Steam, "sample", &bad).expect_err("should fail");
        assert!(err.to_string().contains("unexpected shape"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn best_effort_swallows_failures() {
        let value = best_effort(
            Platform::Roblox,
            "friend count",
            Err::<u64, _>(AdapterError::upstream(Platform::Roblox, "boom")),
            0,
        );
        assert_eq!(value, 0);

        let value = best_effort(Platform::Roblox, "friend count", Ok(17u64), 0);
        assert_eq!(value, 17);
    }
}
