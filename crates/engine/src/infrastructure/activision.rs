//! Activision platform adapter (Tracker Network Warzone API).
//!
//! One primary call: the Warzone profile for the `acti` platform. Tracker
//! answers 404 (or an empty data block) for unknown Activision IDs.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use gamefindr_domain::{format, Platform, Profile};

use crate::infrastructure::ports::{unconfigured_profile, AdapterError, PlatformAdapter};
use crate::infrastructure::upstream::{parse, UpstreamClient};

pub struct ActivisionAdapter {
    upstream: UpstreamClient,
    base_url: String,
    api_key: Option<String>,
    include_raw_data: bool,
}

impl ActivisionAdapter {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        include_raw_data: bool,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(Platform::Activision, timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            include_raw_data,
        }
    }

    async fn warzone_profile(
        &self,
        api_key: &str,
        username: &str,
    ) -> Result<(Value, WarzoneProfile), AdapterError> {
        // Activision IDs carry '#' discriminators and must be encoded.
        let request = self
            .upstream
            .get(format!(
                "{}/v2/warzone/standard/profile/acti/{}",
                self.base_url,
                urlencoding::encode(username)
            ))
            .header("TRN-Api-Key", api_key);
        let value = self.upstream.json(request, "warzone profile").await?;
        let envelope: WarzoneEnvelope = parse(Platform::Activision, "warzone profile", &value)?;
        let profile = envelope
            .data
            .ok_or(AdapterError::NotFound(Platform::Activision))?;
        Ok((value, profile))
    }
}

#[async_trait]
impl PlatformAdapter for ActivisionAdapter {
    fn platform(&self) -> Platform {
        Platform::Activision
    }

    async fn fetch_profile(&self, identifier: &str) -> Result<Profile, AdapterError> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(unconfigured_profile(Platform::Activision, identifier));
        };

        let (profile_raw, warzone) = self.warzone_profile(&api_key, identifier).await?;
        let stats = warzone
            .segments
            .first()
            .and_then(|segment| segment.stats.as_ref());

        let stat_value = |pick: fn(&SegmentStats) -> Option<&StatField>| {
            stats.and_then(pick).and_then(|f| f.value)
        };

        let mut builder = Profile::builder(Platform::Activision, identifier)
            .username(
                warzone
                    .platform_info
                    .as_ref()
                    .and_then(|p| p.platform_user_handle.clone())
                    .unwrap_or_default(),
            )
            .avatar(
                warzone
                    .platform_info
                    .as_ref()
                    .and_then(|p| p.avatar_url.clone())
                    .unwrap_or_default(),
            )
            .last_online("Not available via API")
            .stat(
                "level",
                format::decimal_or_na(stat_value(|s| s.level.as_ref()), 0, ""),
            )
            .stat(
                "kd",
                format::decimal_or_na(stat_value(|s| s.kd_ratio.as_ref()), 2, ""),
            )
            .stat(
                "wins",
                format::decimal_or_na(stat_value(|s| s.wins.as_ref()), 0, ""),
            )
            .stat(
                "kills",
                format::decimal_or_na(stat_value(|s| s.kills.as_ref()), 0, ""),
            )
            .stat(
                "deaths",
                format::decimal_or_na(stat_value(|s| s.deaths.as_ref()), 0, ""),
            )
            .stat(
                "gamesPlayed",
                format::decimal_or_na(stat_value(|s| s.games_played.as_ref()), 0, ""),
            )
            .stat(
                "winRate",
                format::decimal_or_na(stat_value(|s| s.wl_ratio.as_ref()), 2, "%"),
            );

        if self.include_raw_data {
            builder = builder.raw_data(serde_json::json!({ "warzone": profile_raw }));
        }

        Ok(builder.build())
    }
}

// =============================================================================
// Upstream payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct WarzoneEnvelope {
    #[serde(default)]
    data: Option<WarzoneProfile>,
}

#[derive(Debug, Default, Deserialize)]
struct WarzoneProfile {
    #[serde(default, rename = "platformInfo")]
    platform_info: Option<PlatformInfo>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct PlatformInfo {
    #[serde(default, rename = "platformUserHandle")]
    platform_user_handle: Option<String>,
    #[serde(default, rename = "avatarUrl")]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    stats: Option<SegmentStats>,
}

#[derive(Debug, Deserialize)]
struct SegmentStats {
    #[serde(default)]
    level: Option<StatField>,
    #[serde(default, rename = "kdRatio")]
    kd_ratio: Option<StatField>,
    #[serde(default)]
    wins: Option<StatField>,
    #[serde(default)]
    kills: Option<StatField>,
    #[serde(default)]
    deaths: Option<StatField>,
    #[serde(default, rename = "gamesPlayed")]
    games_played: Option<StatField>,
    #[serde(default, rename = "wlRatio")]
    wl_ratio: Option<StatField>,
}

#[derive(Debug, Deserialize)]
struct StatField {
    #[serde(default)]
    value: Option<f64>,
}
