//! Epic Games platform adapter (Fortnite-API.com).
//!
//! The stats-by-name call doubles as identifier resolution: its account
//! block is the primary data. The follow-up stats-by-account-id call is
//! enrichment only.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use gamefindr_domain::{format, Platform, Profile};

use crate::infrastructure::ports::{unconfigured_profile, AdapterError, PlatformAdapter};
use crate::infrastructure::upstream::{best_effort, parse, UpstreamClient};

pub struct EpicAdapter {
    upstream: UpstreamClient,
    base_url: String,
    api_key: Option<String>,
    include_raw_data: bool,
}

impl EpicAdapter {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        include_raw_data: bool,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(Platform::Epic, timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            include_raw_data,
        }
    }

    async fn stats_by_name(
        &self,
        api_key: &str,
        username: &str,
    ) -> Result<(Value, BrStats), AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/v2/stats/br/v2", self.base_url))
            .query(&[("name", username)])
            .header("Authorization", api_key);
        let value = self.upstream.json(request, "account lookup").await?;
        let envelope: StatsEnvelope = parse(Platform::Epic, "account lookup", &value)?;
        let stats = envelope
            .data
            .ok_or(AdapterError::NotFound(Platform::Epic))?;
        Ok((value, stats))
    }

    async fn stats_by_account_id(
        &self,
        api_key: &str,
        account_id: &str,
    ) -> Result<(Value, BrStats), AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/v2/stats/br/v2/{account_id}", self.base_url))
            .header("Authorization", api_key);
        let value = self.upstream.json(request, "player stats").await?;
        let envelope: StatsEnvelope = parse(Platform::Epic, "player stats", &value)?;
        Ok((value, envelope.data.unwrap_or_default()))
    }
}

#[async_trait]
impl PlatformAdapter for EpicAdapter {
    fn platform(&self) -> Platform {
        Platform::Epic
    }

    async fn fetch_profile(&self, identifier: &str) -> Result<Profile, AdapterError> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(unconfigured_profile(Platform::Epic, identifier));
        };

        let (account_raw, account_stats) = self.stats_by_name(&api_key, identifier).await?;
        let account = account_stats
            .account
            .as_ref()
            .ok_or(AdapterError::NotFound(Platform::Epic))?;

        let (stats_raw, stats) = best_effort(
            Platform::Epic,
            "player stats",
            self.stats_by_account_id(&api_key, &account.id).await,
            (Value::Null, BrStats::default()),
        );
        let overall = stats
            .stats
            .as_ref()
            .and_then(|s| s.all.as_ref())
            .and_then(|a| a.overall.as_ref());

        let mut builder = Profile::builder(Platform::Epic, identifier)
            .username(account.name.clone().unwrap_or_default())
            .last_online("Not available via API")
            .stat(
                "account",
                format::text_or_na(account.name.as_deref()),
            )
            .stat(
                "level",
                format::count_or_na(stats.battle_pass.as_ref().and_then(|b| b.level)),
            )
            .stat(
                "wins",
                format::count_or_na(overall.and_then(|o| o.wins)),
            )
            .stat(
                "matches",
                format::count_or_na(overall.and_then(|o| o.matches)),
            )
            .stat(
                "winRate",
                format::decimal_or_na(overall.and_then(|o| o.win_rate), 2, "%"),
            )
            .stat("kd", format::decimal_or_na(overall.and_then(|o| o.kd), 2, ""));

        if self.include_raw_data {
            builder = builder.raw_data(serde_json::json!({
                "account": account_raw,
                "stats": stats_raw,
            }));
        }

        Ok(builder.build())
    }
}

// =============================================================================
// Upstream payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    #[serde(default)]
    data: Option<BrStats>,
}

#[derive(Debug, Default, Deserialize)]
struct BrStats {
    #[serde(default)]
    account: Option<Account>,
    #[serde(default, rename = "battlePass")]
    battle_pass: Option<BattlePass>,
    #[serde(default)]
    stats: Option<StatsByInput>,
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BattlePass {
    #[serde(default)]
    level: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct StatsByInput {
    #[serde(default)]
    all: Option<StatsByMode>,
}

#[derive(Debug, Deserialize)]
struct StatsByMode {
    #[serde(default)]
    overall: Option<OverallStats>,
}

#[derive(Debug, Deserialize)]
struct OverallStats {
    #[serde(default)]
    wins: Option<u64>,
    #[serde(default)]
    matches: Option<u64>,
    #[serde(default, rename = "winRate")]
    win_rate: Option<f64>,
    #[serde(default)]
    kd: Option<f64>,
}
