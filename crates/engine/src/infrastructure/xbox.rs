//! Xbox platform adapter (OpenXBL).
//!
//! Gamertags resolve directly; the profile call is the primary and the
//! friends-stats call is enrichment.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use gamefindr_domain::{format, Platform, Profile};

use crate::infrastructure::ports::{unconfigured_profile, AdapterError, PlatformAdapter};
use crate::infrastructure::upstream::{best_effort, parse, UpstreamClient};

pub struct XboxAdapter {
    upstream: UpstreamClient,
    base_url: String,
    api_key: Option<String>,
    include_raw_data: bool,
}

impl XboxAdapter {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        include_raw_data: bool,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(Platform::Xbox, timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            include_raw_data,
        }
    }

    async fn account_profile(
        &self,
        api_key: &str,
        gamertag: &str,
    ) -> Result<(Value, ProfileUser), AdapterError> {
        let request = self
            .upstream
            .get(format!(
                "{}/api/v2/account/profile/gamertag/{}",
                self.base_url,
                urlencoding::encode(gamertag)
            ))
            .header("X-Authorization", api_key)
            .header("Content-Type", "application/json");
        let value = self.upstream.json(request, "account profile").await?;
        let envelope: ProfileEnvelope = parse(Platform::Xbox, "account profile", &value)?;

        let user = envelope
            .profile_users
            .into_iter()
            .next()
            .ok_or(AdapterError::NotFound(Platform::Xbox))?;
        Ok((value, user))
    }

    async fn friend_stats(
        &self,
        api_key: &str,
        gamertag: &str,
    ) -> Result<(Value, FriendStats), AdapterError> {
        let request = self
            .upstream
            .get(format!(
                "{}/api/v2/friends/stats/{}",
                self.base_url,
                urlencoding::encode(gamertag)
            ))
            .header("X-Authorization", api_key)
            .header("Content-Type", "application/json");
        let value = self.upstream.json(request, "friend stats").await?;
        let stats: FriendStats = parse(Platform::Xbox, "friend stats", &value)?;
        Ok((value, stats))
    }
}

#[async_trait]
impl PlatformAdapter for XboxAdapter {
    fn platform(&self) -> Platform {
        Platform::Xbox
    }

    async fn fetch_profile(&self, identifier: &str) -> Result<Profile, AdapterError> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(unconfigured_profile(Platform::Xbox, identifier));
        };

        let (account_raw, account) = self.account_profile(&api_key, identifier).await?;

        let (stats_raw, stats) = best_effort(
            Platform::Xbox,
            "friend stats",
            self.friend_stats(&api_key, identifier).await,
            (Value::Null, FriendStats::default()),
        );

        let mut builder = Profile::builder(Platform::Xbox, identifier)
            .username(account.gamertag.clone().unwrap_or_default())
            .avatar(
                account
                    .display_pic_raw
                    .clone()
                    .or(account.gamerpic.clone())
                    .unwrap_or_default(),
            )
            .last_online(describe_presence(
                account.presence_state.as_deref(),
                account.last_seen.as_deref(),
            ))
            .stat("gamerscore", format::count_or_na(account.gamer_score))
            .stat("tenure", format::text_or_na(account.xbox_one_rep.as_deref()))
            .stat(
                "status",
                account
                    .presence_text
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "Offline".to_string()),
            )
            .stat_opt("location", account.location.clone())
            .stat_opt(
                "achievements",
                stats.achievements.map(|n| format::count_or_na(Some(n))),
            )
            .stat_opt(
                "followers",
                stats.followers_count.map(|n| format::count_or_na(Some(n))),
            );

        if self.include_raw_data {
            builder = builder.raw_data(serde_json::json!({
                "account": account_raw,
                "stats": stats_raw,
            }));
        }

        Ok(builder.build())
    }
}

fn describe_presence(presence_state: Option<&str>, last_seen: Option<&str>) -> String {
    if presence_state == Some("Online") {
        return "Online now".to_string();
    }
    match last_seen {
        Some(ts) => format!("Last online: {}", format::iso_datetime(ts)),
        None => "Unknown".to_string(),
    }
}

// =============================================================================
// Upstream payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    #[serde(default, rename = "profileUsers")]
    profile_users: Vec<ProfileUser>,
}

#[derive(Debug, Deserialize)]
struct ProfileUser {
    #[serde(default)]
    gamertag: Option<String>,
    #[serde(default, rename = "displayPicRaw")]
    display_pic_raw: Option<String>,
    #[serde(default)]
    gamerpic: Option<String>,
    #[serde(default, rename = "presenceState")]
    presence_state: Option<String>,
    #[serde(default, rename = "presenceText")]
    presence_text: Option<String>,
    #[serde(default, rename = "lastSeen")]
    last_seen: Option<String>,
    #[serde(default, rename = "gamerScore")]
    gamer_score: Option<u64>,
    #[serde(default, rename = "xboxOneRep")]
    xbox_one_rep: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FriendStats {
    #[serde(default)]
    achievements: Option<u64>,
    #[serde(default, rename = "followersCount")]
    followers_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamefindr_domain::StatValue;

    #[tokio::test]
    async fn missing_api_key_degrades_to_informational_profile() {
        let adapter = XboxAdapter::new(
            "http://127.0.0.1:9",
            None,
            Duration::from_millis(100),
            false,
        );
        let profile = adapter
            .fetch_profile("Major Nelson")
            .await
            .expect("keyless lookups never fail");
        assert_eq!(profile.username(), "Major Nelson");
        assert_eq!(profile.platform(), "Xbox");
        assert!(profile.stats().contains_key("note"));
    }

    #[test]
    fn presence_descriptor_prefers_online_state() {
        assert_eq!(describe_presence(Some("Online"), None), "Online now");
        assert_eq!(
            describe_presence(Some("Offline"), Some("2023-11-14T22:13:20Z")),
            "Last online: 2023-11-14 22:13:20 UTC"
        );
        assert_eq!(describe_presence(None, None), "Unknown");
    }

    #[test]
    fn empty_profile_users_parses_to_no_account() {
        let value = serde_json::json!({"profileUsers": []});
        let envelope: ProfileEnvelope =
            parse(Platform::Xbox, "account profile", &value).expect("should parse");
        assert!(envelope.profile_users.is_empty());
    }

    #[test]
    fn account_payload_parses_and_formats() {
        let value = serde_json::json!({
            "profileUsers": [{
                "gamertag": "Major Nelson",
                "displayPicRaw": "https://images.example/pic.png",
                "presenceState": "Online",
                "gamerScore": 1234567,
                "xboxOneRep": "GoodPlayer",
                "location": "Seattle"
            }]
        });
        let envelope: ProfileEnvelope =
            parse(Platform::Xbox, "account profile", &value).expect("should parse");
        let user = &envelope.profile_users[0];
        assert_eq!(user.gamertag.as_deref(), Some("Major Nelson"));
        assert_eq!(
            format::count_or_na(user.gamer_score),
            StatValue::Text("1,234,567".to_string())
        );
    }
}
