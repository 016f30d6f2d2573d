//! PlayStation Network platform adapter.
//!
//! PSN requires a token exchange before any data call: the long-lived NPSSO
//! token buys an access code (via a 302 redirect), the code buys an access
//! token. Both steps are primary; the trophy and title lookups afterwards
//! are concurrent enrichments.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use gamefindr_domain::{format, Platform, Profile};

use crate::infrastructure::ports::{unconfigured_profile, AdapterError, PlatformAdapter};
use crate::infrastructure::upstream::{best_effort, parse, UpstreamClient};

// Public constants of the PlayStation Android app's OAuth client; the same
// pair every third-party PSN integration uses.
const CLIENT_ID: &str = "09515159-7237-4370-9b40-3806e67c0891";
const CLIENT_SECRET: &str = "ucPjka5tntB2KqsP";
const REDIRECT_URI: &str = "com.scee.psxandroid.scecompcall://redirect";
const SCOPE: &str = "psn:mobile.v2.core psn:clientapp";

pub struct PlayStationAdapter {
    upstream: UpstreamClient,
    auth_base: String,
    data_base: String,
    npsso: Option<String>,
    include_raw_data: bool,
}

impl PlayStationAdapter {
    pub fn new(
        auth_base: &str,
        data_base: &str,
        npsso: Option<String>,
        timeout: Duration,
        include_raw_data: bool,
    ) -> Self {
        Self {
            // The authorize step answers with a redirect we must not follow.
            upstream: UpstreamClient::without_redirects(Platform::Psn, timeout),
            auth_base: auth_base.trim_end_matches('/').to_string(),
            data_base: data_base.trim_end_matches('/').to_string(),
            npsso,
            include_raw_data,
        }
    }

    /// NPSSO -> access code. Sony answers 302 with the code in the redirect
    /// Location; anything else means the NPSSO token is stale.
    async fn exchange_npsso_for_code(&self, npsso: &str) -> Result<String, AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/authorize", self.auth_base))
            .query(&[
                ("access_type", "offline"),
                ("client_id", CLIENT_ID),
                ("redirect_uri", REDIRECT_URI),
                ("response_type", "code"),
                ("scope", SCOPE),
            ])
            .header("Cookie", format!("npsso={npsso}"));
        let response = self.upstream.send(request, "authorization").await?;

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        extract_query_param(location, "code").ok_or_else(|| {
            AdapterError::upstream(
                Platform::Psn,
                "authorization did not yield an access code (NPSSO token may be expired)",
            )
        })
    }

    /// Access code -> access token.
    async fn exchange_code_for_token(&self, code: &str) -> Result<String, AdapterError> {
        let request = self
            .upstream
            .post(format!("{}/token", self.auth_base))
            .basic_auth(CLIENT_ID, Some(CLIENT_SECRET))
            .form(&[
                ("code", code),
                ("redirect_uri", REDIRECT_URI),
                ("grant_type", "authorization_code"),
                ("token_format", "jwt"),
            ]);
        let value = self.upstream.json(request, "token exchange").await?;
        let token: TokenResponse = parse(Platform::Psn, "token exchange", &value)?;
        Ok(token.access_token)
    }

    async fn user_profile(
        &self,
        token: &str,
        username: &str,
    ) -> Result<(Value, PsnProfile), AdapterError> {
        let request = self
            .upstream
            .get(format!(
                "{}/userProfile/v1/users/{}/profile2",
                self.data_base,
                urlencoding::encode(username)
            ))
            .bearer_auth(token);
        let value = self.upstream.json(request, "profile lookup").await?;
        let envelope: ProfileEnvelope = parse(Platform::Psn, "profile lookup", &value)?;
        Ok((value, envelope.profile))
    }

    async fn user_trophies(
        &self,
        token: &str,
        account_id: &str,
    ) -> Result<(Value, Vec<Trophy>), AdapterError> {
        let request = self
            .upstream
            .get(format!(
                "{}/trophy/v1/users/{account_id}/trophies",
                self.data_base
            ))
            .bearer_auth(token);
        let value = self.upstream.json(request, "trophy summary").await?;
        let envelope: TrophiesEnvelope = parse(Platform::Psn, "trophy summary", &value)?;
        Ok((value, envelope.trophies))
    }

    async fn user_titles(
        &self,
        token: &str,
        account_id: &str,
    ) -> Result<(Value, Vec<Value>), AdapterError> {
        let request = self
            .upstream
            .get(format!(
                "{}/gamelist/v2/users/{account_id}/titles",
                self.data_base
            ))
            .bearer_auth(token);
        let value = self.upstream.json(request, "recent titles").await?;
        let envelope: TitlesEnvelope = parse(Platform::Psn, "recent titles", &value)?;
        Ok((value, envelope.titles))
    }
}

#[async_trait]
impl PlatformAdapter for PlayStationAdapter {
    fn platform(&self) -> Platform {
        Platform::Psn
    }

    async fn fetch_profile(&self, identifier: &str) -> Result<Profile, AdapterError> {
        let Some(npsso) = self.npsso.clone() else {
            return Ok(unconfigured_profile(Platform::Psn, identifier));
        };

        let code = self.exchange_npsso_for_code(&npsso).await?;
        let token = self.exchange_code_for_token(&code).await?;

        let (profile_raw, psn_profile) = self.user_profile(&token, identifier).await?;

        // Trophy/title enrichment needs the account id; skip cleanly if the
        // profile omitted one.
        let (trophies, titles) = match psn_profile.account_id.as_deref() {
            Some(account_id) => {
                let (trophies, titles) = tokio::join!(
                    self.user_trophies(&token, account_id),
                    self.user_titles(&token, account_id),
                );
                (
                    best_effort(Platform::Psn, "trophy summary", trophies.map(Some), None),
                    best_effort(Platform::Psn, "recent titles", titles.map(Some), None),
                )
            }
            None => (None, None),
        };

        let mut builder = Profile::builder(Platform::Psn, identifier)
            .username(psn_profile.online_id.clone().unwrap_or_default())
            .avatar(
                psn_profile
                    .avatar_urls
                    .first()
                    .and_then(|a| a.avatar_url.clone())
                    .unwrap_or_default(),
            )
            .last_online(
                psn_profile
                    .last_online_date
                    .as_deref()
                    .map(format::iso_datetime)
                    .unwrap_or_else(|| "Unknown".to_string()),
            )
            .stat(
                "about",
                psn_profile
                    .about_me
                    .clone()
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| "No information provided".to_string()),
            )
            .stat(
                "trophyLevel",
                format::count_or_na(psn_profile.trophy_summary.as_ref().and_then(|t| t.level)),
            );

        if let Some((_, trophies)) = &trophies {
            for grade in ["platinum", "gold", "silver", "bronze"] {
                builder = builder.stat(
                    grade,
                    format::count_or_na(Some(count_trophy_grade(trophies, grade))),
                );
            }
        }
        if let Some((_, titles)) = &titles {
            builder = builder.stat("recentlyPlayed", format::count_or_na(Some(titles.len() as u64)));
        }

        if self.include_raw_data {
            let trophies_raw = trophies.map(|(raw, _)| raw).unwrap_or(Value::Null);
            let titles_raw = titles.map(|(raw, _)| raw).unwrap_or(Value::Null);
            builder = builder.raw_data(serde_json::json!({
                "profile": profile_raw,
                "trophies": trophies_raw,
                "titles": titles_raw,
            }));
        }

        Ok(builder.build())
    }
}

fn count_trophy_grade(trophies: &[Trophy], grade: &str) -> u64 {
    trophies
        .iter()
        .filter(|t| t.trophy_type.as_deref() == Some(grade))
        .count() as u64
}

/// Pull one query parameter out of a redirect location without a full URL
/// parser (the redirect URI is a non-standard app scheme).
fn extract_query_param(location: &str, name: &str) -> Option<String> {
    let (_, query) = location.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

// =============================================================================
// Upstream payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    profile: PsnProfile,
}

#[derive(Debug, Deserialize)]
struct PsnProfile {
    #[serde(default, rename = "onlineId")]
    online_id: Option<String>,
    #[serde(default, rename = "accountId")]
    account_id: Option<String>,
    #[serde(default, rename = "avatarUrls")]
    avatar_urls: Vec<AvatarUrl>,
    #[serde(default, rename = "aboutMe")]
    about_me: Option<String>,
    #[serde(default, rename = "lastOnlineDate")]
    last_online_date: Option<String>,
    #[serde(default, rename = "trophySummary")]
    trophy_summary: Option<TrophySummary>,
}

#[derive(Debug, Deserialize)]
struct AvatarUrl {
    #[serde(default, rename = "avatarUrl")]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrophySummary {
    #[serde(default)]
    level: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TrophiesEnvelope {
    #[serde(default)]
    trophies: Vec<Trophy>,
}

#[derive(Debug, Deserialize)]
struct Trophy {
    #[serde(default, rename = "trophyType")]
    trophy_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitlesEnvelope {
    #[serde(default)]
    titles: Vec<Value>,
}
