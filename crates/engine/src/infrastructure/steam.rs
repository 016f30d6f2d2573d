//! Steam platform adapter (Steam Web API).
//!
//! Steam identifiers come in two forms: a numeric SteamID64, usable
//! directly, or a vanity name that must be resolved to one first. The
//! owned-games call is enrichment and never fails the lookup.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use gamefindr_domain::{format, Platform, Profile};

use crate::infrastructure::ports::{unconfigured_profile, AdapterError, PlatformAdapter};
use crate::infrastructure::upstream::{best_effort, parse, UpstreamClient};

pub struct SteamAdapter {
    upstream: UpstreamClient,
    base_url: String,
    api_key: Option<String>,
    include_raw_data: bool,
}

impl SteamAdapter {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        include_raw_data: bool,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(Platform::Steam, timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            include_raw_data,
        }
    }

    /// SteamID64s are purely numeric; anything else is a vanity name.
    fn is_steam_id64(identifier: &str) -> bool {
        !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
    }

    async fn resolve_vanity(&self, api_key: &str, vanity: &str) -> Result<String, AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/ISteamUser/ResolveVanityURL/v0001/", self.base_url))
            .query(&[("key", api_key), ("vanityurl", vanity)]);
        let value = self.upstream.json(request, "vanity URL resolution").await?;
        let envelope: VanityEnvelope = parse(Platform::Steam, "vanity URL resolution", &value)?;

        if envelope.response.success != 1 {
            return Err(AdapterError::NotFound(Platform::Steam));
        }
        envelope.response.steamid.ok_or_else(|| {
            AdapterError::upstream(Platform::Steam, "vanity URL resolution omitted the steamid")
        })
    }

    async fn player_summary(
        &self,
        api_key: &str,
        steam_id: &str,
    ) -> Result<(Value, PlayerSummary), AdapterError> {
        let request = self
            .upstream
            .get(format!(
                "{}/ISteamUser/GetPlayerSummaries/v0002/",
                self.base_url
            ))
            .query(&[("key", api_key), ("steamids", steam_id)]);
        let value = self.upstream.json(request, "player summaries").await?;
        let envelope: SummariesEnvelope = parse(Platform::Steam, "player summaries", &value)?;

        // No players entry means the id does not exist, not a transport error.
        let player = envelope
            .response
            .players
            .into_iter()
            .next()
            .ok_or(AdapterError::NotFound(Platform::Steam))?;
        Ok((value, player))
    }

    async fn owned_games(
        &self,
        api_key: &str,
        steam_id: &str,
    ) -> Result<(Value, OwnedGames), AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/IPlayerService/GetOwnedGames/v0001/", self.base_url))
            .query(&[
                ("key", api_key),
                ("steamid", steam_id),
                ("format", "json"),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
            ]);
        let value = self.upstream.json(request, "owned games").await?;
        let envelope: OwnedGamesEnvelope = parse(Platform::Steam, "owned games", &value)?;
        Ok((value, envelope.response))
    }
}

#[async_trait]
impl PlatformAdapter for SteamAdapter {
    fn platform(&self) -> Platform {
        Platform::Steam
    }

    async fn fetch_profile(&self, identifier: &str) -> Result<Profile, AdapterError> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(unconfigured_profile(Platform::Steam, identifier));
        };

        let steam_id = if Self::is_steam_id64(identifier) {
            identifier.to_string()
        } else {
            self.resolve_vanity(&api_key, identifier).await?
        };

        let (summary_raw, player) = self.player_summary(&api_key, &steam_id).await?;

        let (games_raw, games) = best_effort(
            Platform::Steam,
            "owned games",
            self.owned_games(&api_key, &steam_id).await,
            (Value::Null, OwnedGames::default()),
        );

        let mut builder = Profile::builder(Platform::Steam, identifier)
            .username(player.personaname.unwrap_or_default())
            .avatar(player.avatarfull.unwrap_or_default())
            .last_online(
                player
                    .lastlogoff
                    .map(format::unix_timestamp)
                    .unwrap_or_else(|| "Unknown".to_string()),
            )
            .stat("status", persona_status(player.personastate.unwrap_or(0)))
            .stat("games", games.game_count);

        if let Some(most_played) = most_played_game(&games.games) {
            builder = builder.stat("Most Played", most_played);
        }
        if let Some(created) = player.timecreated {
            builder = builder.stat("Account Age", format::age_from_timestamp(created, Utc::now()));
        }
        if self.include_raw_data {
            builder = builder.raw_data(serde_json::json!({
                "steam": summary_raw,
                "games": games_raw,
            }));
        }

        Ok(builder.build())
    }
}

fn persona_status(state: i64) -> &'static str {
    match state {
        0 => "Offline",
        1 => "Online",
        2 => "Busy",
        3 => "Away",
        4 => "Snooze",
        5 => "Looking to Trade",
        6 => "Looking to Play",
        _ => "Unknown",
    }
}

/// Highest-playtime game rendered as "Name (N hours)". Playtime is reported
/// in minutes; zero playtime across the library yields nothing.
fn most_played_game(games: &[OwnedGame]) -> Option<String> {
    let best = games.iter().max_by_key(|g| g.playtime_forever)?;
    if best.playtime_forever == 0 {
        return None;
    }
    let hours = (best.playtime_forever as f64 / 60.0).round() as u64;
    Some(format!("{} ({} hours)", best.name, hours))
}

// =============================================================================
// Upstream payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct VanityEnvelope {
    response: VanityResolution,
}

#[derive(Debug, Deserialize)]
struct VanityResolution {
    #[serde(default)]
    success: i64,
    #[serde(default)]
    steamid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummariesEnvelope {
    response: SummariesResponse,
}

#[derive(Debug, Default, Deserialize)]
struct SummariesResponse {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummary {
    #[serde(default)]
    personaname: Option<String>,
    #[serde(default)]
    avatarfull: Option<String>,
    #[serde(default)]
    lastlogoff: Option<i64>,
    #[serde(default)]
    personastate: Option<i64>,
    #[serde(default)]
    timecreated: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwnedGamesEnvelope {
    #[serde(default)]
    response: OwnedGames,
}

#[derive(Debug, Default, Deserialize)]
struct OwnedGames {
    #[serde(default)]
    game_count: u64,
    #[serde(default)]
    games: Vec<OwnedGame>,
}

#[derive(Debug, Deserialize)]
struct OwnedGame {
    #[serde(default)]
    name: String,
    #[serde(default)]
    playtime_forever: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unroutable endpoint: any request against it fails fast, which lets
    /// tests observe *which* call an adapter attempted first.
    const DEAD_ENDPOINT: &str = "http://127.0.0.1:9";

    fn adapter_with_key(base_url: &str) -> SteamAdapter {
        SteamAdapter::new(
            base_url,
            Some("test-key".to_string()),
            Duration::from_millis(500),
            false,
        )
    }

    #[test]
    fn numeric_identifiers_are_steam_ids() {
        assert!(SteamAdapter::is_steam_id64("12345678901234567"));
        assert!(SteamAdapter::is_steam_id64("76561197960287930"));
        assert!(!SteamAdapter::is_steam_id64("gaben"));
        assert!(!SteamAdapter::is_steam_id64("123abc"));
        assert!(!SteamAdapter::is_steam_id64(""));
    }

    #[test]
    fn persona_states_map_to_readable_statuses() {
        assert_eq!(persona_status(0), "Offline");
        assert_eq!(persona_status(1), "Online");
        assert_eq!(persona_status(5), "Looking to Trade");
        assert_eq!(persona_status(6), "Looking to Play");
        assert_eq!(persona_status(42), "Unknown");
    }

    #[test]
    fn most_played_picks_highest_playtime_in_hours() {
        let games = vec![
            OwnedGame {
                name: "Half-Life".to_string(),
                playtime_forever: 90,
            },
            OwnedGame {
                name: "Dota 2".to_string(),
                playtime_forever: 6000,
            },
        ];
        assert_eq!(
            most_played_game(&games),
            Some("Dota 2 (100 hours)".to_string())
        );
        assert_eq!(most_played_game(&[]), None);

        let unplayed = vec![OwnedGame {
            name: "Backlog".to_string(),
            playtime_forever: 0,
        }];
        assert_eq!(most_played_game(&unplayed), None);
    }

    #[test]
    fn parses_player_summary_payload() {
        let value = serde_json::json!({
            "response": {
                "players": [{
                    "personaname": "gaben",
                    "avatarfull": "https://avatars.example/full.jpg",
                    "lastlogoff": 1700000000,
                    "personastate": 1,
                    "timecreated": 1063407600
                }]
            }
        });
        let envelope: SummariesEnvelope =
            parse(Platform::Steam, "player summaries", &value).expect("should parse");
        let player = &envelope.response.players[0];
        assert_eq!(player.personaname.as_deref(), Some("gaben"));
        assert_eq!(player.personastate, Some(1));
    }

    #[test]
    fn vanity_resolution_failure_shape_parses() {
        let value = serde_json::json!({"response": {"success": 42, "message": "No match"}});
        let envelope: VanityEnvelope =
            parse(Platform::Steam, "vanity URL resolution", &value).expect("should parse");
        assert_ne!(envelope.response.success, 1);
        assert!(envelope.response.steamid.is_none());
    }

    #[tokio::test]
    async fn missing_api_key_degrades_to_informational_profile() {
        let adapter = SteamAdapter::new(
            DEAD_ENDPOINT,
            None,
            Duration::from_millis(100),
            false,
        );
        let profile = adapter
            .fetch_profile("12345678901234567")
            .await
            .expect("keyless lookups never fail");
        assert_eq!(profile.username(), "12345678901234567");
        assert_eq!(profile.platform(), "Steam");
        assert!(profile.stats().contains_key("note"));
    }

    #[tokio::test]
    async fn numeric_identifier_skips_vanity_resolution() {
        let adapter = adapter_with_key(DEAD_ENDPOINT);
        let err = adapter
            .fetch_profile("12345678901234567")
            .await
            .expect_err("dead endpoint must fail");
        // The first (and failing) call is the summary lookup, proving the
        // resolution step was never attempted for a numeric id.
        assert!(err.to_string().contains("player summaries"), "{err}");
    }

    #[tokio::test]
    async fn vanity_identifier_resolves_first() {
        let adapter = adapter_with_key(DEAD_ENDPOINT);
        let err = adapter
            .fetch_profile("gaben")
            .await
            .expect_err("dead endpoint must fail");
        assert!(err.to_string().contains("vanity URL resolution"), "{err}");
    }
}
