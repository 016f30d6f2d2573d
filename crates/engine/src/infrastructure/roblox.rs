//! Roblox platform adapter (public Roblox REST APIs).
//!
//! Roblox spreads profile data across five services. Only the username
//! lookup and the user-details call are fatal; the thumbnail, presence,
//! badge, and friend lookups are independent enrichments that run
//! concurrently and fall back individually.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use gamefindr_domain::{format, Platform, Profile};

use crate::infrastructure::ports::{AdapterError, PlatformAdapter};
use crate::infrastructure::upstream::{best_effort, parse, UpstreamClient};

/// Base URLs for the Roblox services this adapter touches.
#[derive(Debug, Clone)]
pub struct RobloxEndpoints {
    pub users: String,
    pub thumbnails: String,
    pub presence: String,
    pub badges: String,
    pub friends: String,
}

impl Default for RobloxEndpoints {
    fn default() -> Self {
        Self {
            users: "https://users.roblox.com".to_string(),
            thumbnails: "https://thumbnails.roblox.com".to_string(),
            presence: "https://presence.roblox.com".to_string(),
            badges: "https://badges.roblox.com".to_string(),
            friends: "https://friends.roblox.com".to_string(),
        }
    }
}

impl RobloxEndpoints {
    /// Point every service at one base URL (useful for tests).
    pub fn uniform(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            users: base.clone(),
            thumbnails: base.clone(),
            presence: base.clone(),
            badges: base.clone(),
            friends: base,
        }
    }
}

pub struct RobloxAdapter {
    upstream: UpstreamClient,
    endpoints: RobloxEndpoints,
    include_raw_data: bool,
}

impl RobloxAdapter {
    pub fn new(endpoints: RobloxEndpoints, timeout: Duration, include_raw_data: bool) -> Self {
        Self {
            upstream: UpstreamClient::new(Platform::Roblox, timeout),
            endpoints,
            include_raw_data,
        }
    }

    async fn lookup_user_id(&self, username: &str) -> Result<u64, AdapterError> {
        let request = self
            .upstream
            .post(format!("{}/v1/usernames/users", self.endpoints.users))
            .json(&serde_json::json!({
                "usernames": [username],
                "excludeBannedUsers": true,
            }));
        let value = self.upstream.json(request, "username lookup").await?;
        let envelope: UsernameLookupEnvelope = parse(Platform::Roblox, "username lookup", &value)?;

        // An empty match set means the username does not exist.
        envelope
            .data
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or(AdapterError::NotFound(Platform::Roblox))
    }

    async fn user_details(&self, user_id: u64) -> Result<(Value, UserDetails), AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/v1/users/{user_id}", self.endpoints.users));
        let value = self.upstream.json(request, "user details").await?;
        let details: UserDetails = parse(Platform::Roblox, "user details", &value)?;
        Ok((value, details))
    }

    async fn avatar_thumbnail(&self, user_id: u64) -> Result<String, AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/v1/users/avatar", self.endpoints.thumbnails))
            .query(&[
                ("userIds", user_id.to_string().as_str()),
                ("size", "420x420"),
                ("format", "Png"),
            ]);
        let value = self.upstream.json(request, "avatar thumbnail").await?;
        let envelope: ThumbnailEnvelope = parse(Platform::Roblox, "avatar thumbnail", &value)?;
        Ok(envelope
            .data
            .into_iter()
            .next()
            .and_then(|t| t.image_url)
            .unwrap_or_default())
    }

    async fn presence_descriptor(&self, user_id: u64) -> Result<String, AdapterError> {
        let request = self
            .upstream
            .post(format!("{}/v1/presence/users", self.endpoints.presence))
            .json(&serde_json::json!({ "userIds": [user_id] }));
        let value = self.upstream.json(request, "presence").await?;
        let envelope: PresenceEnvelope = parse(Platform::Roblox, "presence", &value)?;
        Ok(envelope
            .user_presences
            .into_iter()
            .next()
            .map(|p| describe_presence(&p))
            .unwrap_or_else(|| "Unknown".to_string()))
    }

    async fn badge_count(&self, user_id: u64) -> Result<u64, AdapterError> {
        let request = self
            .upstream
            .get(format!("{}/v1/users/{user_id}/badges", self.endpoints.badges))
            .query(&[("limit", "10"), ("sortOrder", "Desc")]);
        let value = self.upstream.json(request, "badge count").await?;
        let envelope: BadgesEnvelope = parse(Platform::Roblox, "badge count", &value)?;
        Ok(envelope.total_count.unwrap_or(0))
    }

    async fn friend_count(&self, user_id: u64) -> Result<u64, AdapterError> {
        let request = self.upstream.get(format!(
            "{}/v1/users/{user_id}/friends/count",
            self.endpoints.friends
        ));
        let value = self.upstream.json(request, "friend count").await?;
        let envelope: FriendCountResponse = parse(Platform::Roblox, "friend count", &value)?;
        Ok(envelope.count.unwrap_or(0))
    }
}

#[async_trait]
impl PlatformAdapter for RobloxAdapter {
    fn platform(&self) -> Platform {
        Platform::Roblox
    }

    async fn fetch_profile(&self, identifier: &str) -> Result<Profile, AdapterError> {
        let user_id = self.lookup_user_id(identifier).await?;
        let (details_raw, details) = self.user_details(user_id).await?;

        // Independent enrichments: run concurrently, fail individually.
        let (avatar, last_online, badges, friends) = tokio::join!(
            self.avatar_thumbnail(user_id),
            self.presence_descriptor(user_id),
            self.badge_count(user_id),
            self.friend_count(user_id),
        );
        let avatar = best_effort(Platform::Roblox, "avatar thumbnail", avatar, String::new());
        let last_online = best_effort(
            Platform::Roblox,
            "presence",
            last_online,
            "Unknown".to_string(),
        );
        let badges = best_effort(Platform::Roblox, "badge count", badges, 0);
        let friends = best_effort(Platform::Roblox, "friend count", friends, 0);

        let display_name = details
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| details.name.clone())
            .unwrap_or_else(|| identifier.to_string());

        let mut builder = Profile::builder(Platform::Roblox, identifier)
            .username(details.name.clone().unwrap_or_default())
            .avatar(avatar)
            .last_online(last_online)
            .stat("displayName", display_name)
            .stat("friends", friends)
            .stat("badges", badges)
            .stat(
                "created",
                details
                    .created
                    .as_deref()
                    .map(format::iso_date)
                    .unwrap_or_else(|| "Unknown".to_string()),
            );

        if let Some(bio) = details.description.as_deref().filter(|d| !d.trim().is_empty()) {
            builder = builder.stat("bio", format::truncate(bio, 50));
        }
        if self.include_raw_data {
            builder = builder.raw_data(serde_json::json!({ "roblox": details_raw }));
        }

        Ok(builder.build())
    }
}

fn describe_presence(presence: &UserPresence) -> String {
    match presence.user_presence_type {
        1 => "Online now".to_string(),
        2 => "In Game".to_string(),
        _ => match presence.last_online.as_deref() {
            Some(ts) => format!("Last online: {}", format::iso_datetime(ts)),
            None => "Unknown".to_string(),
        },
    }
}

// =============================================================================
// Upstream payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct UsernameLookupEnvelope {
    #[serde(default)]
    data: Vec<UsernameMatch>,
}

#[derive(Debug, Deserialize)]
struct UsernameMatch {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct UserDetails {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailEnvelope {
    #[serde(default)]
    data: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default, rename = "imageUrl")]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PresenceEnvelope {
    #[serde(default, rename = "userPresences")]
    user_presences: Vec<UserPresence>,
}

#[derive(Debug, Deserialize)]
struct UserPresence {
    #[serde(default, rename = "userPresenceType")]
    user_presence_type: i64,
    #[serde(default, rename = "lastOnline")]
    last_online: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BadgesEnvelope {
    #[serde(default, rename = "totalCount")]
    total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FriendCountResponse {
    #[serde(default)]
    count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use gamefindr_domain::StatValue;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    fn adapter_for(base: &str) -> RobloxAdapter {
        RobloxAdapter::new(
            RobloxEndpoints::uniform(base),
            Duration::from_millis(500),
            false,
        )
    }

    #[test]
    fn presence_types_map_to_descriptors() {
        let online = UserPresence {
            user_presence_type: 1,
            last_online: None,
        };
        assert_eq!(describe_presence(&online), "Online now");

        let in_game = UserPresence {
            user_presence_type: 2,
            last_online: None,
        };
        assert_eq!(describe_presence(&in_game), "In Game");

        let offline = UserPresence {
            user_presence_type: 0,
            last_online: Some("2023-11-14T22:13:20Z".to_string()),
        };
        assert_eq!(
            describe_presence(&offline),
            "Last online: 2023-11-14 22:13:20 UTC"
        );

        let silent = UserPresence {
            user_presence_type: 0,
            last_online: None,
        };
        assert_eq!(describe_presence(&silent), "Unknown");
    }

    #[test]
    fn empty_match_set_parses_to_no_user() {
        let value = serde_json::json!({"data": []});
        let envelope: UsernameLookupEnvelope =
            parse(Platform::Roblox, "username lookup", &value).expect("should parse");
        assert!(envelope.data.is_empty());
    }

    #[tokio::test]
    async fn unknown_username_is_not_found() {
        let base = spawn_stub(Router::new().route(
            "/v1/usernames/users",
            post(|| async { Json(serde_json::json!({"data": []})) }),
        ))
        .await;

        let err = adapter_for(&base)
            .fetch_profile("doesnotexist999")
            .await
            .expect_err("empty match set must be not-found");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Roblox"));
    }

    #[tokio::test]
    async fn enrichment_failures_fall_back_without_failing_the_lookup() {
        // Stub serves only the two primary calls; every enrichment endpoint
        // 404s and must degrade independently.
        let base = spawn_stub(
            Router::new()
                .route(
                    "/v1/usernames/users",
                    post(|| async {
                        Json(serde_json::json!({"data": [{"id": 123, "name": "builderman"}]}))
                    }),
                )
                .route(
                    "/v1/users/123",
                    get(|| async {
                        Json(serde_json::json!({
                            "name": "builderman",
                            "displayName": "Builderman",
                            "description": "",
                            "created": "2006-03-08T00:00:00Z"
                        }))
                    }),
                ),
        )
        .await;

        let profile = adapter_for(&base)
            .fetch_profile("builderman")
            .await
            .expect("enrichment failures must not fail the lookup");

        assert_eq!(profile.username(), "builderman");
        assert_eq!(profile.platform(), "Roblox");
        assert_eq!(profile.stats()["friends"], StatValue::Count(0));
        assert_eq!(profile.stats()["badges"], StatValue::Count(0));
        assert_eq!(profile.avatar(), Platform::Roblox.default_avatar());
        assert_eq!(profile.last_online(), "Unknown");
        assert_eq!(
            profile.stats()["created"],
            StatValue::Text("2006-03-08".to_string())
        );
        // Blank bio is omitted entirely.
        assert!(!profile.stats().contains_key("bio"));
    }

    #[tokio::test]
    async fn healthy_upstreams_produce_a_full_profile() {
        let base = spawn_stub(
            Router::new()
                .route(
                    "/v1/usernames/users",
                    post(|| async {
                        Json(serde_json::json!({"data": [{"id": 7, "name": "noob42"}]}))
                    }),
                )
                .route(
                    "/v1/users/7",
                    get(|| async {
                        Json(serde_json::json!({
                            "name": "noob42",
                            "displayName": "Noob",
                            "description": "I build very large castles out of very small bricks!",
                            "created": "2015-06-01T12:00:00Z"
                        }))
                    }),
                )
                .route(
                    "/v1/users/avatar",
                    get(|| async {
                        Json(serde_json::json!({
                            "data": [{"imageUrl": "https://cdn.example/avatar.png"}]
                        }))
                    }),
                )
                .route(
                    "/v1/presence/users",
                    post(|| async {
                        Json(serde_json::json!({
                            "userPresences": [{"userPresenceType": 2}]
                        }))
                    }),
                )
                .route(
                    "/v1/users/7/badges",
                    get(|| async { Json(serde_json::json!({"totalCount": 250})) }),
                )
                .route(
                    "/v1/users/7/friends/count",
                    get(|| async { Json(serde_json::json!({"count": 17})) }),
                ),
        )
        .await;

        let profile = adapter_for(&base)
            .fetch_profile("noob42")
            .await
            .expect("lookup should succeed");

        assert_eq!(profile.avatar(), "https://cdn.example/avatar.png");
        assert_eq!(profile.last_online(), "In Game");
        assert_eq!(profile.stats()["friends"], StatValue::Count(17));
        assert_eq!(profile.stats()["badges"], StatValue::Count(250));
        assert_eq!(
            profile.stats()["bio"],
            StatValue::Text("I build very large castles out of very small brick...".to_string())
        );
    }
}
