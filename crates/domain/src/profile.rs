//! The normalized profile record returned for any successful lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// A single pre-formatted stat value.
///
/// Values are display-ready: the caller renders them verbatim. Counts stay
/// numeric on the wire, everything else is text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(u64),
    Text(String),
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        StatValue::Count(value)
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        StatValue::Text(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Text(value.to_string())
    }
}

impl std::fmt::Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

/// The normalized output of every platform adapter.
///
/// Fields are private: a profile is immutable once built. Construction goes
/// through [`Profile::builder`], which enforces the invariants — `username`
/// and `platform` are never empty, `avatar` always resolves to a URL (real
/// or the platform default).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    username: String,
    platform: String,
    avatar: String,
    last_online: String,
    stats: IndexMap<String, StatValue>,
    /// Unprocessed upstream payloads, retained only for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    raw_data: Option<serde_json::Value>,
}

impl Profile {
    /// Start building a profile for `platform`.
    ///
    /// `identifier` is the caller-supplied handle; it becomes the username
    /// unless the platform echoes a canonical one via
    /// [`ProfileBuilder::username`].
    pub fn builder(platform: Platform, identifier: &str) -> ProfileBuilder {
        ProfileBuilder {
            platform,
            fallback_username: identifier.to_string(),
            username: None,
            avatar: None,
            last_online: None,
            stats: IndexMap::new(),
            raw_data: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    pub fn last_online(&self) -> &str {
        &self.last_online
    }

    pub fn stats(&self) -> &IndexMap<String, StatValue> {
        &self.stats
    }

    pub fn raw_data(&self) -> Option<&serde_json::Value> {
        self.raw_data.as_ref()
    }
}

/// Builder for [`Profile`], applying fallbacks at `build` time.
#[derive(Debug)]
pub struct ProfileBuilder {
    platform: Platform,
    fallback_username: String,
    username: Option<String>,
    avatar: Option<String>,
    last_online: Option<String>,
    stats: IndexMap<String, StatValue>,
    raw_data: Option<serde_json::Value>,
}

impl ProfileBuilder {
    /// Canonical handle echoed by the platform. Blank values are ignored in
    /// favor of the input identifier.
    pub fn username(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.username = Some(name);
        }
        self
    }

    /// Avatar URL. Blank values fall back to the platform default.
    pub fn avatar(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.trim().is_empty() {
            self.avatar = Some(url);
        }
        self
    }

    pub fn last_online(mut self, descriptor: impl Into<String>) -> Self {
        self.last_online = Some(descriptor.into());
        self
    }

    /// Add a display stat. Re-using a name overwrites the earlier value;
    /// insertion order is preserved on the wire.
    pub fn stat(mut self, name: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.stats.insert(name.into(), value.into());
        self
    }

    /// Add a stat only when a value is present.
    pub fn stat_opt(self, name: impl Into<String>, value: Option<impl Into<StatValue>>) -> Self {
        match value {
            Some(value) => self.stat(name, value),
            None => self,
        }
    }

    /// Attach the unprocessed upstream payloads for diagnostics.
    pub fn raw_data(mut self, value: serde_json::Value) -> Self {
        self.raw_data = Some(value);
        self
    }

    pub fn build(self) -> Profile {
        Profile {
            username: self.username.unwrap_or(self.fallback_username),
            platform: self.platform.display_name().to_string(),
            avatar: self
                .avatar
                .unwrap_or_else(|| self.platform.default_avatar().to_string()),
            last_online: self.last_online.unwrap_or_else(|| "Unknown".to_string()),
            stats: self.stats,
            raw_data: self.raw_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_input_identifier_and_default_avatar() {
        let profile = Profile::builder(Platform::Xbox, "SomeGamertag").build();
        assert_eq!(profile.username(), "SomeGamertag");
        assert_eq!(profile.platform(), "Xbox");
        assert_eq!(profile.avatar(), Platform::Xbox.default_avatar());
        assert_eq!(profile.last_online(), "Unknown");
    }

    #[test]
    fn blank_platform_values_do_not_override_fallbacks() {
        let profile = Profile::builder(Platform::Steam, "gaben")
            .username("  ")
            .avatar("")
            .build();
        assert_eq!(profile.username(), "gaben");
        assert_eq!(profile.avatar(), Platform::Steam.default_avatar());
    }

    #[test]
    fn stats_preserve_insertion_order() {
        let profile = Profile::builder(Platform::Epic, "ninja")
            .stat("wins", 7u64)
            .stat("matches", 100u64)
            .stat("winRate", "7.00%")
            .build();
        let keys: Vec<&String> = profile.stats().keys().collect();
        assert_eq!(keys, ["wins", "matches", "winRate"]);
    }

    #[test]
    fn stat_names_are_unique() {
        let profile = Profile::builder(Platform::Roblox, "builderman")
            .stat("friends", 1u64)
            .stat("friends", 2u64)
            .build();
        assert_eq!(profile.stats().len(), 1);
        assert_eq!(profile.stats()["friends"], StatValue::Count(2));
    }

    #[test]
    fn serializes_with_camel_case_and_omits_missing_raw_data() {
        let profile = Profile::builder(Platform::Steam, "gaben")
            .last_online("Online")
            .stat("games", 12u64)
            .build();
        let json = serde_json::to_value(&profile).expect("serialize");
        assert_eq!(json["lastOnline"], "Online");
        assert_eq!(json["stats"]["games"], 12);
        assert!(json.get("rawData").is_none());
    }

    #[test]
    fn raw_data_round_trips_when_attached() {
        let profile = Profile::builder(Platform::Steam, "gaben")
            .raw_data(serde_json::json!({"steam": {"personaname": "gaben"}}))
            .build();
        let json = serde_json::to_value(&profile).expect("serialize");
        assert_eq!(json["rawData"]["steam"]["personaname"], "gaben");
    }
}
