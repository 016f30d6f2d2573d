//! Platform identities for the supported lookup targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The fixed set of platforms a profile can be looked up on.
///
/// Parses case-insensitively from the wire identifier (`"steam"`, `"PSN"`,
/// ...). Display uses the human-facing platform name, which is also what
/// ends up in [`Profile::platform`](crate::Profile::platform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Steam,
    Roblox,
    Epic,
    Xbox,
    Psn,
    Activision,
}

impl Platform {
    /// Every supported platform, in registry order.
    pub const ALL: [Platform; 6] = [
        Platform::Steam,
        Platform::Roblox,
        Platform::Epic,
        Platform::Xbox,
        Platform::Psn,
        Platform::Activision,
    ];

    /// The lowercase wire identifier (`"steam"`, `"psn"`, ...).
    pub fn id(&self) -> &'static str {
        match self {
            Platform::Steam => "steam",
            Platform::Roblox => "roblox",
            Platform::Epic => "epic",
            Platform::Xbox => "xbox",
            Platform::Psn => "psn",
            Platform::Activision => "activision",
        }
    }

    /// The fixed display name used in normalized profiles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Steam => "Steam",
            Platform::Roblox => "Roblox",
            Platform::Epic => "Epic Games",
            Platform::Xbox => "Xbox",
            Platform::Psn => "PlayStation",
            Platform::Activision => "Activision",
        }
    }

    /// Fallback avatar URL used when the platform returns none.
    pub fn default_avatar(&self) -> &'static str {
        match self {
            Platform::Roblox => {
                "https://tr.rbxcdn.com/9f242fee04192a0f71d1ddb0d4cf32b6/420/420/Image/Png"
            }
            Platform::Xbox => {
                "https://external-content.duckduckgo.com/iu/?u=https%3A%2F%2Fpngimg.com%2Fuploads%2Fxbox%2Fxbox_PNG17.png"
            }
            Platform::Psn => {
                "https://external-content.duckduckgo.com/iu/?u=https%3A%2F%2Fupload.wikimedia.org%2Fwikipedia%2Fcommons%2Fthumb%2F0%2F05%2FPlayStation_logo.svg%2F2000px-PlayStation_logo.svg.png"
            }
            Platform::Activision => {
                "https://external-content.duckduckgo.com/iu/?u=https%3A%2F%2Fupload.wikimedia.org%2Fwikipedia%2Fcommons%2Fthumb%2F0%2F05%2FActivision_Logo.svg%2F1200px-Activision_Logo.svg.png"
            }
            Platform::Steam | Platform::Epic => "https://via.placeholder.com/150",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steam" => Ok(Platform::Steam),
            "roblox" => Ok(Platform::Roblox),
            "epic" => Ok(Platform::Epic),
            "xbox" => Ok(Platform::Xbox),
            "psn" => Ok(Platform::Psn),
            "activision" => Ok(Platform::Activision),
            _ => Err(DomainError::UnknownPlatform(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_identifiers_case_insensitively() {
        for platform in Platform::ALL {
            assert_eq!(platform.id().parse::<Platform>(), Ok(platform));
            assert_eq!(
                platform.id().to_ascii_uppercase().parse::<Platform>(),
                Ok(platform)
            );
        }
        assert_eq!("Steam".parse::<Platform>(), Ok(Platform::Steam));
        assert_eq!("pSn".parse::<Platform>(), Ok(Platform::Psn));
    }

    #[test]
    fn rejects_unknown_platforms() {
        let err = "minecraft".parse::<Platform>().unwrap_err();
        assert_eq!(err, DomainError::UnknownPlatform("minecraft".to_string()));
        assert!("".parse::<Platform>().is_err());
        assert!("playstation 5".parse::<Platform>().is_err());
    }

    #[test]
    fn display_names_are_fixed() {
        assert_eq!(Platform::Psn.to_string(), "PlayStation");
        assert_eq!(Platform::Epic.to_string(), "Epic Games");
        assert_eq!(Platform::Steam.to_string(), "Steam");
    }

    #[test]
    fn every_platform_has_a_default_avatar() {
        for platform in Platform::ALL {
            assert!(platform.default_avatar().starts_with("https://"));
        }
    }

    #[test]
    fn serializes_as_wire_identifier() {
        let json = serde_json::to_string(&Platform::Activision).expect("serialize");
        assert_eq!(json, "\"activision\"");
    }
}
