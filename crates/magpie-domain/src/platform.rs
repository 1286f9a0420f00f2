//! Issue tracker platform tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a platform tag is not one of the known trackers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown platform '{0}' (expected github, gitee or gitlab)")]
pub struct UnknownPlatform(pub String);

/// The issue tracker platforms magpie collects from
///
/// The lowercase tag is the stable identifier used in API parameters,
/// token lookup and persisted records.
///
/// # Examples
///
/// ```
/// use magpie_domain::Platform;
///
/// let p: Platform = "gitee".parse().unwrap();
/// assert_eq!(p, Platform::Gitee);
/// assert_eq!(p.to_string(), "gitee");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub-style tracker (REST v3 issues API)
    Github,
    /// Gitee-style tracker (API v5)
    Gitee,
    /// GitLab-style tracker (API v4)
    Gitlab,
}

impl Platform {
    /// Stable lowercase tag for this platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Github => "github",
            Platform::Gitee => "gitee",
            Platform::Gitlab => "gitlab",
        }
    }

    /// All known platforms, in dispatch order
    pub fn all() -> [Platform; 3] {
        [Platform::Github, Platform::Gitee, Platform::Gitlab]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Platform::Github),
            "gitee" => Ok(Platform::Gitee),
            "gitlab" => Ok(Platform::Gitlab),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_tags() {
        for platform in Platform::all() {
            let parsed: Platform = platform.as_str().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "bitbucket".parse::<Platform>().unwrap_err();
        assert_eq!(err.0, "bitbucket");
    }

    #[test]
    fn test_serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&Platform::Gitlab).unwrap();
        assert_eq!(json, "\"gitlab\"");
        let back: Platform = serde_json::from_str("\"github\"").unwrap();
        assert_eq!(back, Platform::Github);
    }
}
