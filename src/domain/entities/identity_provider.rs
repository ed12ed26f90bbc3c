use serde::{Deserialize, Serialize};

/// External identity providers a whitelisted user can link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    Twitter,
}

impl IdentityProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Twitter => "twitter",
        }
    }

    /// Parse the `{provider}` path segment. "x" is accepted as an alias for Twitter.
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment.trim().to_ascii_lowercase().as_str() {
            "twitter" | "x" => Some(IdentityProvider::Twitter),
            _ => None,
        }
    }
}

impl std::fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
