use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A waitlist entry. `has_access` gates every linking operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub has_access: bool,
    pub twitter_id: Option<String>,
    pub pub_key: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl UserRecord {
    pub fn access_state(&self) -> AccessState {
        match (self.has_access, self.twitter_id.is_some()) {
            (false, _) => AccessState::Waitlisted,
            (true, false) => AccessState::Whitelisted,
            (true, true) => AccessState::Linked,
        }
    }
}

/// Position of an email in the access lifecycle.
///
/// States only ever advance: `Unlisted -> Waitlisted -> Whitelisted -> Linked`,
/// with `Unlisted -> Whitelisted` allowed directly through the whitelist.
/// Linking a wallet key does not move a record along this axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    Unlisted,
    Waitlisted,
    Whitelisted,
    Linked,
}

impl AccessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessState::Unlisted => "unlisted",
            AccessState::Waitlisted => "waitlisted",
            AccessState::Whitelisted => "whitelisted",
            AccessState::Linked => "linked",
        }
    }
}
