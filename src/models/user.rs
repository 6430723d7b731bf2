use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Subscription tier attached to every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    Starter,
    Pro,
    Business,
}

impl Subscription {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subscription::Starter => "starter",
            Subscription::Pro => "pro",
            Subscription::Business => "business",
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Subscription::Starter
    }
}

impl FromStr for Subscription {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Subscription::Starter),
            "pro" => Ok(Subscription::Pro),
            "business" => Ok(Subscription::Business),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full account record as held by the credential store.
///
/// Deliberately not serializable: responses go through `PublicProfile`
/// so the password hash and session bookkeeping never leave the server.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    /// Stored lowercased; uniqueness is case-insensitive
    pub email: String,
    /// Argon2id hash in PHC string format
    pub password_hash: String,
    pub subscription: Subscription,
    /// Most recently issued bearer token, cleared on logout
    pub session_token: Option<String>,
    pub verified: bool,
    /// One-shot email verification token, cleared once used
    pub verification_token: Option<String>,
    pub avatar_url: String,
}

/// Client-visible slice of a `User`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub email: String,
    pub subscription: Subscription,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            subscription: user.subscription,
        }
    }
}
