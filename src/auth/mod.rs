use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id the token was issued to
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl_hours: i64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(ttl_hours)).timestamp();

        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,
    #[error("token generation error: {0}")]
    Generation(String),
}

/// Issues and resolves the bearer tokens handed out at login.
///
/// Tokens are HS256 JWTs. Resolution only proves the token was minted
/// here and has not expired; whether it is still the account's live
/// session is checked against the credential store by the auth guard.
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<String>,
    ttl_hours: i64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            ttl_hours,
        }
    }

    /// Mint a signed token for the given account
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, self.ttl_hours);
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry, returning the account id carried in the token.
    /// Every failure collapses into `TokenError::Invalid`; callers get no detail
    /// about why a token was rejected.
    pub fn resolve(&self, token: &str) -> Result<Uuid, TokenError> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());

        decode::<Claims>(token, &decoding_key, &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|_| TokenError::Invalid)
    }
}
