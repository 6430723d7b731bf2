//! Account lifecycle: registration, email verification, login sessions,
//! subscription changes and avatar replacement.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::TokenService;
use crate::avatars::{default_avatar_url, AvatarStore};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::mailer::{Mail, Mailer};
use crate::models::{PublicProfile, Subscription, User};
use crate::store::UserStore;
use crate::validate::Credentials;

pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    mailer: Arc<dyn Mailer>,
    avatars: Arc<AvatarStore>,
    config: Arc<AppConfig>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: TokenService,
        mailer: Arc<dyn Mailer>,
        avatars: Arc<AvatarStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            avatars,
            config,
        }
    }

    /// Create an unverified account and send the verification link.
    /// The account persists even if the mail bounces; the resend endpoint
    /// covers that case.
    pub async fn register(&self, credentials: Credentials) -> Result<PublicProfile, ApiError> {
        let email = credentials.email.trim().to_lowercase();
        let password_hash = hash_password(&credentials.password)?;
        let verification_token = Uuid::new_v4().simple().to_string();
        let avatar_url = default_avatar_url(&email);

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            subscription: Subscription::default(),
            session_token: None,
            verified: false,
            verification_token: Some(verification_token.clone()),
            avatar_url,
        };

        let created = self.users.create(user).await?;
        info!(user_id = %created.id, "Registered new account");

        self.mailer
            .send(self.verification_mail(&created.email, &verification_token))
            .await?;

        Ok(PublicProfile::from(&created))
    }

    /// Consume a verification token. Succeeds at most once per token.
    pub async fn verify_email(&self, token: &str) -> Result<(), ApiError> {
        match self.users.mark_verified(token).await? {
            Some(user) => {
                info!(user_id = %user.id, "Email verified");
                Ok(())
            }
            None => Err(ApiError::not_found("User not found")),
        }
    }

    /// Re-send the outstanding verification token. The token is not rotated,
    /// so an earlier mail that eventually arrives still works.
    pub async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        let email = email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Email not found"))?;

        if user.verified {
            return Err(ApiError::conflict("Verification has already been passed"));
        }

        let Some(token) = user.verification_token.as_deref() else {
            error!(user_id = %user.id, "Unverified account without verification token");
            return Err(ApiError::internal("Internal Server Error"));
        };

        self.mailer
            .send(self.verification_mail(&user.email, token))
            .await?;

        Ok(())
    }

    /// Check credentials, then the verification gate, then start a session.
    /// Unknown email and wrong password produce the identical error.
    pub async fn login(&self, credentials: Credentials) -> Result<(String, PublicProfile), ApiError> {
        let email = credentials.email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !verify_password(&credentials.password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        if !user.verified {
            return Err(ApiError::NotVerified);
        }

        let token = self.tokens.issue(user.id)?;
        self.users
            .set_session_token(user.id, Some(token.as_str()))
            .await?;

        info!(user_id = %user.id, "Login");
        Ok((token, PublicProfile::from(&user)))
    }

    /// Drop the live session. Clearing an already-clear token is fine,
    /// so repeated logouts at the service level succeed.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.users.set_session_token(user_id, None).await?;
        info!(user_id = %user_id, "Logout");
        Ok(())
    }

    pub async fn update_subscription(
        &self,
        user_id: Uuid,
        tier: Subscription,
    ) -> Result<(), ApiError> {
        self.users.set_subscription(user_id, tier).await?;
        info!(user_id = %user_id, tier = %tier, "Subscription updated");
        Ok(())
    }

    /// Normalize the upload and point the account at the stored file.
    /// Returns the public `avatars/{id}.png` reference.
    pub async fn replace_avatar(&self, user_id: Uuid, upload: Vec<u8>) -> Result<String, ApiError> {
        let reference = self.avatars.store(user_id, upload).await?;
        self.users.set_avatar_url(user_id, &reference).await?;
        Ok(reference)
    }

    fn verification_mail(&self, to: &str, token: &str) -> Mail {
        let base = self.config.server.public_base_url.trim_end_matches('/');
        let link = format!("{base}/api/auth/verify/{token}");

        Mail {
            to: to.to_string(),
            subject: "Verify email".to_string(),
            text_body: format!("Follow this link to verify your email: {link}"),
            html_body: format!(r#"<a target="_blank" href="{link}">Click to verify your email</a>"#),
        }
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::internal("Internal Server Error")
        })
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        warn!("Stored password hash failed to parse");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
