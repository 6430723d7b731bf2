//! Persistence layer behind the account and contact services.
//!
//! Two interchangeable backends implement these traits: `PgStore` for
//! Postgres and `MemoryStore` for development and tests. Handlers never
//! see a concrete backend, only `Arc<dyn UserStore>` / `Arc<dyn ContactStore>`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Contact, ContactFields, ContactPatch, Subscription, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// Another account already holds this email
    #[error("email already registered")]
    DuplicateEmail,
    #[error("record not found")]
    NotFound,
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateEmail
            }
            sqlx::Error::RowNotFound => StoreError::NotFound,
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Window over an owner's contacts
#[derive(Debug, Clone)]
pub struct ContactQuery {
    pub offset: i64,
    pub limit: i64,
    /// When set, only contacts with a matching favorite flag
    pub favorite: Option<bool>,
}

/// Account records keyed by id, with a unique lowercased email per account.
///
/// Field updates are narrow single-purpose operations so each backend can
/// make them atomic read-modify-write steps instead of racy fetch-then-save.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Atomically claim a verification token: flip `verified`, clear the
    /// token and return the updated account. `None` means no account holds
    /// the token, including the case where it was already claimed.
    async fn mark_verified(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Record the live bearer token for an account, or clear it with `None`
    async fn set_session_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError>;

    async fn set_subscription(&self, id: Uuid, tier: Subscription) -> Result<(), StoreError>;

    async fn set_avatar_url(&self, id: Uuid, url: &str) -> Result<(), StoreError>;

    /// Connectivity probe for the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Contact records, always addressed as `(owner, id)`.
///
/// The owner is part of every lookup so a contact belonging to someone
/// else is indistinguishable from one that does not exist.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, owner: Uuid, fields: ContactFields) -> Result<Contact, StoreError>;

    /// Contacts in insertion order, filtered and windowed by `query`
    async fn list(&self, owner: Uuid, query: &ContactQuery) -> Result<Vec<Contact>, StoreError>;

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Contact>, StoreError>;

    /// Apply a partial update, returning the updated contact or `None`
    /// when the owner has no such contact
    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, StoreError>;

    /// Returns whether a contact was actually removed
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError>;
}
