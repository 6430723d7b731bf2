//! Postgres backend. Plain runtime queries, schema bootstrapped on connect.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{Contact, ContactFields, ContactPatch, Subscription, User};
use crate::store::{ContactQuery, ContactStore, StoreError, UserStore};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        subscription TEXT NOT NULL DEFAULT 'starter',
        session_token TEXT,
        verified BOOLEAN NOT NULL DEFAULT FALSE,
        verification_token TEXT,
        avatar_url TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS users_verification_token_idx
        ON users (verification_token)",
    "CREATE TABLE IF NOT EXISTS contacts (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        favorite BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS contacts_owner_idx
        ON contacts (owner_id, created_at)",
];

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and make sure the schema exists
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Connected to Postgres store");
        Ok(Self { pool })
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let tier: String = row.try_get("subscription")?;
    let subscription = tier
        .parse::<Subscription>()
        .map_err(|_| StoreError::Backend(format!("unknown subscription tier in row: {tier}")))?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        subscription,
        session_token: row.try_get("session_token")?,
        verified: row.try_get("verified")?,
        verification_token: row.try_get("verification_token")?,
        avatar_url: row.try_get("avatar_url")?,
    })
}

fn contact_from_row(row: &PgRow) -> Result<Contact, StoreError> {
    Ok(Contact {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        favorite: row.try_get("favorite")?,
        owner: row.try_get("owner_id")?,
    })
}

const USER_COLUMNS: &str =
    "id, email, password_hash, subscription, session_token, verified, verification_token, avatar_url";

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, subscription, session_token, \
             verified, verification_token, avatar_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.subscription.as_str())
        .bind(&user.session_token)
        .bind(user.verified)
        .bind(&user.verification_token)
        .bind(&user.avatar_url)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn mark_verified(&self, token: &str) -> Result<Option<User>, StoreError> {
        // Single statement, so two concurrent claims cannot both succeed
        let row = sqlx::query(&format!(
            "UPDATE users \
             SET verified = TRUE, verification_token = NULL, updated_at = now() \
             WHERE verification_token = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn set_session_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET session_token = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_subscription(&self, id: Uuid, tier: Subscription) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET subscription = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(tier.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_avatar_url(&self, id: Uuid, url: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET avatar_url = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ContactStore for PgStore {
    async fn insert(&self, owner: Uuid, fields: ContactFields) -> Result<Contact, StoreError> {
        let contact = Contact {
            id: Uuid::new_v4(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            favorite: fields.favorite,
            owner,
        };

        sqlx::query(
            "INSERT INTO contacts (id, owner_id, name, email, phone, favorite) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(contact.id)
        .bind(contact.owner)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.favorite)
        .execute(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn list(&self, owner: Uuid, query: &ContactQuery) -> Result<Vec<Contact>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, email, phone, favorite FROM contacts \
             WHERE owner_id = $1 AND ($2::bool IS NULL OR favorite = $2) \
             ORDER BY created_at, id \
             LIMIT $3 OFFSET $4",
        )
        .bind(owner)
        .bind(query.favorite)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(contact_from_row).collect()
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Contact>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, email, phone, favorite FROM contacts \
             WHERE id = $2 AND owner_id = $1",
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(contact_from_row).transpose()
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, StoreError> {
        // COALESCE keeps columns whose patch field came in as NULL
        let row = sqlx::query(
            "UPDATE contacts SET \
                name = COALESCE($3, name), \
                email = COALESCE($4, email), \
                phone = COALESCE($5, phone), \
                favorite = COALESCE($6, favorite), \
                updated_at = now() \
             WHERE id = $2 AND owner_id = $1 \
             RETURNING id, owner_id, name, email, phone, favorite",
        )
        .bind(owner)
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.favorite)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(contact_from_row).transpose()
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $2 AND owner_id = $1")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
