//! Contact lifecycle. Every operation takes the authenticated owner id;
//! the stores treat `(owner, id)` as the effective key, so foreign
//! records look exactly like missing ones.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::ContactsConfig;
use crate::error::ApiError;
use crate::models::{Contact, ContactFields, ContactPatch};
use crate::store::{ContactQuery, ContactStore};

pub struct ContactService {
    contacts: Arc<dyn ContactStore>,
    limits: ContactsConfig,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactStore>, limits: ContactsConfig) -> Self {
        Self { contacts, limits }
    }

    /// Page through an owner's contacts. Page numbers start at 1 and the
    /// requested limit is clamped to the configured ceiling.
    pub async fn list(
        &self,
        owner: Uuid,
        page: Option<i64>,
        limit: Option<i64>,
        favorite: Option<bool>,
    ) -> Result<Vec<Contact>, ApiError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.limits.default_limit)
            .clamp(1, self.limits.max_limit);
        let offset = (page - 1).saturating_mul(limit);

        let query = ContactQuery {
            offset,
            limit,
            favorite,
        };
        Ok(self.contacts.list(owner, &query).await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Contact, ApiError> {
        self.contacts
            .find(owner, id)
            .await?
            .ok_or_else(|| missing(id))
    }

    pub async fn create(&self, owner: Uuid, fields: ContactFields) -> Result<Contact, ApiError> {
        let contact = self.contacts.insert(owner, fields).await?;
        info!(contact_id = %contact.id, owner = %owner, "Created contact");
        Ok(contact)
    }

    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ContactPatch,
    ) -> Result<Contact, ApiError> {
        self.contacts
            .update(owner, id, &patch)
            .await?
            .ok_or_else(|| missing(id))
    }

    pub async fn set_favorite(
        &self,
        owner: Uuid,
        id: Uuid,
        favorite: bool,
    ) -> Result<Contact, ApiError> {
        let patch = ContactPatch {
            favorite: Some(favorite),
            ..Default::default()
        };
        self.contacts
            .update(owner, id, &patch)
            .await?
            .ok_or_else(|| missing(id))
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), ApiError> {
        if !self.contacts.delete(owner, id).await? {
            return Err(missing(id));
        }
        info!(contact_id = %id, owner = %owner, "Deleted contact");
        Ok(())
    }
}

fn missing(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Contact with id={id} not found"))
}
