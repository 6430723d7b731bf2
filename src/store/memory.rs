//! In-memory backend used by the development server and the test suite.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Contact, ContactFields, ContactPatch, Subscription, User};
use crate::store::{ContactQuery, ContactStore, StoreError, UserStore};

struct StoredContact {
    contact: Contact,
    /// Insertion counter, stands in for the created_at ordering in Postgres
    seq: u64,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    contacts: HashMap<Uuid, StoredContact>,
    next_seq: u64,
}

/// Everything behind one `RwLock`, so the narrow update operations are
/// atomic the same way the Postgres single-statement updates are.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn mark_verified(&self, token: &str) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;

        let user = inner
            .users
            .values_mut()
            .find(|u| u.verification_token.as_deref() == Some(token));

        Ok(user.map(|u| {
            u.verified = true;
            u.verification_token = None;
            u.clone()
        }))
    }

    async fn set_session_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.session_token = token.map(String::from);
        Ok(())
    }

    async fn set_subscription(&self, id: Uuid, tier: Subscription) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.subscription = tier;
        Ok(())
    }

    async fn set_avatar_url(&self, id: Uuid, url: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.avatar_url = url.to_string();
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert(&self, owner: Uuid, fields: ContactFields) -> Result<Contact, StoreError> {
        let mut inner = self.inner.write().await;

        let contact = Contact {
            id: Uuid::new_v4(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            favorite: fields.favorite,
            owner,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.contacts.insert(
            contact.id,
            StoredContact {
                contact: contact.clone(),
                seq,
            },
        );

        Ok(contact)
    }

    async fn list(&self, owner: Uuid, query: &ContactQuery) -> Result<Vec<Contact>, StoreError> {
        let inner = self.inner.read().await;

        let mut matching: Vec<&StoredContact> = inner
            .contacts
            .values()
            .filter(|s| s.contact.owner == owner)
            .filter(|s| query.favorite.map_or(true, |f| s.contact.favorite == f))
            .collect();
        matching.sort_by_key(|s| s.seq);

        Ok(matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .map(|s| s.contact.clone())
            .collect())
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Contact>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .contacts
            .get(&id)
            .filter(|s| s.contact.owner == owner)
            .map(|s| s.contact.clone()))
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, StoreError> {
        let mut inner = self.inner.write().await;

        let Some(stored) = inner
            .contacts
            .get_mut(&id)
            .filter(|s| s.contact.owner == owner)
        else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            stored.contact.name = name.clone();
        }
        if let Some(email) = &patch.email {
            stored.contact.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            stored.contact.phone = phone.clone();
        }
        if let Some(favorite) = patch.favorite {
            stored.contact.favorite = favorite;
        }

        Ok(Some(stored.contact.clone()))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;

        let owned = inner
            .contacts
            .get(&id)
            .map_or(false, |s| s.contact.owner == owner);
        if owned {
            inner.contacts.remove(&id);
        }

        Ok(owned)
    }
}
