//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::avatars::AvatarStore;
use crate::config::{AppConfig, MailDriver, StoreBackend};
use crate::mailer::{FileMailer, Mailer, SmtpMailer};
use crate::services::{AccountService, ContactService};
use crate::store::{ContactStore, MemoryStore, PgStore, UserStore};

/// Cheaply cloneable bundle of everything a handler needs. Configuration
/// rides along explicitly; nothing is read from the environment after boot.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub tokens: TokenService,
    pub mailer: Arc<dyn Mailer>,
    pub avatars: Arc<AvatarStore>,
}

impl AppState {
    /// Wire up the backends the configuration selects
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let (users, contacts): (Arc<dyn UserStore>, Arc<dyn ContactStore>) =
            match config.store.backend {
                StoreBackend::Postgres => {
                    let Some(url) = config.store.database_url.as_deref() else {
                        anyhow::bail!("DATABASE_URL is required for the postgres store");
                    };
                    let store =
                        Arc::new(PgStore::connect(url, config.store.max_connections).await?);
                    let users: Arc<dyn UserStore> = store.clone();
                    let contacts: Arc<dyn ContactStore> = store;
                    (users, contacts)
                }
                StoreBackend::Memory => {
                    tracing::warn!("Using the in-memory store; data is lost on restart");
                    let store = Arc::new(MemoryStore::new());
                    let users: Arc<dyn UserStore> = store.clone();
                    let contacts: Arc<dyn ContactStore> = store;
                    (users, contacts)
                }
            };

        let mailer: Arc<dyn Mailer> = match config.mail.driver {
            MailDriver::Smtp => Arc::new(SmtpMailer::new(&config.mail)?),
            MailDriver::File => Arc::new(FileMailer::new(config.mail.outbox_dir.clone())?),
        };

        let avatars = Arc::new(AvatarStore::new(config.avatars.dir.clone())?);
        let tokens = TokenService::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_ttl_hours,
        );

        Ok(Self {
            config,
            users,
            contacts,
            tokens,
            mailer,
            avatars,
        })
    }

    pub fn account(&self) -> AccountService {
        AccountService::new(
            self.users.clone(),
            self.tokens.clone(),
            self.mailer.clone(),
            self.avatars.clone(),
            self.config.clone(),
        )
    }

    pub fn contact(&self) -> ContactService {
        ContactService::new(self.contacts.clone(), self.config.contacts.clone())
    }
}
