use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Runtime configuration, resolved once at startup and passed around
/// explicitly through application state. Nothing reads the environment
/// after `from_env` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub mail: MailConfig,
    pub avatars: AvatarConfig,
    pub contacts: ContactsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// External URL prefix used in verification links
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailDriver {
    Smtp,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub driver: MailDriver,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    /// Destination for the file driver
    pub outbox_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    pub default_limit: i64,
    /// Hard ceiling on client-requested page sizes
    pub max_limit: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,

    #[error("DATABASE_URL must be set when the postgres store is selected")]
    MissingDatabaseUrl,

    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides();

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("CONTACTS_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("CONTACTS_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("BASE_URL") {
            self.server.public_base_url = v;
        }
        if let Ok(v) = env::var("AVATAR_MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = v.parse().unwrap_or(self.server.max_upload_bytes);
        }

        // Auth overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("TOKEN_TTL_HOURS") {
            self.auth.token_ttl_hours = v.parse().unwrap_or(self.auth.token_ttl_hours);
        }

        // Store overrides. An explicit CONTACTS_STORE wins; otherwise a
        // DATABASE_URL in the environment selects postgres.
        if let Ok(v) = env::var("DATABASE_URL") {
            self.store.database_url = Some(v);
            self.store.backend = StoreBackend::Postgres;
        }
        if let Ok(v) = env::var("CONTACTS_STORE") {
            match v.as_str() {
                "postgres" => self.store.backend = StoreBackend::Postgres,
                "memory" => self.store.backend = StoreBackend::Memory,
                _ => {}
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }

        // Mail overrides, same shape: SMTP_HOST implies the smtp driver
        if let Ok(v) = env::var("SMTP_HOST") {
            self.mail.smtp_host = v;
            self.mail.driver = MailDriver::Smtp;
        }
        if let Ok(v) = env::var("MAIL_DRIVER") {
            match v.as_str() {
                "smtp" => self.mail.driver = MailDriver::Smtp,
                "file" => self.mail.driver = MailDriver::File,
                _ => {}
            }
        }
        if let Ok(v) = env::var("SMTP_PORT") {
            self.mail.smtp_port = v.parse().unwrap_or(self.mail.smtp_port);
        }
        if let Ok(v) = env::var("SMTP_USERNAME") {
            self.mail.smtp_username = v;
        }
        if let Ok(v) = env::var("SMTP_PASSWORD") {
            self.mail.smtp_password = v;
        }
        if let Ok(v) = env::var("MAIL_FROM") {
            self.mail.from_address = v;
        }
        if let Ok(v) = env::var("MAIL_OUTBOX_DIR") {
            self.mail.outbox_dir = PathBuf::from(v);
        }

        // Avatar overrides
        if let Ok(v) = env::var("AVATARS_DIR") {
            self.avatars.dir = PathBuf::from(v);
        }

        // Contact listing overrides
        if let Ok(v) = env::var("CONTACTS_LIST_LIMIT") {
            self.contacts.default_limit = v.parse().unwrap_or(self.contacts.default_limit);
        }
        if let Ok(v) = env::var("CONTACTS_LIST_MAX_LIMIT") {
            self.contacts.max_limit = v.parse().unwrap_or(self.contacts.max_limit);
        }

        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.auth.token_ttl_hours < 1 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: self.auth.token_ttl_hours.to_string(),
            });
        }
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if url::Url::parse(&self.server.public_base_url).is_err() {
            return Err(ConfigError::Invalid {
                name: "BASE_URL",
                value: self.server.public_base_url.clone(),
            });
        }
        if self.contacts.default_limit < 1 || self.contacts.default_limit > self.contacts.max_limit
        {
            return Err(ConfigError::Invalid {
                name: "CONTACTS_LIST_LIMIT",
                value: self.contacts.default_limit.to_string(),
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_base_url: "http://localhost:3000".to_string(),
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
            },
            auth: AuthConfig {
                jwt_secret: "contacts-dev-secret".to_string(),
                token_ttl_hours: 23,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                database_url: None,
                max_connections: 10,
            },
            mail: MailConfig {
                driver: MailDriver::File,
                smtp_host: "localhost".to_string(),
                smtp_port: 587,
                smtp_username: String::new(),
                smtp_password: String::new(),
                from_address: "no-reply@contacts.local".to_string(),
                outbox_dir: PathBuf::from("outbox"),
            },
            avatars: AvatarConfig {
                dir: PathBuf::from("public/avatars"),
            },
            contacts: ContactsConfig {
                default_limit: 10,
                max_limit: 100,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_base_url: "http://localhost:3000".to_string(),
                max_upload_bytes: 2 * 1024 * 1024, // 2MB
            },
            auth: AuthConfig {
                // No usable default in production; must come from JWT_SECRET
                jwt_secret: String::new(),
                token_ttl_hours: 23,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 50,
            },
            mail: MailConfig {
                driver: MailDriver::Smtp,
                smtp_host: "localhost".to_string(),
                smtp_port: 587,
                smtp_username: String::new(),
                smtp_password: String::new(),
                from_address: "no-reply@contacts.local".to_string(),
                outbox_dir: PathBuf::from("outbox"),
            },
            avatars: AvatarConfig {
                dir: PathBuf::from("public/avatars"),
            },
            contacts: ContactsConfig {
                default_limit: 10,
                max_limit: 100,
            },
        }
    }
}
