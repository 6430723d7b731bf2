pub mod auth;
pub mod avatars;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod validate;
