// handlers/auth/mod.rs - Account and session handlers

pub mod avatars; // PATCH /api/auth/avatars
pub mod current; // GET /api/auth/current
pub mod login; // POST /api/auth/login
pub mod logout; // POST /api/auth/logout
pub mod register; // POST /api/auth/register
pub mod subscription; // PATCH /api/auth/subscription
pub mod verify; // GET /api/auth/verify/:verification_token, POST /api/auth/verify

pub use avatars::avatars_patch;
pub use current::current_get;
pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;
pub use subscription::subscription_patch;
pub use verify::{verify_get, verify_post};
