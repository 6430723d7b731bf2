// handlers/mod.rs - HTTP handler modules
//
// Public handlers (register, verify, login) need no token; everything else
// sits behind the bearer-token guard in middleware::auth.

pub mod auth;
pub mod contacts;
