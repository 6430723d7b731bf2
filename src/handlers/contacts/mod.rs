// handlers/contacts/mod.rs - Owner-scoped contact handlers
//
// Every handler here runs behind the auth guard and passes the resolved
// user id into the service, which scopes each query by (id, owner).

pub mod collection; // GET /api/contacts, POST /api/contacts
pub mod favorite; // PATCH /api/contacts/:id/favorite
pub mod record; // GET/PUT/DELETE /api/contacts/:id

pub use collection::{contacts_get, contacts_post};
pub use favorite::favorite_patch;
pub use record::{contact_delete, contact_get, contact_put};
