pub mod contact;
pub mod user;

pub use contact::{Contact, ContactFields, ContactPatch};
pub use user::{PublicProfile, Subscription, User};
