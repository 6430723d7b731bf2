pub mod account;
pub mod contacts;

pub use account::AccountService;
pub use contacts::ContactService;
