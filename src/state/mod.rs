pub mod account;
pub mod cache;

pub use account::{Account, AccountStore, InMemAccountStore};
pub use cache::AccountCache;
