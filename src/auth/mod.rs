//! Account Module
//! Mission: Registration, credential verification, session tokens and roles

pub mod api;
pub mod error;
pub mod hashing;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod service;
pub mod sqlite_store;
pub mod store;
pub mod validation;

pub use api::AuthState;
pub use error::{AccountError, StoreError};
pub use hashing::CredentialHasher;
pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
pub use service::AccountService;
pub use sqlite_store::SqliteAccountStore;
pub use store::{AccountStore, InMemoryAccountStore};
