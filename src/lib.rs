//! Accounts Backend Library
//!
//! Account registration, password authentication with signed session
//! tokens, and role management, plus the HTTP surface serving them.

pub mod auth;
pub mod config;
