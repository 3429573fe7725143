//! Service Configuration
//! Mission: Load runtime settings from the environment and `.env` files

use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_DATABASE_PATH: &str = "./accounts.db";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    /// Token signing secret; `None` makes every login fail at issuance
    pub jwt_secret: Option<String>,
    /// Roles given to newly registered accounts
    pub default_roles: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = var("DATABASE_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = var("JWT_SECRET").filter(|v| !v.is_empty());

        let default_roles = parse_roles(&var("DEFAULT_ROLES").unwrap_or_else(|| "user".to_string()));

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            default_roles,
        })
    }
}

/// Split a comma-separated role list, dropping blanks
pub fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Load `.env` from the working directory (and parents), then from the crate root
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
