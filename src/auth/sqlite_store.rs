//! Account Storage
//! Mission: Persist account records in SQLite

use crate::auth::error::StoreError;
use crate::auth::models::{Account, Lookup};
use crate::auth::store::AccountStore;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

/// Account storage with SQLite backend
pub struct SqliteAccountStore {
    conn: Mutex<Connection>,
}

/// Column values as read from a row, before decoding
struct RawAccount {
    id: String,
    email: String,
    username: String,
    password_hash: String,
    roles: String,
    created_at: String,
}

impl SqliteAccountStore {
    /// Open (or create) the database at `db_path` and initialize the schema
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        let store = Self::with_connection(conn)?;
        info!("🔐 Account store opened at: {}", db_path);
        Ok(store)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                username TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                roles TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fetch by id, for operators and tests
    pub fn get(&self, id: &Uuid) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock();
        let raw = conn
            .query_row(
                "SELECT id, email, username, password_hash, roles, created_at
                 FROM accounts WHERE id = ?1",
                params![id.to_string()],
                read_row,
            )
            .optional()?;

        raw.map(decode).transpose()
    }

    /// Count accounts holding `email`
    pub fn count_by_email(&self, email: &str) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccount> {
    Ok(RawAccount {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        roles: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn decode(raw: RawAccount) -> Result<Account, StoreError> {
    let id = Uuid::parse_str(&raw.id)
        .map_err(|e| StoreError::Corrupt(format!("id {:?}: {}", raw.id, e)))?;
    let roles: Vec<String> = serde_json::from_str(&raw.roles)
        .map_err(|e| StoreError::Corrupt(format!("roles of {}: {}", id, e)))?;
    let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
        .map_err(|e| StoreError::Corrupt(format!("created_at of {}: {}", id, e)))?
        .with_timezone(&Utc);

    Ok(Account {
        id,
        email: raw.email,
        username: raw.username,
        password_hash: raw.password_hash,
        roles,
        created_at,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl AccountStore for SqliteAccountStore {
    fn find_by_email(&self, email: &str) -> Result<Lookup, StoreError> {
        let conn = self.conn.lock();
        let raw = conn
            .query_row(
                "SELECT id, email, username, password_hash, roles, created_at
                 FROM accounts WHERE email = ?1",
                params![email],
                read_row,
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Lookup::Found(decode(raw)?)),
            None => Ok(Lookup::NotFound),
        }
    }

    fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let roles = serde_json::to_string(&account.roles)?;
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO accounts (id, email, username, password_hash, roles, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account.id.to_string(),
                account.email,
                account.username,
                account.password_hash,
                roles,
                account.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail
            } else {
                StoreError::Database(e)
            }
        })?;

        debug!("Inserted account {}", account.id);
        Ok(())
    }

    fn update_roles_by_id(&self, id: Uuid, roles: &[String]) -> Result<u64, StoreError> {
        let roles = serde_json::to_string(roles)?;
        let conn = self.conn.lock();

        // Matching rows whose roles are already equal are not counted as modified
        let rows_affected = conn.execute(
            "UPDATE accounts SET roles = ?1 WHERE id = ?2 AND roles <> ?1",
            params![roles, id.to_string()],
        )?;

        Ok(rows_affected as u64)
    }
}
