//! SQLite persistence for users, the sponsor register and applications.

mod applications;
mod columns;
mod companies;
mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::{User, UserId};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("owning user does not exist")]
    UnknownOwner,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::Unavailable(err.to_string())
    }
}

/// Single-connection SQLite store. Requests are serialized on the mutex, so
/// each transaction sees a consistent database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                RepositoryError::Unavailable(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }
        let store = Self::initialise(Connection::open(path)?)?;
        tracing::debug!(path = %path.display(), "sqlite store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::initialise(Connection::open_in_memory()?)
    }

    fn initialise(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    /// Returns the user with this email, creating it on first use.
    pub fn upsert_user(&self, email: &str) -> Result<User, RepositoryError> {
        let email = email.trim().to_lowercase();
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (email, created_at) VALUES (?1, ?2)",
            params![email, Utc::now()],
        )?;
        let user = conn.query_row(
            "SELECT id, email, created_at FROM users WHERE email = ?1",
            [&email],
            |row| {
                Ok(User {
                    id: UserId(row.get(0)?),
                    email: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )?;
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let conn = self.connection()?;
        let user = conn
            .query_row(
                "SELECT id, email, created_at FROM users WHERE id = ?1",
                [id.0],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        email: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}
