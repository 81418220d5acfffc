//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup-by-email and creation over canonical `users` storage.
//!
//! # Invariants
//! - Email uniqueness is enforced by the store; callers pass emails already
//!   normalized by the auth service.
//! - User rows are never updated or deleted by core.

use crate::model::user::{User, UserId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Repository interface for user identity records.
pub trait UserRepository {
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT uuid, email, password_hash FROM users WHERE email = ?1;",
                params![email],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (uuid, email, password_hash) VALUES (?1, ?2, ?3);",
            params![
                user.uuid.to_string(),
                user.email.as_str(),
                user.password_hash.as_str(),
            ],
        )?;
        Ok(user.uuid)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
    })?;
    Ok(User {
        uuid,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
    })
}

/// Counts stored users. Exposed for invariant checks in tests.
pub fn count_users(conn: &Connection) -> RepoResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData("negative user count".to_string()))
}
