//! User identity model.
//!
//! # Responsibility
//! - Define the stored user record and its outward-facing summary shape.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another user.
//! - `email` is stored normalized (trimmed, ASCII-lowercased) and unique.
//! - `password_hash` is opaque to everything except the password module.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user account.
pub type UserId = Uuid;

/// Stored user record.
///
/// Core never mutates or deletes users; the only creation path is the
/// unified start flow when an unseen email arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    /// Normalized before storage; uniqueness is enforced by the store.
    pub email: String,
    /// Salted one-way hash. Never compared in plaintext.
    pub password_hash: String,
}

impl User {
    /// Creates a user record with a generated stable ID.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Returns the shape safe to hand to callers (no hash material).
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.uuid,
            email: self.email.clone(),
        }
    }
}

/// Caller-visible user summary returned from the start flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
}
