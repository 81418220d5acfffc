//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the caller-facing error taxonomy; transport layers map these
//!   variants to status codes without inspecting lower layers.
//!
//! # Invariants
//! - Validation failures are raised before any store access.
//! - Store failures propagate unretried.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod auth_service;
pub mod task_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing failure taxonomy shared by both services.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed input, rejected before touching the store.
    Validation(String),
    /// Email/password pair did not match. Deliberately generic so callers
    /// cannot tell a wrong password from an unknown account.
    InvalidCredentials,
    /// No such record for this owner. Wrong-owner access reports the same
    /// variant as a genuinely absent record.
    NotFound,
    /// The backing store failed; not retried here.
    Store(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::NotFound => write!(f, "not found"),
            Self::Store(err) => write!(f, "store unavailable: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::NotFound,
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            other => Self::Store(other),
        }
    }
}

pub(crate) use crate::auth::token::now_unix_ms as now_ms;
