//! Unified login-or-register flow (the identity gate).
//!
//! # Responsibility
//! - Resolve an email/password pair to a registered or logged-in session.
//! - Keep the two divergent paths behind one explicit two-variant outcome.
//!
//! # Invariants
//! - Input validation runs before any store access.
//! - Exactly zero or one user row is created per call.
//! - Password mismatch and unknown-account are indistinguishable to callers.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenSigner;
use crate::model::user::{User, UserSummary};
use crate::repo::user_repo::UserRepository;
use crate::service::{now_ms, ServiceError, ServiceResult};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    // Syntactic check only; deliverability is not this layer's concern.
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern must compile")
});

/// Session material returned from a successful start call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSession {
    /// Opaque bearer credential with a seven-day expiry encoded inside.
    pub token: String,
    pub user: UserSummary,
}

/// Outcome of the unified start flow.
///
/// Modeled as an explicit two-variant type instead of a boolean so both
/// paths stay exhaustively matchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The email was unseen; a new account was created.
    Registered(StartSession),
    /// The email existed and the password matched.
    LoggedIn(StartSession),
}

impl StartOutcome {
    pub fn session(&self) -> &StartSession {
        match self {
            Self::Registered(session) | Self::LoggedIn(session) => session,
        }
    }

    pub fn is_new_user(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

/// Use-case service for the unified start endpoint.
pub struct AuthService<R: UserRepository> {
    repo: R,
    signer: TokenSigner,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: R, signer: TokenSigner) -> Self {
        Self { repo, signer }
    }

    /// Logs in when the email is known, registers otherwise.
    ///
    /// A typo in the email therefore registers a fresh account instead of
    /// erroring; that trade-off is accepted to remove the login/register
    /// branch from callers.
    ///
    /// # Errors
    /// - `Validation` for a malformed email or short password.
    /// - `InvalidCredentials` when the stored hash does not match.
    /// - `Store` when the backing store fails.
    pub fn start(&self, email: &str, password: &str) -> ServiceResult<StartOutcome> {
        let email = validate_email(email)?;
        validate_password(password)?;

        let now = now_ms();
        if let Some(user) = self.repo.find_by_email(&email)? {
            if !verify_password(password, &user.password_hash) {
                info!("event=auth_start module=auth status=invalid_credentials");
                return Err(ServiceError::InvalidCredentials);
            }
            info!("event=auth_start module=auth status=logged_in");
            return Ok(StartOutcome::LoggedIn(StartSession {
                token: self.signer.issue(user.uuid, now),
                user: user.summary(),
            }));
        }

        let user = User::new(email, hash_password(password));
        self.repo.create_user(&user)?;
        info!("event=auth_start module=auth status=registered");
        Ok(StartOutcome::Registered(StartSession {
            token: self.signer.issue(user.uuid, now),
            user: user.summary(),
        }))
    }
}

/// Normalizes and syntactically validates an email address.
pub fn validate_email(email: &str) -> ServiceResult<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ServiceError::Validation(
            "email address is not valid".to_string(),
        ));
    }
    Ok(normalized)
}

fn validate_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
