//! Shared handler state.
//!
//! # Responsibility
//! - Hold the SQLite connection and the token signer behind one cloneable
//!   handle.
//!
//! # Invariants
//! - The connection is only reachable through [`AppState::with_conn`], so a
//!   poisoned lock surfaces as a server error instead of a panic.

use crate::error::ApiError;
use daymark_core::TokenSigner;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    signer: TokenSigner,
}

impl AppState {
    pub fn new(conn: Connection, signer: TokenSigner) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            signer,
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self.conn.lock().map_err(|_| ApiError::lock_poisoned())?;
        f(&conn)
    }
}
