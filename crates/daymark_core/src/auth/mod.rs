//! Credential primitives: password hashing and signed bearer tokens.
//!
//! # Responsibility
//! - Keep all secret-handling code in one narrow module.
//! - Provide one-way password verification and expiring bearer tokens.
//!
//! # Invariants
//! - Plaintext passwords never leave this module boundary in any form.
//! - Token validity is bounded by the expiry encoded inside the token.

pub mod password;
pub mod token;
