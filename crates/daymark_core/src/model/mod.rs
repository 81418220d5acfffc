//! Domain model for users and their tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Tasks are always owned by exactly one user.

pub mod task;
pub mod user;
