//! HTTP surface for the daymark core.
//!
//! # Responsibility
//! - Expose the REST contract over the core services.
//! - Translate bearer credentials into owner ids and service errors into
//!   status codes.
//!
//! # Invariants
//! - Handlers hold no state of their own; everything lives in [`AppState`].
//! - Responses never carry internal error details; those are logged only.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
