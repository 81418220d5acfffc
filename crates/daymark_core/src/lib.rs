//! Core domain logic for Daymark, a personal task-tracking service.
//! This crate is the single source of truth for business invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::password::{hash_password, verify_password};
pub use auth::token::{TokenError, TokenKeyError, TokenSigner, TOKEN_TTL_MS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    NewTask, Priority, Step, Task, TaskId, TaskPatch, TaskValidationError,
};
pub use model::user::{User, UserId, UserSummary};
pub use repo::task_repo::{
    SqliteTaskRepository, TaskListQuery, TaskRepository, TaskScope,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{AuthService, StartOutcome, StartSession, MIN_PASSWORD_LEN};
pub use service::task_service::{TaskService, TaskStats, TODAY_VIEW_LIMIT};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
