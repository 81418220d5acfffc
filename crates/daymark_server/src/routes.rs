//! Route table and request handlers.
//!
//! # Responsibility
//! - Wire the REST endpoints onto the core services.
//! - Keep handlers thin: extract, delegate, map.
//!
//! # Invariants
//! - Everything under `/api/tasks` requires a verified bearer credential.
//! - Handlers construct services per request; no caching between calls.

use crate::error::ApiError;
use crate::extract::AuthedUser;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use daymark_core::{
    AuthService, NewTask, SqliteTaskRepository, SqliteUserRepository, Task, TaskPatch, TaskScope,
    TaskService, TaskStats, UserSummary,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/start", post(start))
        .route("/api/tasks/today", get(today_tasks))
        .route("/api/tasks/all", get(all_tasks))
        .route("/api/tasks/stats", get(stats))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/:id", put(update_task).delete(delete_task))
        .route("/api/tasks/:id/toggle", patch(toggle_task))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: daymark_core::core_version(),
    })
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    token: String,
    user: UserSummary,
    #[serde(rename = "isNewUser")]
    is_new_user: bool,
}

async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<StartResponse>), ApiError> {
    let signer = state.signer().clone();
    state.with_conn(|conn| {
        let auth = AuthService::new(SqliteUserRepository::new(conn), signer.clone());
        let outcome = auth.start(&request.email, &request.password)?;
        let status = if outcome.is_new_user() {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        let session = outcome.session().clone();
        Ok((
            status,
            Json(StartResponse {
                token: session.token,
                user: session.user,
                is_new_user: outcome.is_new_user(),
            }),
        ))
    })
}

async fn today_tasks(
    State(state): State<AppState>,
    AuthedUser(owner): AuthedUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    state.with_conn(|conn| {
        let tasks = TaskService::new(SqliteTaskRepository::new(conn));
        Ok(Json(tasks.list_today(owner)?))
    })
}

#[derive(Debug, Deserialize)]
struct AllTasksQuery {
    filter: Option<String>,
}

async fn all_tasks(
    State(state): State<AppState>,
    AuthedUser(owner): AuthedUser,
    Query(query): Query<AllTasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let scope = match query.filter.as_deref() {
        Some("today") => TaskScope::Today,
        Some("later") => TaskScope::Later,
        // Unknown or absent filters fall back to the full active set.
        _ => TaskScope::All,
    };
    state.with_conn(|conn| {
        let tasks = TaskService::new(SqliteTaskRepository::new(conn));
        Ok(Json(tasks.list_all(owner, scope)?))
    })
}

async fn stats(
    State(state): State<AppState>,
    AuthedUser(owner): AuthedUser,
) -> Result<Json<TaskStats>, ApiError> {
    state.with_conn(|conn| {
        let tasks = TaskService::new(SqliteTaskRepository::new(conn));
        Ok(Json(tasks.stats(owner)?))
    })
}

async fn create_task(
    State(state): State<AppState>,
    AuthedUser(owner): AuthedUser,
    Json(new_task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    state.with_conn(|conn| {
        let tasks = TaskService::new(SqliteTaskRepository::new(conn));
        let task = tasks.create_task(owner, new_task)?;
        Ok((StatusCode::CREATED, Json(task)))
    })
}

async fn update_task(
    State(state): State<AppState>,
    AuthedUser(owner): AuthedUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    state.with_conn(|conn| {
        let tasks = TaskService::new(SqliteTaskRepository::new(conn));
        Ok(Json(tasks.update_task(owner, id, patch)?))
    })
}

async fn toggle_task(
    State(state): State<AppState>,
    AuthedUser(owner): AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    state.with_conn(|conn| {
        let tasks = TaskService::new(SqliteTaskRepository::new(conn));
        Ok(Json(tasks.toggle_completion(owner, id)?))
    })
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    message: &'static str,
}

async fn delete_task(
    State(state): State<AppState>,
    AuthedUser(owner): AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.with_conn(|conn| {
        let tasks = TaskService::new(SqliteTaskRepository::new(conn));
        tasks.delete_task(owner, id)?;
        Ok(Json(DeleteResponse {
            message: "Task deleted successfully",
        }))
    })
}
