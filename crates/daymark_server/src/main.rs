//! HTTP server entry point.
//!
//! # Responsibility
//! - Wire configuration from the environment into core bootstrap.
//! - Serve the router until shutdown is requested.

use std::env;
use std::net::SocketAddr;

use daymark_core::db::open_db;
use daymark_core::{default_log_level, init_logging, TokenSigner};
use daymark_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(log_dir) = env::var("DAYMARK_LOG_DIR") {
        let level = env::var("DAYMARK_LOG_LEVEL").unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, &log_dir)?;
    }

    let bind = env::var("DAYMARK_HTTP_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let addr: SocketAddr = bind.parse()?;

    let db_path = env::var("DAYMARK_DB_PATH").unwrap_or_else(|_| "daymark.db3".to_string());
    let conn = open_db(&db_path)?;

    let key_path =
        env::var("DAYMARK_TOKEN_KEY_PATH").unwrap_or_else(|_| "daymark.token.key".to_string());
    let signer = TokenSigner::load_or_create(&key_path)?;

    let app = build_router(AppState::new(conn, signer));

    println!("daymark_server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No interrupt handler available; park and rely on a hard kill.
        std::future::pending::<()>().await;
    }
}
