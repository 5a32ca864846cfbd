//! HTTP JSON API server for the property registry
//!
//! Routes are organized into modules:
//! - routes::files: File list, detail, statement, ledger editing
//! - routes::imports: SAP registry CSV import
//! - routes::users: Member registry
//! - routes::dashboard: Portfolio summary, alerts, assistant snapshot
//! - routes::notices: Announcement management
//! - routes::messages: Direct and broadcast messaging
//!
//! The statement endpoint re-runs grouping and aggregation on every request;
//! persisted file totals are never trusted for display.

pub mod error;
pub mod routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use plotweb_config::Config;
use plotweb_core::{Registry, RegistryOperations};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub config: Config,
}

/// The calendar day used for every overdue classification in this request
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{api_alerts, api_portfolio, api_snapshot};
    use routes::files::{api_file_detail, api_file_statement, api_files_list, api_ledger_save};
    use routes::imports::{api_import, api_reset};
    use routes::messages::{api_message_read, api_message_send, api_messages_list};
    use routes::notices::{api_notice_create, api_notice_delete, api_notices_list};
    use routes::users::{api_user_files, api_users_list};

    let mut router = Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .route("/api/import", post(api_import))
        .route("/api/reset", post(api_reset))
        .route("/api/files", get(api_files_list))
        .route("/api/files/:file_no", get(api_file_detail))
        .route("/api/files/:file_no/statement", get(api_file_statement))
        .route("/api/files/:file_no/ledger", put(api_ledger_save))
        .route("/api/users", get(api_users_list))
        .route("/api/users/:id/files", get(api_user_files))
        .route("/api/portfolio", get(api_portfolio))
        .route("/api/alerts", get(api_alerts))
        .route("/api/snapshot", get(api_snapshot));

    if state.config.features.notices_enable {
        router = router
            .route("/api/notices", get(api_notices_list))
            .route("/api/notices", post(api_notice_create))
            .route("/api/notices/:id", delete(api_notice_delete));
    }

    if state.config.features.messages_enable {
        router = router
            .route("/api/messages", get(api_messages_list))
            .route("/api/messages", post(api_message_send))
            .route("/api/messages/:id/read", post(api_message_read));
    }

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Get registry summary (JSON API)
async fn api_summary(state: axum::extract::State<AppState>) -> String {
    let summary = state.registry.summary();
    serde_json::to_string(&summary).unwrap_or_default()
}

/// Start the HTTP server
///
/// This is the main entry point for the Plotweb server. It creates the
/// router, binds to the configured address, and serves until shutdown.
pub async fn start_server(config: Config, registry: Arc<Registry>) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { registry, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await.unwrap();
    eprintln!("[INFO] Starting Plotweb server on http://{}", addr);
    eprintln!("[INFO] Available routes:");
    eprintln!("[INFO]   - /api/import (Registry CSV import)");
    eprintln!("[INFO]   - /api/files (Property files)");
    eprintln!("[INFO]   - /api/files/:file_no/statement (Account statement)");
    eprintln!("[INFO]   - /api/users (Member registry)");
    eprintln!("[INFO]   - /api/portfolio, /api/alerts, /api/snapshot");
    eprintln!("[INFO]   - /api/notices, /api/messages");

    match axum::serve(listener, router).await {
        Ok(_) => eprintln!("[INFO] Server stopped gracefully"),
        Err(e) => eprintln!("[ERROR] Server error: {}", e),
    }
}
