//! Registry import API endpoints - JSON API
//!
//! The request body is the raw CSV export text. The whole batch either
//! parses and lands in the registry, or the import fails with one error
//! and the registry is untouched.

use crate::error::ApiError;
use crate::{today, AppState};
use axum::extract::Query;
use plotweb_config::SyncMode;
use std::collections::HashMap;

pub async fn api_import(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
    body: String,
) -> Result<String, ApiError> {
    let mode = match query.get("mode") {
        Some(raw) => raw
            .parse::<SyncMode>()
            .map_err(|message| ApiError::BadRequest { message })?,
        None => state.config.import.default_mode,
    };

    let report = state.registry.import_export(&body, mode, today()).await?;
    if let Err(e) = state.registry.persist().await {
        e.log();
    }
    Ok(serde_json::to_string(&report).unwrap_or_default())
}

/// Clear the registry back to its empty default and persist the cleared
/// state
pub async fn api_reset(state: axum::extract::State<AppState>) -> String {
    state.registry.reset();
    match state.registry.persist().await {
        Ok(_) => r#"{"success": true, "message": "Registry reset"}"#.to_string(),
        Err(e) => {
            e.log();
            format!(r#"{{"success": false, "message": "{}"}}"#, e)
        }
    }
}
