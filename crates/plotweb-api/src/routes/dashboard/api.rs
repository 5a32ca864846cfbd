//! Dashboard API endpoints - JSON API
//!
//! Portfolio figures and alerts for a client's files (selected by national
//! ID), plus the reduced registry snapshot the assistant collaborator
//! consumes.

use crate::{today, AppState};
use axum::extract::Query;
use plotweb_core::reports::{payment_alerts, portfolio_summary, snapshot};
use std::collections::HashMap;

/// Files in scope: one owner's when `cnic` is given, the whole registry
/// otherwise (supervisor view)
fn scoped_files(
    state: &AppState,
    query: &HashMap<String, String>,
) -> Vec<plotweb_core::PropertyFile> {
    match query.get("cnic") {
        Some(cnic) => state.registry.files_for_cnic(cnic),
        None => state.registry.files(),
    }
}

pub async fn api_portfolio(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> String {
    let files = scoped_files(&state, &query);
    let summary = portfolio_summary(&files);
    serde_json::to_string(&summary).unwrap_or_default()
}

pub async fn api_alerts(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> String {
    let files = scoped_files(&state, &query);
    let alerts = payment_alerts(&files, today());
    serde_json::to_string(&alerts).unwrap_or_default()
}

pub async fn api_snapshot(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> String {
    let files = scoped_files(&state, &query);
    let snap = snapshot(&files, state.config.features.snapshot_receipts);
    serde_json::to_string(&snap).unwrap_or_default()
}
