//! Property file API endpoints - JSON API
//!
//! Features:
//! - Searchable, paginated file listing
//! - File detail with the full ledger
//! - Account statement (grouping + totals re-derived per request)
//! - Manual ledger editing (flat-sum recompute path)

use crate::error::ApiError;
use crate::{today, AppState};
use axum::extract::{Path, Query};
use plotweb_core::reports::{build_statement, file_standing, FileStanding};
use plotweb_core::Transaction;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// File list item for API response
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileListItem {
    pub file_no: String,
    pub plot_size: String,
    pub owner_name: String,
    pub owner_cnic: String,
    pub plot_value: Decimal,
    pub balance: Decimal,
    pub payment_received: Decimal,
    pub overdue: Decimal,
    pub standing: FileStanding,
}

/// Files list response for API
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FilesResponse {
    pub files: Vec<FileListItem>,
    pub total_count: usize,
    pub page: usize,
    pub per_page: usize,
}

pub async fn api_files_list(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> String {
    let search = query.get("q").map(|s| s.to_lowercase()).unwrap_or_default();
    let page: usize = query
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1)
        .max(1);
    let per_page: usize = query
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(state.config.pagination.records_per_page)
        .max(1);

    let as_of = today();
    let matched: Vec<FileListItem> = state
        .registry
        .files()
        .iter()
        .filter(|f| {
            search.is_empty()
                || f.file_no.to_lowercase().contains(&search)
                || f.owner_name.to_lowercase().contains(&search)
        })
        .map(|f| FileListItem {
            file_no: f.file_no.clone(),
            plot_size: f.plot_size.clone(),
            owner_name: f.owner_name.clone(),
            owner_cnic: f.owner_cnic.clone(),
            plot_value: f.plot_value,
            balance: f.balance,
            payment_received: f.payment_received,
            overdue: f.overdue,
            standing: file_standing(f, as_of),
        })
        .collect();

    let total_count = matched.len();
    let files: Vec<FileListItem> = matched
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    let response = FilesResponse {
        files,
        total_count,
        page,
        per_page,
    };
    serde_json::to_string(&response).unwrap_or_default()
}

pub async fn api_file_detail(
    state: axum::extract::State<AppState>,
    Path(file_no): Path<String>,
) -> Result<String, ApiError> {
    match state.registry.file(&file_no) {
        Some(file) => Ok(serde_json::to_string(&file).unwrap_or_default()),
        None => Err(ApiError::NotFound {
            resource: format!("file {}", file_no),
        }),
    }
}

/// The statement view is re-derived from the raw ledger on every call; it
/// is the source of truth for what the user sees
pub async fn api_file_statement(
    state: axum::extract::State<AppState>,
    Path(file_no): Path<String>,
) -> Result<String, ApiError> {
    match state.registry.file(&file_no) {
        Some(file) => {
            let statement = build_statement(&file, today());
            Ok(serde_json::to_string(&statement).unwrap_or_default())
        }
        None => Err(ApiError::NotFound {
            resource: format!("file {}", file_no),
        }),
    }
}

/// Replace a file's ledger with manually edited rows (flat-sum recompute,
/// no regroup)
pub async fn api_ledger_save(
    state: axum::extract::State<AppState>,
    Path(file_no): Path<String>,
    axum::Json(rows): axum::Json<Vec<Transaction>>,
) -> Result<String, ApiError> {
    let saved = state.registry.save_ledger(&file_no, rows)?;
    if let Err(e) = state.registry.persist().await {
        e.log();
    }
    Ok(serde_json::to_string(&saved).unwrap_or_default())
}
