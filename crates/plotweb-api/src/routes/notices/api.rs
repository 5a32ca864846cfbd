//! Announcement API endpoints - JSON API

use crate::error::ApiError;
use crate::AppState;
use axum::extract::Path;
use plotweb_core::NoticeKind;

/// Payload for creating a notice
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NoticeCreate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub kind: NoticeKind,
}

pub async fn api_notices_list(state: axum::extract::State<AppState>) -> String {
    serde_json::to_string(&state.registry.notices()).unwrap_or_default()
}

pub async fn api_notice_create(
    state: axum::extract::State<AppState>,
    axum::Json(payload): axum::Json<NoticeCreate>,
) -> String {
    let date = chrono::Local::now().format("%d-%b-%Y").to_string();
    let notice = state
        .registry
        .add_notice(payload.title, payload.content, payload.kind, date);
    if let Err(e) = state.registry.persist().await {
        e.log();
    }
    serde_json::to_string(&notice).unwrap_or_default()
}

pub async fn api_notice_delete(
    state: axum::extract::State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    if state.registry.delete_notice(&id) {
        if let Err(e) = state.registry.persist().await {
            e.log();
        }
        Ok(r#"{"success": true}"#.to_string())
    } else {
        Err(ApiError::NotFound {
            resource: format!("notice {}", id),
        })
    }
}
