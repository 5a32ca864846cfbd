//! Messaging API endpoints - JSON API
//!
//! Visibility is role-based: admins see all traffic, clients see their own
//! messages and broadcasts (receiver "ALL").

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, Query};
use plotweb_core::{Message, MessageKind, UserRole};
use std::collections::HashMap;

/// Messages list response for API
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub unread_count: usize,
}

/// Payload for sending a message
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageSend {
    pub sender_id: String,
    pub sender_name: String,
    pub receiver_id: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub file_id: Option<String>,
}

pub async fn api_messages_list(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> Result<String, ApiError> {
    let user_id = query.get("user_id").ok_or_else(|| ApiError::BadRequest {
        message: "user_id query parameter is required".to_string(),
    })?;
    let is_admin = state
        .registry
        .user(user_id)
        .map(|u| u.role == UserRole::Admin)
        .unwrap_or(false);

    let response = MessagesResponse {
        messages: state.registry.visible_messages(user_id, is_admin),
        unread_count: state.registry.unread_count(user_id),
    };
    Ok(serde_json::to_string(&response).unwrap_or_default())
}

pub async fn api_message_send(
    state: axum::extract::State<AppState>,
    axum::Json(payload): axum::Json<MessageSend>,
) -> String {
    let kind = if payload.receiver_id == "ALL" {
        MessageKind::Broadcast
    } else {
        MessageKind::Direct
    };
    let message = state.registry.send_message(Message {
        id: String::new(),
        sender_id: payload.sender_id,
        sender_name: payload.sender_name,
        receiver_id: payload.receiver_id,
        subject: payload.subject,
        body: payload.body,
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        is_read: false,
        file_id: payload.file_id,
        kind,
    });
    if let Err(e) = state.registry.persist().await {
        e.log();
    }
    serde_json::to_string(&message).unwrap_or_default()
}

pub async fn api_message_read(
    state: axum::extract::State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    state.registry.mark_read(&id)?;
    if let Err(e) = state.registry.persist().await {
        e.log();
    }
    Ok(r#"{"success": true}"#.to_string())
}
