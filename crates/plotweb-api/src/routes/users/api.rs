//! Member registry API endpoints - JSON API

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, Query};
use plotweb_core::{User, UserRole, UserStatus};
use std::collections::HashMap;

/// User list item; credentials never leave the server
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserListItem {
    pub id: String,
    pub cnic: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
}

impl From<&User> for UserListItem {
    fn from(u: &User) -> Self {
        UserListItem {
            id: u.id.clone(),
            cnic: u.cnic.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            role: u.role,
            status: u.status,
        }
    }
}

/// Users list response for API
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserListItem>,
    pub total_count: usize,
}

pub async fn api_users_list(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> String {
    let search = query.get("q").map(|s| s.to_lowercase()).unwrap_or_default();
    let users: Vec<UserListItem> = state
        .registry
        .users()
        .iter()
        .filter(|u| {
            search.is_empty()
                || u.name.to_lowercase().contains(&search)
                || u.cnic.contains(search.as_str())
        })
        .map(UserListItem::from)
        .collect();

    let response = UsersResponse {
        total_count: users.len(),
        users,
    };
    serde_json::to_string(&response).unwrap_or_default()
}

/// Files owned by one user, joined through the normalized national ID
pub async fn api_user_files(
    state: axum::extract::State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    match state.registry.user(&id) {
        Some(user) => {
            let files = state.registry.files_for_cnic(&user.cnic);
            Ok(serde_json::to_string(&files).unwrap_or_default())
        }
        None => Err(ApiError::NotFound {
            resource: format!("user {}", id),
        }),
    }
}
