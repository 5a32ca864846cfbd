//! Registry snapshot persistence
//!
//! The registry is durably stored as one JSON document under the configured
//! data directory. Whether that file is later synced anywhere else is a
//! collaborator's concern.

use std::path::Path;

use crate::error::CoreError;
use crate::RegistryData;

/// Load a registry snapshot from disk
pub async fn load(path: &Path) -> Result<RegistryData, CoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|e| CoreError::InvalidFormat {
        message: e.to_string(),
    })
}

/// Save a registry snapshot, creating the data directory if needed
pub async fn save_value(path: &Path, snapshot: &serde_json::Value) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(snapshot).map_err(|e| CoreError::InvalidFormat {
        message: e.to_string(),
    })?;
    tokio::fs::write(path, content).await?;
    Ok(())
}
