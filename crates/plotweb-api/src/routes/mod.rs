//! Route modules for the API server
//!
//! All routes are organized into modules for better maintainability:
//! - files: Property file list, detail, statement, ledger editing
//! - imports: Registry CSV import and reset
//! - users: Member registry
//! - dashboard: Portfolio summary, payment alerts, assistant snapshot
//! - notices: Announcement management
//! - messages: Direct and broadcast messaging
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints

pub mod dashboard;
pub mod files;
pub mod imports;
pub mod messages;
pub mod notices;
pub mod users;
