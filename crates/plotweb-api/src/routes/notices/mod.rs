//! Announcement routes

pub mod api;

pub use api::{api_notice_create, api_notice_delete, api_notices_list};
