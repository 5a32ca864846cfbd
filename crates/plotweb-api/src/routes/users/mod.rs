//! Member registry routes

pub mod api;

pub use api::{api_user_files, api_users_list};
