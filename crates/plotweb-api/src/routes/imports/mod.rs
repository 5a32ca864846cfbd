//! Registry import routes

pub mod api;

pub use api::{api_import, api_reset};
