//! Dashboard and assistant snapshot routes

pub mod api;

pub use api::{api_alerts, api_portfolio, api_snapshot};
