//! Messaging routes

pub mod api;

pub use api::{api_message_read, api_message_send, api_messages_list};
