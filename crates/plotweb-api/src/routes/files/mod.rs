//! Property file routes

pub mod api;

pub use api::{api_file_detail, api_file_statement, api_files_list, api_ledger_save};
