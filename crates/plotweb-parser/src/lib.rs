//! SAP registry export parser
//!
//! A lightweight, alias-tolerant CSV parser for SAP Business One ledger
//! exports. Rows are lenient (bad cells degrade, identity-less rows drop);
//! files are strict (a malformed export fails as one unit).

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub mod types;
pub mod parser;

pub use error::ParseError;
pub use parser::SapExportParser;

// Re-export commonly used types
pub use types::{ImportBatch, RawFile, RawOwner, RawTransaction};

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn RegistryParserTrait>;

/// Trait for registry export parsers
#[async_trait]
pub trait RegistryParserTrait: Send + Sync {
    /// Parse export text into an import batch
    async fn parse(&self, content: &str) -> Result<ImportBatch, ParseError>;

    /// Parse an export from a file path
    async fn parse_file(&self, path: PathBuf) -> Result<ImportBatch, ParseError>;
}

/// Default parser implementation
#[derive(Debug, Default)]
pub struct DefaultRegistryParser;

#[async_trait]
impl RegistryParserTrait for DefaultRegistryParser {
    async fn parse(&self, content: &str) -> Result<ImportBatch, ParseError> {
        SapExportParser::parse(content)
    }

    async fn parse_file(&self, path: PathBuf) -> Result<ImportBatch, ParseError> {
        let content = tokio::fs::read_to_string(&path).await?;
        SapExportParser::parse(&content)
    }
}
