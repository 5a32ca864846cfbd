//! Raw record types produced by the export parser
//!
//! These are parser-local shapes: one row of the SAP ledger lifted into a
//! typed record, plus the owner/file groupings derived while scanning the
//! export. The core crate converts them into registry models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One ledger row lifted out of a registry export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Display order within the export (1-based data-row index)
    pub seq: u32,
    /// Transaction id from the source system (row sequence when absent)
    pub trans_id: i64,
    /// Sub-line within a transaction (multiple receipts per transaction)
    pub line_id: u32,
    pub short_name: String,
    /// Due date as exported ("DD-Mon-YY"), may be a placeholder
    pub due_date: String,
    /// Amount owed as of this row; zero on receipt-only rows
    pub receivable: Decimal,
    /// 0 = one-off charge, >0 groups rows into one logical installment
    pub installment_no: u32,
    pub installment_name: String,
    pub trans_type: String,
    /// Owning property file (the canonical file identifier)
    pub item_code: String,
    pub plot_type: String,
    pub currency: String,
    pub description: String,
    pub doc_total: Decimal,
    /// Free-text paid/unpaid flag from the source
    pub status: String,
    pub balance: Decimal,
    /// Remaining balance for this row as reported by the source system
    pub os_balance: Decimal,
    pub amount_paid: Decimal,
    pub receipt_date: String,
    pub payment_mode: String,
    pub surcharge: Decimal,
    pub instrument_no: String,
}

/// Owner identity lifted from the export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOwner {
    /// National ID as it appears in the export
    pub cnic: String,
    /// Digits-and-X-only form, used as the merge key
    pub normalized_cnic: String,
    pub name: String,
    pub phone: String,
}

/// One property file plus its ledger rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFile {
    pub file_no: String,
    pub currency_no: String,
    pub plot_size: String,
    pub plot_value: Decimal,
    pub owner_name: String,
    pub owner_cnic: String,
    pub father_name: String,
    pub cell_no: String,
    pub reg_date: String,
    pub address: String,
    pub transactions: Vec<RawTransaction>,
}

/// Result of parsing one export: owners and files in first-seen order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportBatch {
    pub owners: Vec<RawOwner>,
    pub files: Vec<RawFile>,
}

impl ImportBatch {
    /// Total number of ledger rows across all files
    pub fn transaction_count(&self) -> usize {
        self.files.iter().map(|f| f.transactions.len()).sum()
    }
}
