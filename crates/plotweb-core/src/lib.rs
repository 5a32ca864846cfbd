//! Core registry processing and business logic
//!
//! Holds the portal's in-memory registry (users, property files, notices,
//! messages), converts parsed SAP exports into registry models, derives
//! per-file totals through the statement engine, and applies the import
//! merge policy.

pub mod dates;
pub mod error;
pub mod reports;
pub mod statement;
pub mod store;

use chrono::NaiveDate;
use plotweb_config::{Config, SyncMode};
use plotweb_parser::{ImportBatch, RawFile, RawOwner, RawTransaction, RegistryParserTrait};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub use error::{CoreError, ErrorCode, ErrorSeverity};
pub use statement::{
    compute_totals, group_transactions, summarize, FileSummary, GroupedLedger, InstallmentGroup,
    StatementTotals,
};

/// Parser reference type
pub type ParserRef = Arc<dyn RegistryParserTrait>;

// ==================== Registry Models ====================

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Property owner with access to their own files
    Client,
    /// Portal administrator
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Client
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(UserRole::Client),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Client => write!(f, "CLIENT"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}

/// Portal user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// National ID as entered; normalized form is the join key
    pub cnic: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
    /// Mock credential; authentication itself lives outside this core
    pub password: String,
}

impl User {
    /// Digits-and-X-only national ID, used to join against file ownership
    pub fn normalized_cnic(&self) -> String {
        plotweb_utils::normalize_cnic(&self.cnic)
    }
}

/// One accounting event line from the external ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Display order within the file
    pub seq: u32,
    pub trans_id: i64,
    /// Sub-line within a transaction (multiple receipts per transaction)
    pub line_id: u32,
    pub short_name: String,
    /// Textual due date ("DD-Mon-YY"); may be a placeholder
    pub due_date: String,
    /// Amount owed as of this row; zero on receipt-only rows
    pub receivable: Decimal,
    /// 0 = one-off charge, >0 groups rows into one logical installment
    pub installment_no: u32,
    pub installment_name: String,
    pub trans_type: String,
    /// Owning property file
    pub item_code: String,
    pub plot_type: String,
    pub currency: String,
    pub description: String,
    pub doc_total: Decimal,
    pub status: String,
    pub balance: Decimal,
    /// Remaining balance as reported by the source system; authoritative
    /// except during manual edits
    pub os_balance: Decimal,
    pub amount_paid: Decimal,
    pub receipt_date: String,
    pub payment_mode: String,
    pub surcharge: Decimal,
    pub instrument_no: String,
}

impl Transaction {
    /// Manual-edit recompute for this row only
    pub fn recompute_os_balance(&mut self) {
        self.os_balance = (self.receivable - self.amount_paid).max(Decimal::ZERO);
    }

    /// Parsed due date, if usable
    pub fn due_date_naive(&self) -> Option<NaiveDate> {
        dates::parse_ledger_date(&self.due_date)
    }

    /// Parsed receipt date, if usable
    pub fn receipt_date_naive(&self) -> Option<NaiveDate> {
        dates::parse_ledger_date(&self.receipt_date)
    }
}

impl From<RawTransaction> for Transaction {
    fn from(raw: RawTransaction) -> Self {
        Transaction {
            seq: raw.seq,
            trans_id: raw.trans_id,
            line_id: raw.line_id,
            short_name: raw.short_name,
            due_date: raw.due_date,
            receivable: raw.receivable,
            installment_no: raw.installment_no,
            installment_name: raw.installment_name,
            trans_type: raw.trans_type,
            item_code: raw.item_code,
            plot_type: raw.plot_type,
            currency: raw.currency,
            description: raw.description,
            doc_total: raw.doc_total,
            status: raw.status,
            balance: raw.balance,
            os_balance: raw.os_balance,
            amount_paid: raw.amount_paid,
            receipt_date: raw.receipt_date,
            payment_mode: raw.payment_mode,
            surcharge: raw.surcharge,
            instrument_no: raw.instrument_no,
        }
    }
}

/// One owned asset record with its full payment ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyFile {
    /// Unique key (the source item code)
    pub file_no: String,
    pub currency_no: String,
    pub plot_size: String,
    pub plot_value: Decimal,
    /// Derived: outstanding balance. Never authored directly.
    pub balance: Decimal,
    /// Derived: sum of receipt paid amounts
    pub payment_received: Decimal,
    /// Derived: sum of receipt surcharges
    pub surcharge: Decimal,
    /// Derived: total overdue amount
    pub overdue: Decimal,
    /// Owner identity, duplicated from the owning user for display
    /// independence
    pub owner_name: String,
    pub owner_cnic: String,
    pub father_name: String,
    pub cell_no: String,
    pub reg_date: String,
    pub address: String,
    /// Ledger rows, owned exclusively by this file
    pub transactions: Vec<Transaction>,
}

impl PropertyFile {
    /// Normalized owner national ID
    pub fn normalized_owner_cnic(&self) -> String {
        plotweb_utils::normalize_cnic(&self.owner_cnic)
    }

    /// Recompute the derived summary fields from the ledger
    pub fn refresh_summary(&mut self, as_of: NaiveDate) {
        let summary = statement::summarize(&self.transactions, as_of);
        self.payment_received = summary.payment_received;
        self.surcharge = summary.surcharge;
        self.balance = summary.balance;
        self.overdue = summary.overdue;
    }
}

impl From<RawFile> for PropertyFile {
    fn from(raw: RawFile) -> Self {
        PropertyFile {
            file_no: raw.file_no,
            currency_no: raw.currency_no,
            plot_size: raw.plot_size,
            plot_value: raw.plot_value,
            balance: Decimal::ZERO,
            payment_received: Decimal::ZERO,
            surcharge: Decimal::ZERO,
            overdue: Decimal::ZERO,
            owner_name: raw.owner_name,
            owner_cnic: raw.owner_cnic,
            father_name: raw.father_name,
            cell_no: raw.cell_no,
            reg_date: raw.reg_date,
            address: raw.address,
            transactions: raw.transactions.into_iter().map(Transaction::from).collect(),
        }
    }
}

/// Notice type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoticeKind {
    Public,
    Policy,
    Alert,
}

impl Default for NoticeKind {
    fn default() -> Self {
        NoticeKind::Public
    }
}

/// Public announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub kind: NoticeKind,
}

/// Message type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MessageKind {
    Direct,
    Broadcast,
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Direct
    }
}

/// Portal message, direct or broadcast ("ALL" receiver)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub receiver_id: String,
    pub subject: String,
    pub body: String,
    pub date: String,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub kind: MessageKind,
}

/// In-memory registry data
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegistryData {
    pub users: Vec<User>,
    pub files: Vec<PropertyFile>,
    pub notices: Vec<Notice>,
    pub messages: Vec<Message>,
}

// ==================== Import Merge Policy ====================

/// Outcome of one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub mode: SyncMode,
    pub users_imported: usize,
    pub files_imported: usize,
    pub transactions_imported: usize,
}

/// Merge imported users into the existing collection.
///
/// Replace mode discards the existing collection; merge mode upserts by
/// normalized national ID, keeping existing-first order and appending new
/// records in their import order.
pub fn merge_users(existing: Vec<User>, imported: Vec<User>, mode: SyncMode) -> Vec<User> {
    match mode {
        SyncMode::Replace => imported,
        SyncMode::Merge => upsert_by_key(existing, imported, |u| u.normalized_cnic()),
    }
}

/// Merge imported property files into the existing collection, keyed by
/// file number
pub fn merge_files(
    existing: Vec<PropertyFile>,
    imported: Vec<PropertyFile>,
    mode: SyncMode,
) -> Vec<PropertyFile> {
    match mode {
        SyncMode::Replace => imported,
        SyncMode::Merge => upsert_by_key(existing, imported, |f| f.file_no.clone()),
    }
}

/// Last-write-wins upsert preserving first-insertion order per key
fn upsert_by_key<T, F: Fn(&T) -> String>(existing: Vec<T>, imported: Vec<T>, key: F) -> Vec<T> {
    let mut order: Vec<String> = Vec::new();
    let mut map: HashMap<String, T> = HashMap::new();
    for record in existing.into_iter().chain(imported) {
        let k = key(&record);
        if !map.contains_key(&k) {
            order.push(k.clone());
        }
        map.insert(k, record);
    }
    order
        .into_iter()
        .map(|k| map.remove(&k).expect("upserted key is tracked"))
        .collect()
}

// ==================== Registry ====================

/// Main registry structure
pub struct Registry {
    config: Config,
    parser: ParserRef,
    data: RwLock<RegistryData>,
}

impl Registry {
    /// Create a new empty registry with config and parser
    pub fn new(config: Config, parser: ParserRef) -> Self {
        Self {
            config,
            parser,
            data: RwLock::new(RegistryData::default()),
        }
    }

    /// Access the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the persisted registry snapshot, if one exists
    pub async fn load(&self) -> Result<(), CoreError> {
        let path = self.config.registry_path();
        if !path.exists() {
            log::info!("No registry snapshot at {}, starting empty", path.display());
            return Ok(());
        }
        let loaded = store::load(&path).await?;
        let mut data = self.data.write().unwrap();
        *data = loaded;
        log::info!(
            "Registry loaded: {} users, {} files",
            data.users.len(),
            data.files.len()
        );
        Ok(())
    }

    /// Persist the registry snapshot when autosave is enabled
    pub async fn persist(&self) -> Result<(), CoreError> {
        if !self.config.data.autosave {
            return Ok(());
        }
        let snapshot = {
            let data = self.data.read().unwrap();
            serde_json::to_value(&*data)
                .map_err(|e| CoreError::InvalidFormat { message: e.to_string() })?
        };
        store::save_value(&self.config.registry_path(), &snapshot).await
    }

    /// Import a registry export and fold it into the registry.
    ///
    /// The whole batch is parsed before any state changes; a structurally
    /// invalid export aborts with no registry mutation.
    pub async fn import_export(
        &self,
        content: &str,
        mode: SyncMode,
        as_of: NaiveDate,
    ) -> Result<ImportReport, CoreError> {
        let batch = self
            .parser
            .parse(content)
            .await
            .map_err(|e| CoreError::ImportFailed { message: e.to_string() })?;

        let report = ImportReport {
            mode,
            users_imported: batch.owners.len(),
            files_imported: batch.files.len(),
            transactions_imported: batch.transaction_count(),
        };

        let (users, files) = self.convert_batch(batch, as_of);
        {
            let mut data = self.data.write().unwrap();
            let existing_users = std::mem::take(&mut data.users);
            let existing_files = std::mem::take(&mut data.files);
            data.users = merge_users(existing_users, users, mode);
            data.files = merge_files(existing_files, files, mode);
        }

        log::info!(
            "Import complete ({}): {} users, {} files, {} rows",
            report.mode,
            report.users_imported,
            report.files_imported,
            report.transactions_imported
        );
        Ok(report)
    }

    /// Convert a parsed batch into registry models, deriving file summary
    /// fields as of the given day
    fn convert_batch(&self, batch: ImportBatch, as_of: NaiveDate) -> (Vec<User>, Vec<PropertyFile>) {
        let users = batch
            .owners
            .iter()
            .map(|owner| self.user_from_owner(owner))
            .collect();
        let files = batch
            .files
            .into_iter()
            .map(|raw| {
                let mut file = PropertyFile::from(raw);
                file.refresh_summary(as_of);
                file
            })
            .collect();
        (users, files)
    }

    /// Synthesize a login-capable account for an imported owner
    fn user_from_owner(&self, owner: &RawOwner) -> User {
        let import = &self.config.import;
        User {
            id: format!("user-{}", owner.normalized_cnic),
            cnic: owner.cnic.clone(),
            name: owner.name.clone(),
            email: format!("{}@{}", owner.normalized_cnic, import.email_domain),
            phone: owner.phone.clone(),
            role: UserRole::Client,
            status: UserStatus::Active,
            password: import.default_password.clone(),
        }
    }

    // ==================== Accessors ====================

    /// All users
    pub fn users(&self) -> Vec<User> {
        self.data.read().unwrap().users.clone()
    }

    /// All property files
    pub fn files(&self) -> Vec<PropertyFile> {
        self.data.read().unwrap().files.clone()
    }

    /// One property file by file number
    pub fn file(&self, file_no: &str) -> Option<PropertyFile> {
        self.data
            .read()
            .unwrap()
            .files
            .iter()
            .find(|f| f.file_no == file_no)
            .cloned()
    }

    /// Files owned by the holder of a national ID (normalized comparison)
    pub fn files_for_cnic(&self, cnic: &str) -> Vec<PropertyFile> {
        let normalized = plotweb_utils::normalize_cnic(cnic);
        self.data
            .read()
            .unwrap()
            .files
            .iter()
            .filter(|f| f.normalized_owner_cnic() == normalized)
            .cloned()
            .collect()
    }

    /// One user by id
    pub fn user(&self, id: &str) -> Option<User> {
        self.data
            .read()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    // ==================== Manual Ledger Editing ====================

    /// Replace a file's ledger with manually edited rows.
    ///
    /// Rows whose receivable or paid amount changed (and rows that are new)
    /// get their outstanding balance recomputed as
    /// `max(0, receivable - paid)`; file totals are then a flat sum of paid
    /// amounts and outstanding balances over all rows. This path does not
    /// regroup and leaves `surcharge`/`overdue` untouched.
    pub fn save_ledger(
        &self,
        file_no: &str,
        mut rows: Vec<Transaction>,
    ) -> Result<PropertyFile, CoreError> {
        let mut data = self.data.write().unwrap();
        let file = data
            .files
            .iter_mut()
            .find(|f| f.file_no == file_no)
            .ok_or_else(|| CoreError::FileNotFound {
                file_no: file_no.to_string(),
            })?;

        for row in rows.iter_mut() {
            let previous = file
                .transactions
                .iter()
                .find(|t| t.trans_id == row.trans_id && t.line_id == row.line_id);
            match previous {
                Some(old)
                    if old.receivable == row.receivable && old.amount_paid == row.amount_paid => {}
                _ => row.recompute_os_balance(),
            }
        }

        rows.sort_by_key(|t| t.seq);
        file.payment_received = rows.iter().map(|t| t.amount_paid).sum();
        file.balance = rows.iter().map(|t| t.os_balance).sum();
        file.transactions = rows;
        Ok(file.clone())
    }

    // ==================== Notices ====================

    /// All notices, newest first
    pub fn notices(&self) -> Vec<Notice> {
        self.data.read().unwrap().notices.clone()
    }

    /// Prepend a new notice
    pub fn add_notice(&self, title: String, content: String, kind: NoticeKind, date: String) -> Notice {
        let notice = Notice {
            id: plotweb_utils::generate_id(),
            title,
            content,
            date,
            kind,
        };
        self.data.write().unwrap().notices.insert(0, notice.clone());
        notice
    }

    /// Delete a notice by id
    pub fn delete_notice(&self, id: &str) -> bool {
        let mut data = self.data.write().unwrap();
        let before = data.notices.len();
        data.notices.retain(|n| n.id != id);
        data.notices.len() != before
    }

    // ==================== Messages ====================

    /// Messages visible to a user: admins see everything, clients see
    /// their own, broadcasts, and what they sent
    pub fn visible_messages(&self, user_id: &str, is_admin: bool) -> Vec<Message> {
        self.data
            .read()
            .unwrap()
            .messages
            .iter()
            .filter(|m| {
                is_admin || m.receiver_id == user_id || m.receiver_id == "ALL" || m.sender_id == user_id
            })
            .cloned()
            .collect()
    }

    /// Unread messages addressed directly to a user
    pub fn unread_count(&self, user_id: &str) -> usize {
        self.data
            .read()
            .unwrap()
            .messages
            .iter()
            .filter(|m| !m.is_read && m.receiver_id == user_id)
            .count()
    }

    /// Prepend a new message
    pub fn send_message(&self, mut message: Message) -> Message {
        if message.id.is_empty() {
            message.id = plotweb_utils::generate_id();
        }
        self.data.write().unwrap().messages.insert(0, message.clone());
        message
    }

    /// Mark one message as read
    pub fn mark_read(&self, id: &str) -> Result<(), CoreError> {
        let mut data = self.data.write().unwrap();
        match data.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.is_read = true;
                Ok(())
            }
            None => Err(CoreError::MessageNotFound { id: id.to_string() }),
        }
    }

    // ==================== Maintenance ====================

    /// Clear the registry back to its empty default
    pub fn reset(&self) {
        let mut data = self.data.write().unwrap();
        *data = RegistryData::default();
    }
}

/// Trait for registry operations
pub trait RegistryOperations {
    /// Get registry summary
    fn summary(&self) -> RegistrySummary;
}

/// Registry summary
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrySummary {
    pub total_users: usize,
    pub total_files: usize,
    pub total_transactions: usize,
    /// Flat sum of paid amounts across every ledger row
    pub gross_collection: Decimal,
    /// Sum of per-file outstanding balances
    pub total_outstanding: Decimal,
}

impl RegistryOperations for Registry {
    fn summary(&self) -> RegistrySummary {
        let data = self.data.read().unwrap();
        let gross_collection = data
            .files
            .iter()
            .flat_map(|f| f.transactions.iter())
            .map(|t| t.amount_paid)
            .sum();
        let total_outstanding = data.files.iter().map(|f| f.balance).sum();
        RegistrySummary {
            total_users: data.users.len(),
            total_files: data.files.len(),
            total_transactions: data.files.iter().map(|f| f.transactions.len()).sum(),
            gross_collection,
            total_outstanding,
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use plotweb_parser::DefaultRegistryParser;

    fn test_registry() -> Registry {
        Registry::new(Config::default(), Arc::new(DefaultRegistryParser))
    }

    fn user(cnic: &str, name: &str) -> User {
        User {
            id: format!("user-{}", plotweb_utils::normalize_cnic(cnic)),
            cnic: cnic.to_string(),
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
            role: UserRole::Client,
            status: UserStatus::Active,
            password: String::new(),
        }
    }

    fn file(file_no: &str, owner_cnic: &str) -> PropertyFile {
        PropertyFile {
            file_no: file_no.to_string(),
            owner_cnic: owner_cnic.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_replace_discards_existing() {
        let existing = vec![user("111", "Old")];
        let imported = vec![user("222", "New")];
        let merged = merge_users(existing, imported, SyncMode::Replace);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "New");
    }

    #[test]
    fn test_merge_upsert_overwrites_by_key() {
        let existing = vec![user("111-1", "Before"), user("222", "Kept")];
        // Same normalized key as "111-1", different spelling
        let imported = vec![user("1111", "After"), user("333", "Added")];
        let merged = merge_users(existing, imported, SyncMode::Merge);
        let names: Vec<&str> = merged.iter().map(|u| u.name.as_str()).collect();
        // Existing-first order, new records appended in import order
        assert_eq!(names, vec!["After", "Kept", "Added"]);
    }

    #[test]
    fn test_merge_upsert_is_idempotent() {
        let existing = vec![file("F-1", "111"), file("F-2", "222")];
        let imported = vec![file("F-2", "222"), file("F-3", "333")];
        let once = merge_files(existing.clone(), imported.clone(), SyncMode::Merge);
        let twice = merge_files(once.clone(), imported, SyncMode::Merge);
        assert_eq!(once.len(), 3);
        assert_eq!(twice.len(), 3);
        let keys: Vec<&str> = twice.iter().map(|f| f.file_no.as_str()).collect();
        assert_eq!(keys, vec!["F-1", "F-2", "F-3"]);
    }

    #[test]
    fn test_recompute_os_balance_clamps() {
        let mut t = Transaction {
            receivable: Decimal::from(47000),
            amount_paid: Decimal::from(50000),
            ..Default::default()
        };
        t.recompute_os_balance();
        assert_eq!(t.os_balance, Decimal::ZERO);

        t.amount_paid = Decimal::from(20000);
        t.recompute_os_balance();
        assert_eq!(t.os_balance, Decimal::from(27000));
    }

    #[test]
    fn test_save_ledger_flat_sums() {
        let registry = test_registry();
        {
            let mut data = registry.data.write().unwrap();
            let mut f = file("F-1", "111");
            f.transactions = vec![Transaction {
                seq: 1,
                trans_id: 10,
                receivable: Decimal::from(1000),
                amount_paid: Decimal::from(400),
                os_balance: Decimal::from(600),
                ..Default::default()
            }];
            data.files.push(f);
        }

        // Edit the existing row's paid amount and append a new one
        let rows = vec![
            Transaction {
                seq: 2,
                trans_id: 11,
                receivable: Decimal::from(500),
                amount_paid: Decimal::ZERO,
                ..Default::default()
            },
            Transaction {
                seq: 1,
                trans_id: 10,
                receivable: Decimal::from(1000),
                amount_paid: Decimal::from(1000),
                os_balance: Decimal::from(600),
                ..Default::default()
            },
        ];
        let saved = registry.save_ledger("F-1", rows).unwrap();

        // Edited row recomputed, rows sorted by seq, totals flat-summed
        assert_eq!(saved.transactions[0].trans_id, 10);
        assert_eq!(saved.transactions[0].os_balance, Decimal::ZERO);
        assert_eq!(saved.transactions[1].os_balance, Decimal::from(500));
        assert_eq!(saved.payment_received, Decimal::from(1000));
        assert_eq!(saved.balance, Decimal::from(500));
        // The flat path does not touch surcharge or overdue
        assert_eq!(saved.surcharge, Decimal::ZERO);
        assert_eq!(saved.overdue, Decimal::ZERO);
    }

    #[test]
    fn test_save_ledger_keeps_untouched_source_balance() {
        let registry = test_registry();
        {
            let mut data = registry.data.write().unwrap();
            let mut f = file("F-1", "111");
            // Source-reported balance differs from receivable - paid
            f.transactions = vec![Transaction {
                seq: 1,
                trans_id: 10,
                receivable: Decimal::from(1000),
                amount_paid: Decimal::from(400),
                os_balance: Decimal::from(750),
                ..Default::default()
            }];
            data.files.push(f);
        }

        // Same amounts: the authoritative source balance survives
        let rows = vec![Transaction {
            seq: 1,
            trans_id: 10,
            receivable: Decimal::from(1000),
            amount_paid: Decimal::from(400),
            os_balance: Decimal::from(750),
            ..Default::default()
        }];
        let saved = registry.save_ledger("F-1", rows).unwrap();
        assert_eq!(saved.transactions[0].os_balance, Decimal::from(750));
        assert_eq!(saved.balance, Decimal::from(750));
    }

    #[test]
    fn test_save_ledger_unknown_file() {
        let registry = test_registry();
        assert!(registry.save_ledger("NOPE", vec![]).is_err());
    }

    #[test]
    fn test_files_for_cnic_normalizes() {
        let registry = test_registry();
        {
            let mut data = registry.data.write().unwrap();
            data.files.push(file("F-1", "33201-1691812-5"));
            data.files.push(file("F-2", "99999"));
        }
        let files = registry.files_for_cnic("3320116918125");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_no, "F-1");
    }

    #[test]
    fn test_visible_messages_and_unread() {
        let registry = test_registry();
        let base = Message {
            id: String::new(),
            sender_id: "admin".to_string(),
            sender_name: "Admin".to_string(),
            receiver_id: "ALL".to_string(),
            subject: "Welcome".to_string(),
            body: String::new(),
            date: "2024-05-10".to_string(),
            is_read: false,
            file_id: None,
            kind: MessageKind::Broadcast,
        };
        registry.send_message(base.clone());
        registry.send_message(Message {
            receiver_id: "user-1".to_string(),
            kind: MessageKind::Direct,
            ..base.clone()
        });
        registry.send_message(Message {
            receiver_id: "user-2".to_string(),
            kind: MessageKind::Direct,
            ..base
        });

        // Clients see broadcasts plus their own traffic
        assert_eq!(registry.visible_messages("user-1", false).len(), 2);
        // Admins see everything
        assert_eq!(registry.visible_messages("admin-id", true).len(), 3);
        // Unread counts direct messages only
        assert_eq!(registry.unread_count("user-1"), 1);
        assert_eq!(registry.unread_count("missing"), 0);
    }

    #[test]
    fn test_mark_read() {
        let registry = test_registry();
        let sent = registry.send_message(Message {
            id: String::new(),
            sender_id: "admin".to_string(),
            sender_name: "Admin".to_string(),
            receiver_id: "user-1".to_string(),
            subject: "Hi".to_string(),
            body: String::new(),
            date: String::new(),
            is_read: false,
            file_id: None,
            kind: MessageKind::Direct,
        });
        registry.mark_read(&sent.id).unwrap();
        assert_eq!(registry.unread_count("user-1"), 0);
        assert!(registry.mark_read("missing").is_err());
    }

    #[test]
    fn test_notices_prepend_and_delete() {
        let registry = test_registry();
        registry.add_notice("First".into(), "...".into(), NoticeKind::Policy, "19-Apr-2024".into());
        let second = registry.add_notice("Second".into(), "...".into(), NoticeKind::Alert, "20-Apr-2024".into());
        let notices = registry.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].title, "Second");

        assert!(registry.delete_notice(&second.id));
        assert!(!registry.delete_notice(&second.id));
        assert_eq!(registry.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_import_export_end_to_end() {
        let registry = test_registry();
        let csv = [
            "ItemCode,OCNIC,OName,DocTotal,Receivable,U_IntNo,U_IntName,DueDate,ReconSum,RefDate,Markup,BalDueDeb",
            "DGFD1-01001,33201-1691812-5,Imran Khan,7750000,248000,8,BALOON,10-Apr-25,47000,NULL,0,0",
            "DGFD1-01001,33201-1691812-5,Imran Khan,7750000,0,8,BALOON,10-Apr-25,201000,22-Apr-25,2775,0",
            "DGFD1-01001,33201-1691812-5,Imran Khan,7750000,47000,17,INSTALLMENT,10-Jan-26,0,NULL,0,47000",
        ]
        .join("\n");

        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let report = registry
            .import_export(&csv, SyncMode::Merge, as_of)
            .await
            .unwrap();
        assert_eq!(report.users_imported, 1);
        assert_eq!(report.files_imported, 1);
        assert_eq!(report.transactions_imported, 3);

        let users = registry.users();
        assert_eq!(users[0].id, "user-3320116918125");
        assert_eq!(users[0].role, UserRole::Client);
        assert!(users[0].email.starts_with("3320116918125@"));

        let file = registry.file("DGFD1-01001").unwrap();
        // Installment 8 settles (248000 paid), installment 17 remains open
        assert_eq!(file.payment_received, Decimal::from(248000));
        assert_eq!(file.surcharge, Decimal::from(2775));
        assert_eq!(file.balance, Decimal::from(47000));
        // Installment 17 is due 2026: nothing overdue as of mid-2025
        assert_eq!(file.overdue, Decimal::ZERO);

        // Re-importing the same batch does not grow the registry
        registry
            .import_export(&csv, SyncMode::Merge, as_of)
            .await
            .unwrap();
        assert_eq!(registry.users().len(), 1);
        assert_eq!(registry.files().len(), 1);
    }

    #[tokio::test]
    async fn test_import_structural_failure_leaves_registry_untouched() {
        let registry = test_registry();
        {
            let mut data = registry.data.write().unwrap();
            data.files.push(file("F-1", "111"));
        }
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let err = registry
            .import_export("itemcode,ocnic\n", SyncMode::Replace, as_of)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ImportFailed);
        assert_eq!(registry.files().len(), 1);
    }

    #[test]
    fn test_registry_summary() {
        let registry = test_registry();
        {
            let mut data = registry.data.write().unwrap();
            let mut f = file("F-1", "111");
            f.balance = Decimal::from(5000);
            f.transactions = vec![
                Transaction {
                    amount_paid: Decimal::from(700),
                    ..Default::default()
                },
                Transaction {
                    amount_paid: Decimal::from(300),
                    ..Default::default()
                },
            ];
            data.files.push(f);
            data.users.push(user("111", "Alice"));
        }
        let summary = registry.summary();
        assert_eq!(summary.total_users, 1);
        assert_eq!(summary.total_files, 1);
        assert_eq!(summary.total_transactions, 2);
        assert_eq!(summary.gross_collection, Decimal::from(1000));
        assert_eq!(summary.total_outstanding, Decimal::from(5000));
    }

    #[test]
    fn test_reset_clears_registry() {
        let registry = test_registry();
        {
            let mut data = registry.data.write().unwrap();
            data.files.push(file("F-1", "111"));
            data.users.push(user("111", "Alice"));
        }
        registry.reset();
        assert!(registry.files().is_empty());
        assert!(registry.users().is_empty());
    }

    #[test]
    fn test_user_role_serde_wire_format() {
        let json = serde_json::to_string(&UserRole::Client).unwrap();
        assert_eq!(json, "\"CLIENT\"");
        let role: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }
}
