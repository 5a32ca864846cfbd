//! Report structures for API responses
//!
//! The statement view re-derives grouping and totals from the raw ledger on
//! every call; the persisted per-file fields are summary data only. The
//! `as_of` day is always supplied by the caller.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::{epoch_date, parse_ledger_date};
use crate::statement::{compute_totals, group_transactions, other_row_overdue, StatementTotals};
use crate::{PropertyFile, Transaction};

// ==================== Account Statement ====================

/// Statement section a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementSection {
    /// Installment plan rows
    Plan,
    /// One-off, non-installment rows
    Other,
}

/// One printable statement line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRow {
    pub section: StatementSection,
    /// Definition columns; filled only on the first row of a group
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_no: Option<u32>,
    pub installment_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receivable: Option<Decimal>,
    /// Receipt columns
    pub receipt_date: String,
    pub payment_mode: String,
    pub instrument_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,
    /// Remaining balance; on plan rows only the last receipt of an
    /// unsettled group carries it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Decimal>,
    /// Highlight flag: the row belongs to an overdue obligation
    pub overdue: bool,
}

/// Full statement payload for one property file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementView {
    pub file_no: String,
    pub owner_name: String,
    pub owner_cnic: String,
    pub father_name: String,
    pub cell_no: String,
    pub address: String,
    pub reg_date: String,
    pub currency_no: String,
    pub plot_size: String,
    pub plot_value: Decimal,
    pub as_of: NaiveDate,
    pub rows: Vec<StatementRow>,
    pub totals: StatementTotals,
}

/// Build the statement for one file, re-running grouping and aggregation
/// over its ledger
pub fn build_statement(file: &PropertyFile, as_of: NaiveDate) -> StatementView {
    let grouped = group_transactions(&file.transactions);
    let totals = compute_totals(&grouped, as_of);
    let mut rows = Vec::new();

    for group in &grouped.plan {
        let def = &group.definition;
        let receivable = def.receivable;
        let overdue = group.is_overdue(as_of);

        if group.receipts.is_empty() {
            // Nothing paid yet: one line carrying the full obligation
            rows.push(StatementRow {
                section: StatementSection::Plan,
                due_date: def.due_date.clone(),
                installment_no: Some(def.installment_no),
                installment_name: def.installment_name.clone(),
                receivable: Some(receivable),
                receipt_date: String::new(),
                payment_mode: String::new(),
                instrument_no: String::new(),
                amount_paid: None,
                os_balance: Some(receivable),
                surcharge: None,
                overdue,
            });
            continue;
        }

        let mut cumulative_paid = Decimal::ZERO;
        let last = group.receipts.len() - 1;
        for (idx, receipt) in group.receipts.iter().enumerate() {
            cumulative_paid += receipt.amount_paid;
            let installment_balance = (receivable - cumulative_paid).max(Decimal::ZERO);
            let show_balance = idx == last && cumulative_paid < receivable;
            let first = idx == 0;
            rows.push(StatementRow {
                section: StatementSection::Plan,
                due_date: if first { def.due_date.clone() } else { String::new() },
                installment_no: if first { Some(def.installment_no) } else { None },
                installment_name: if first {
                    def.installment_name.clone()
                } else {
                    String::new()
                },
                receivable: if first { Some(receivable) } else { None },
                receipt_date: receipt.receipt_date.clone(),
                payment_mode: receipt.payment_mode.clone(),
                instrument_no: receipt.instrument_no.clone(),
                amount_paid: Some(receipt.amount_paid),
                os_balance: if show_balance { Some(installment_balance) } else { None },
                surcharge: Some(receipt.surcharge),
                overdue,
            });
        }
    }

    for t in &grouped.other {
        rows.push(StatementRow {
            section: StatementSection::Other,
            due_date: t.due_date.clone(),
            installment_no: None,
            installment_name: if t.installment_name.is_empty() {
                "Other".to_string()
            } else {
                t.installment_name.clone()
            },
            receivable: Some(t.receivable),
            receipt_date: t.receipt_date.clone(),
            payment_mode: t.payment_mode.clone(),
            instrument_no: t.instrument_no.clone(),
            amount_paid: Some(t.amount_paid),
            os_balance: Some(t.os_balance),
            surcharge: Some(t.surcharge),
            overdue: other_row_overdue(t, as_of),
        });
    }

    StatementView {
        file_no: file.file_no.clone(),
        owner_name: file.owner_name.clone(),
        owner_cnic: file.owner_cnic.clone(),
        father_name: file.father_name.clone(),
        cell_no: file.cell_no.clone(),
        address: file.address.clone(),
        reg_date: file.reg_date.clone(),
        currency_no: file.currency_no.clone(),
        plot_size: file.plot_size.clone(),
        plot_value: file.plot_value,
        as_of,
        rows,
        totals,
    }
}

// ==================== Portfolio Summary ====================

/// Flat portfolio totals across a client's files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_plot_value: Decimal,
    pub total_received: Decimal,
    /// Sum of source-reported row balances
    pub total_outstanding: Decimal,
    pub total_surcharge: Decimal,
    /// Received as a share of received + outstanding, in whole percent
    pub collection_index: u32,
}

/// Flat sums over every ledger row of the given files
pub fn portfolio_summary(files: &[PropertyFile]) -> PortfolioSummary {
    let mut summary = PortfolioSummary::default();
    if files.is_empty() {
        return summary;
    }

    for file in files {
        summary.total_plot_value += file.plot_value;
        for t in &file.transactions {
            summary.total_received += t.amount_paid;
            summary.total_outstanding += t.os_balance;
            summary.total_surcharge += t.surcharge;
        }
    }

    let denominator = summary.total_received + summary.total_outstanding;
    if summary.total_plot_value > Decimal::ZERO && denominator > Decimal::ZERO {
        let index = summary.total_received / denominator * Decimal::from(100);
        summary.collection_index = index.round().to_u32().unwrap_or(0);
    }
    summary
}

// ==================== File Standing & Alerts ====================

/// Per-file standing derived from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStanding {
    /// At least one row is past due with a balance remaining
    ActionRequired,
    /// No overdue rows, but a balance remains
    ActiveLedger,
    /// Fully settled
    Cleared,
}

/// Classify one file as of the given day
pub fn file_standing(file: &PropertyFile, as_of: NaiveDate) -> FileStanding {
    let has_overdue = file.transactions.iter().any(|t| other_row_overdue(t, as_of));
    if has_overdue {
        FileStanding::ActionRequired
    } else if file.balance > Decimal::ZERO {
        FileStanding::ActiveLedger
    } else {
        FileStanding::Cleared
    }
}

/// One dashboard alert: the oldest overdue row of a file, or its next
/// upcoming commitment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAlert {
    pub file_no: String,
    pub plot_size: String,
    pub due_date: String,
    pub installment_name: String,
    /// Outstanding amount for overdue alerts, receivable for upcoming ones
    pub amount: Decimal,
    pub is_overdue: bool,
}

/// Build one alert per file: the oldest overdue row wins; failing that,
/// the next upcoming unpaid commitment. Overdue alerts sort first.
pub fn payment_alerts(files: &[PropertyFile], as_of: NaiveDate) -> Vec<PaymentAlert> {
    let mut alerts = Vec::new();

    for file in files {
        let oldest_overdue = file
            .transactions
            .iter()
            .filter(|t| other_row_overdue(t, as_of))
            .min_by_key(|t| parse_ledger_date(&t.due_date).unwrap_or_else(epoch_date));

        if let Some(t) = oldest_overdue {
            alerts.push(PaymentAlert {
                file_no: file.file_no.clone(),
                plot_size: file.plot_size.clone(),
                due_date: t.due_date.clone(),
                installment_name: t.installment_name.clone(),
                amount: t.os_balance,
                is_overdue: true,
            });
        } else if let Some(t) = file.transactions.iter().find(|t| {
            matches!(parse_ledger_date(&t.due_date), Some(due) if due >= as_of)
                && t.amount_paid == Decimal::ZERO
                && t.receivable > Decimal::ZERO
        }) {
            alerts.push(PaymentAlert {
                file_no: file.file_no.clone(),
                plot_size: file.plot_size.clone(),
                due_date: t.due_date.clone(),
                installment_name: t.installment_name.clone(),
                amount: t.receivable,
                is_overdue: false,
            });
        }
    }

    // Overdue alerts first; stable sort keeps file order within each class
    alerts.sort_by_key(|a| !a.is_overdue);
    alerts
}

// ==================== Assistant Snapshot ====================

/// One recent receipt in the assistant snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotReceipt {
    pub receipt_date: String,
    pub amount_paid: Decimal,
    pub installment_no: u32,
    pub payment_mode: String,
}

/// Per-file slice of the registry handed to the assistant collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub file_no: String,
    pub owner_name: String,
    pub plot_size: String,
    pub plot_value: Decimal,
    pub payment_received: Decimal,
    pub balance: Decimal,
    pub overdue: Decimal,
    /// Most recent receipts, oldest first, capped at the configured count
    pub recent_receipts: Vec<SnapshotReceipt>,
}

/// Reduce files to the subset the assistant needs: headline totals plus
/// the last `max_receipts` receipts per file
pub fn snapshot(files: &[PropertyFile], max_receipts: usize) -> Vec<SnapshotFile> {
    files
        .iter()
        .map(|file| {
            let grouped = group_transactions(&file.transactions);
            let mut receipts: Vec<&Transaction> = grouped
                .plan
                .iter()
                .flat_map(|g| g.receipts.iter())
                .chain(
                    grouped
                        .other
                        .iter()
                        .filter(|t| t.amount_paid > Decimal::ZERO),
                )
                .collect();
            receipts.sort_by_key(|r| parse_ledger_date(&r.receipt_date).unwrap_or_else(epoch_date));
            let skip = receipts.len().saturating_sub(max_receipts);
            let recent_receipts = receipts
                .into_iter()
                .skip(skip)
                .map(|r| SnapshotReceipt {
                    receipt_date: r.receipt_date.clone(),
                    amount_paid: r.amount_paid,
                    installment_no: r.installment_no,
                    payment_mode: r.payment_mode.clone(),
                })
                .collect();

            SnapshotFile {
                file_no: file.file_no.clone(),
                owner_name: file.owner_name.clone(),
                plot_size: file.plot_size.clone(),
                plot_value: file.plot_value,
                payment_received: file.payment_received,
                balance: file.balance,
                overdue: file.overdue,
                recent_receipts,
            }
        })
        .collect()
}

// ==================== Tests ====================
