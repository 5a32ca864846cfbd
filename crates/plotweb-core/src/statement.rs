//! Installment grouping and ledger aggregation
//!
//! Everything here is a pure function over a file's transaction list so the
//! same computation backs both the import path (which persists the result
//! onto the property file) and the statement view (which re-derives it at
//! request time and is the source of truth for what the user sees).
//!
//! The date used for overdue classification is always an injected `as_of`
//! day, never the system clock.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dates::{epoch_date, parse_ledger_date};
use crate::Transaction;

/// One logical installment: the row defining what is owed, plus every row
/// carrying payment evidence for it, in receipt-date order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentGroup {
    /// The authoritative definition of the obligation. The last row seen
    /// with a positive receivable wins; until one appears this is a
    /// placeholder clone with payment fields cleared.
    pub definition: Transaction,
    /// Rows with a paid amount, a surcharge, or a receipt date
    pub receipts: Vec<Transaction>,
}

impl InstallmentGroup {
    /// Sum of paid amounts across the group's receipts
    pub fn total_paid(&self) -> Decimal {
        self.receipts.iter().map(|r| r.amount_paid).sum()
    }

    /// Sum of surcharges across the group's receipts
    pub fn total_surcharge(&self) -> Decimal {
        self.receipts.iter().map(|r| r.surcharge).sum()
    }

    /// Remaining obligation, clamped at zero (overpayment is not carried
    /// as credit)
    pub fn outstanding(&self) -> Decimal {
        (self.definition.receivable - self.total_paid()).max(Decimal::ZERO)
    }

    /// Whether the obligation is settled
    pub fn is_fully_paid(&self) -> bool {
        self.total_paid() >= self.definition.receivable
    }

    /// Past due date and still carrying a balance, as of the given day
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        match parse_ledger_date(&self.definition.due_date) {
            Some(due) => due < as_of && self.outstanding() > Decimal::ZERO,
            None => false,
        }
    }
}

/// A file's ledger partitioned into the installment plan and one-off rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupedLedger {
    /// Installment groups, ascending by installment number
    pub plan: Vec<InstallmentGroup>,
    /// Non-plan rows, ascending by original sequence number
    pub other: Vec<Transaction>,
}

/// Partition a file's rows into installment groups and "other" rows.
///
/// Every row lands in exactly one place: rows with a positive installment
/// number join that installment's group (as definition, receipt, or both);
/// rows with installment number zero are one-off charges.
pub fn group_transactions(transactions: &[Transaction]) -> GroupedLedger {
    let mut groups: BTreeMap<u32, InstallmentGroup> = BTreeMap::new();
    let mut other: Vec<Transaction> = Vec::new();

    for t in transactions {
        if t.installment_no > 0 {
            let group = groups.entry(t.installment_no).or_insert_with(|| InstallmentGroup {
                definition: placeholder_definition(t),
                receipts: Vec::new(),
            });
            if t.receivable > Decimal::ZERO {
                group.definition = t.clone();
            }
            if is_receipt(t) {
                group.receipts.push(t.clone());
            }
        } else {
            other.push(t.clone());
        }
    }

    for group in groups.values_mut() {
        // Undated receipts sort to the front; stable sort keeps export
        // order on ties
        group
            .receipts
            .sort_by_key(|r| parse_ledger_date(&r.receipt_date).unwrap_or_else(epoch_date));
    }
    other.sort_by_key(|t| t.seq);

    GroupedLedger {
        plan: groups.into_values().collect(),
        other,
    }
}

/// A row counts as a receipt if it carries any payment evidence, even
/// partial
fn is_receipt(t: &Transaction) -> bool {
    t.amount_paid > Decimal::ZERO
        || t.surcharge > Decimal::ZERO
        || (!t.receipt_date.is_empty() && t.receipt_date != "NULL")
}

/// Definition stand-in until a positive-receivable row appears: the first
/// row of the group with its payment fields cleared
fn placeholder_definition(t: &Transaction) -> Transaction {
    Transaction {
        amount_paid: Decimal::ZERO,
        receipt_date: String::new(),
        surcharge: Decimal::ZERO,
        payment_mode: String::new(),
        instrument_no: String::new(),
        ..t.clone()
    }
}

/// Statement totals across the plan and "other" sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementTotals {
    pub plan_receivable: Decimal,
    pub plan_received: Decimal,
    pub plan_surcharge: Decimal,
    /// `max(0, plan_receivable - plan_received)`
    pub plan_balance: Decimal,
    pub other_receivable: Decimal,
    pub other_received: Decimal,
    pub other_surcharge: Decimal,
    pub grand_receivable: Decimal,
    pub grand_received: Decimal,
    pub grand_surcharge: Decimal,
    /// `max(0, grand_receivable - grand_received)`
    pub grand_balance: Decimal,
    /// Outstanding amounts of overdue installments and rows (not their
    /// full receivables)
    pub total_overdue: Decimal,
}

/// Aggregate a grouped ledger as of the given day.
///
/// Plan overdue uses the recomputed remaining balance per group; "other"
/// overdue trusts the row's source-reported outstanding balance.
pub fn compute_totals(grouped: &GroupedLedger, as_of: NaiveDate) -> StatementTotals {
    let mut totals = StatementTotals::default();

    for group in &grouped.plan {
        totals.plan_receivable += group.definition.receivable;
        if group.is_overdue(as_of) {
            totals.total_overdue += group.outstanding();
        }
        for receipt in &group.receipts {
            totals.plan_received += receipt.amount_paid;
            totals.plan_surcharge += receipt.surcharge;
        }
    }

    for t in &grouped.other {
        totals.other_receivable += t.receivable;
        totals.other_received += t.amount_paid;
        totals.other_surcharge += t.surcharge;
        if other_row_overdue(t, as_of) {
            totals.total_overdue += t.os_balance;
        }
    }

    totals.plan_balance = (totals.plan_receivable - totals.plan_received).max(Decimal::ZERO);
    totals.grand_receivable = totals.plan_receivable + totals.other_receivable;
    totals.grand_received = totals.plan_received + totals.other_received;
    totals.grand_surcharge = totals.plan_surcharge + totals.other_surcharge;
    totals.grand_balance = (totals.grand_receivable - totals.grand_received).max(Decimal::ZERO);

    totals
}

/// Overdue test for a one-off row: past due date and a positive
/// source-reported outstanding balance
pub fn other_row_overdue(t: &Transaction, as_of: NaiveDate) -> bool {
    match parse_ledger_date(&t.due_date) {
        Some(due) => due < as_of && t.os_balance > Decimal::ZERO,
        None => false,
    }
}

/// Derived per-file summary fields, persisted at import time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSummary {
    pub payment_received: Decimal,
    pub surcharge: Decimal,
    pub balance: Decimal,
    pub overdue: Decimal,
}

/// Run grouping + aggregation over a transaction list and reduce it to the
/// persisted file fields. Canonical entry point for any caller that needs
/// file-level totals.
pub fn summarize(transactions: &[Transaction], as_of: NaiveDate) -> FileSummary {
    let grouped = group_transactions(transactions);
    let totals = compute_totals(&grouped, as_of);
    FileSummary {
        payment_received: totals.grand_received,
        surcharge: totals.grand_surcharge,
        balance: totals.grand_balance,
        overdue: totals.total_overdue,
    }
}

// ==================== Tests ====================
