//! Due-date handling for SAP ledger exports
//!
//! The source system emits dates as "DD-Mon-YY" (sometimes "DD-Mon-YYYY"),
//! with blank, "-" or "NULL" standing in for "no date". Failure is silent:
//! callers treat an unparseable date as "cannot order / cannot classify"
//! and exclude the row from date-dependent logic instead of failing the
//! whole import.

use chrono::NaiveDate;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parse a ledger date like "10-Jan-25" to a calendar day.
///
/// Two-digit years are read as 2000+YY. Returns `None` for placeholder
/// values and anything that does not split into exactly three hyphen
/// parts with a recognizable month abbreviation.
pub fn parse_ledger_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() || raw == "-" || raw == "NULL" {
        return None;
    }
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let mut year: i32 = parts[2].trim().parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    let month = month_number(parts[1])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Sort key for receipts with no usable date: the epoch, so undated
/// receipts order first
pub fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
}

/// Match a month abbreviation case-insensitively; longer names ("January")
/// are truncated to their first three letters before lookup
fn month_number(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let first = chars.next()?;
    let normalized: String = first
        .to_uppercase()
        .chain(chars.flat_map(|c| c.to_lowercase()))
        .take(3)
        .collect();
    if normalized.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| *m == normalized)
        .map(|i| (i + 1) as u32)
}

// ==================== Tests ====================
