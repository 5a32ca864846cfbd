//! SAP Business One registry export parser
//!
//! The export is a loose CSV: header spellings drift between historical
//! exports, numeric cells may carry thousands separators or accounting
//! parentheses, and `NULL` literals stand in for empty cells. Parsing is
//! deliberately lenient at row level (bad cells degrade to defaults, rows
//! without identity are dropped) and strict at file level (a structurally
//! invalid export fails as a whole).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ParseError;
use crate::types::{ImportBatch, RawFile, RawOwner, RawTransaction};
use plotweb_utils::normalize_cnic;

/// Line-based parser for SAP registry CSV exports
pub struct SapExportParser;

impl SapExportParser {
    /// Parse a full export into owners, files, and their ledger rows.
    ///
    /// Rows missing an owner national-ID or an item code are skipped
    /// silently; an export with fewer than two non-empty lines fails.
    pub fn parse(content: &str) -> Result<ImportBatch, ParseError> {
        let text = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() < 2 {
            return Err(ParseError::InvalidFormat {
                message: "export must contain a header row and at least one data row".to_string(),
            });
        }

        let headers = split_csv_line(lines[0]);
        let header = HeaderIndex::new(&headers);

        let mut owners: Vec<RawOwner> = Vec::new();
        let mut owner_index: HashMap<String, usize> = HashMap::new();
        let mut files: Vec<RawFile> = Vec::new();
        let mut file_index: HashMap<String, usize> = HashMap::new();

        for (index, line) in lines[1..].iter().enumerate() {
            let cols = split_csv_line(line);

            let raw_cnic = header.text(&cols, &["ocnic", "cnic", "u_ocnic"]);
            let normalized = normalize_cnic(&raw_cnic);
            let item_code = header.text(&cols, &["itemcode", "item_code", "u_itemcode"]);
            if normalized.is_empty() || item_code.is_empty() {
                continue;
            }

            if !owner_index.contains_key(&normalized) {
                owner_index.insert(normalized.clone(), owners.len());
                owners.push(RawOwner {
                    cnic: raw_cnic.clone(),
                    normalized_cnic: normalized.clone(),
                    name: text_or(&header, &cols, &["oname", "ownername", "name"], "SAP Member"),
                    phone: text_or(&header, &cols, &["ocell", "cellno", "phone"], "-"),
                });
            }
            let owner = &owners[owner_index[&normalized]];

            if !file_index.contains_key(&item_code) {
                file_index.insert(item_code.clone(), files.len());
                files.push(RawFile {
                    file_no: item_code.clone(),
                    currency_no: text_or(&header, &cols, &["currency", "currencyno"], "-"),
                    plot_size: text_or(&header, &cols, &["dscription", "description", "size"], "Plot"),
                    plot_value: parse_amount(&header.text(&cols, &["doctotal"])),
                    owner_name: owner.name.clone(),
                    owner_cnic: raw_cnic.clone(),
                    father_name: text_or(&header, &cols, &["ofatname", "fathername", "father_name"], "-"),
                    cell_no: text_or(&header, &cols, &["ocell", "cellno", "cell_no"], "-"),
                    reg_date: text_or(&header, &cols, &["otrfdate", "regdate"], "-"),
                    address: text_or(&header, &cols, &["opraddress", "address", "owner_address"], "-"),
                    transactions: Vec::new(),
                });
            }
            let file = &mut files[file_index[&item_code]];

            let seq = (index + 1) as u32;
            let receivable = parse_amount(&header.text(&cols, &["receivable"]));
            let amount_paid = parse_amount(&header.text(&cols, &["reconsum", "paid", "amount_paid"]));
            let surcharge = parse_amount(&header.text(&cols, &["markup", "surcharge"]));
            let os_balance = parse_amount(&header.text(&cols, &["balduedeb", "os_balance", "balance"]));

            let trans_id = parse_amount(&header.text(&cols, &["transid"]))
                .to_i64()
                .unwrap_or(0);
            let status = text_or_else(&header, &cols, &["status"], || {
                if amount_paid >= receivable && receivable > Decimal::ZERO {
                    "Paid".to_string()
                } else {
                    "Unpaid".to_string()
                }
            });

            file.transactions.push(RawTransaction {
                seq,
                trans_id: if trans_id == 0 { seq as i64 } else { trans_id },
                line_id: parse_amount(&header.text(&cols, &["line_id"])).to_u32().unwrap_or(0),
                short_name: text_or(&header, &cols, &["shortname"], &item_code),
                due_date: text_or(&header, &cols, &["duedate", "due_date"], "-"),
                receivable,
                installment_no: parse_amount(&header.text(&cols, &["u_intno"])).to_u32().unwrap_or(0),
                installment_name: header.text(&cols, &["u_intname", "type"]),
                trans_type: text_or(&header, &cols, &["transtype"], "13"),
                item_code: item_code.clone(),
                plot_type: text_or(&header, &cols, &["plottype"], "Residential"),
                currency: "PKR".to_string(),
                description: header.text(&cols, &["dscription", "description"]),
                doc_total: file.plot_value,
                status,
                balance: parse_amount(&header.text(&cols, &["balance"])),
                os_balance,
                amount_paid,
                receipt_date: header.text(&cols, &["refdate", "receipt_date", "ref_date"]),
                payment_mode: header.text(&cols, &["mode", "payment_mode"]),
                surcharge,
                instrument_no: header.text(&cols, &["instnum", "instrument", "inst_num", "instrument_no"]),
            });
        }

        Ok(ImportBatch { owners, files })
    }
}

/// Header lookup with normalized, alias-tolerant matching
struct HeaderIndex {
    normalized: Vec<String>,
}

impl HeaderIndex {
    fn new(headers: &[String]) -> Self {
        Self {
            normalized: headers.iter().map(|h| normalize_header(h)).collect(),
        }
    }

    /// Find the column for the first alias that matches a header
    fn index(&self, aliases: &[&str]) -> Option<usize> {
        for alias in aliases {
            let target = normalize_header(alias);
            if let Some(idx) = self.normalized.iter().position(|h| *h == target) {
                return Some(idx);
            }
        }
        None
    }

    /// Cell text for a field; empty when the column is missing, the row is
    /// short, or the cell is a `NULL` literal
    fn text(&self, cols: &[String], aliases: &[&str]) -> String {
        match self.index(aliases) {
            Some(idx) => {
                let value = cols.get(idx).map(|s| s.trim()).unwrap_or("");
                if value.eq_ignore_ascii_case("NULL") {
                    String::new()
                } else {
                    value.to_string()
                }
            }
            None => String::new(),
        }
    }
}

fn text_or(header: &HeaderIndex, cols: &[String], aliases: &[&str], default: &str) -> String {
    let value = header.text(cols, aliases);
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn text_or_else<F: FnOnce() -> String>(
    header: &HeaderIndex,
    cols: &[String],
    aliases: &[&str],
    default: F,
) -> String {
    let value = header.text(cols, aliases);
    if value.is_empty() {
        default()
    } else {
        value
    }
}

/// Lowercase and strip non-alphanumerics, so "Item_Code", "ITEM CODE" and
/// "itemcode" all collide
fn normalize_header(raw: &str) -> String {
    static PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re = PATTERN.get_or_init(|| regex::Regex::new(r"[^a-z0-9]").unwrap());
    re.replace_all(&raw.trim().to_lowercase(), "").into_owned()
}

/// Lenient numeric coercion: strips thousands separators and parentheses,
/// then parses; anything unparseable yields zero, never an error
pub(crate) fn parse_amount(raw: &str) -> Decimal {
    if raw.is_empty() || raw == "-" || raw.eq_ignore_ascii_case("NULL") {
        return Decimal::ZERO;
    }
    let clean: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')'))
        .collect();
    Decimal::from_str(clean.trim()).unwrap_or(Decimal::ZERO)
}

/// Split one CSV row on commas outside double-quote spans. Quotes only
/// toggle state; embedded escaped quotes are not supported.
pub(crate) fn split_csv_line(line: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            columns.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }
    columns.push(current.trim().to_string());
    columns
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv_line_plain() {
        assert_eq!(split_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv_line(" a , b "), vec!["a", "b"]);
    }

    #[test]
    fn test_split_csv_line_quoted_comma() {
        assert_eq!(
            split_csv_line(r#"DGFD1-01001,"House No 23, Garden Town",47000"#),
            vec!["DGFD1-01001", "House No 23, Garden Town", "47000"]
        );
    }

    #[test]
    fn test_split_csv_line_trailing_empty() {
        assert_eq!(split_csv_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_parse_amount_lenient() {
        assert_eq!(parse_amount("765,000"), Decimal::from(765000));
        assert_eq!(parse_amount("(2,775)"), Decimal::from(2775));
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("-"), Decimal::ZERO);
        assert_eq!(parse_amount("NULL"), Decimal::ZERO);
        assert_eq!(parse_amount("null"), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("47000.50"), Decimal::new(4700050, 2));
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Item_Code"), "itemcode");
        assert_eq!(normalize_header(" U_IntNo "), "uintno");
        assert_eq!(normalize_header("OS Balance"), "osbalance");
    }

    fn sample_export() -> String {
        [
            "ItemCode,OCNIC,OName,OCell,DocTotal,Receivable,U_IntNo,U_IntName,DueDate,ReconSum,RefDate,Mode,Markup,BalDueDeb,InstNum",
            "DGFD1-01001,33201-1691812-5,Imran Khan,0300-3308312,\"7,750,000\",765000,1,BOOKING,26-May-23,765000,26-May-23,Cash,0,0,NULL",
            "DGFD1-01001,33201-1691812-5,Imran Khan,0300-3308312,\"7,750,000\",47000,17,INSTALLMENT,10-Jan-26,0,NULL,NULL,0,47000,NULL",
        ]
        .join("\n")
    }

    #[test]
    fn test_parse_builds_owner_and_file() {
        let batch = SapExportParser::parse(&sample_export()).unwrap();
        assert_eq!(batch.owners.len(), 1);
        assert_eq!(batch.files.len(), 1);
        assert_eq!(batch.transaction_count(), 2);

        let owner = &batch.owners[0];
        assert_eq!(owner.cnic, "33201-1691812-5");
        assert_eq!(owner.normalized_cnic, "3320116918125");
        assert_eq!(owner.name, "Imran Khan");

        let file = &batch.files[0];
        assert_eq!(file.file_no, "DGFD1-01001");
        assert_eq!(file.plot_value, Decimal::from(7750000));
        assert_eq!(file.owner_cnic, "33201-1691812-5");
    }

    #[test]
    fn test_parse_row_fields() {
        let batch = SapExportParser::parse(&sample_export()).unwrap();
        let rows = &batch.files[0].transactions;

        assert_eq!(rows[0].seq, 1);
        assert_eq!(rows[0].installment_no, 1);
        assert_eq!(rows[0].installment_name, "BOOKING");
        assert_eq!(rows[0].amount_paid, Decimal::from(765000));
        assert_eq!(rows[0].receipt_date, "26-May-23");
        assert_eq!(rows[0].payment_mode, "Cash");
        // NULL instrument cell reads as absent
        assert_eq!(rows[0].instrument_no, "");
        assert_eq!(rows[0].doc_total, Decimal::from(7750000));

        assert_eq!(rows[1].seq, 2);
        assert_eq!(rows[1].due_date, "10-Jan-26");
        assert_eq!(rows[1].os_balance, Decimal::from(47000));
        assert_eq!(rows[1].receipt_date, "");
    }

    #[test]
    fn test_parse_status_derived_when_absent() {
        let batch = SapExportParser::parse(&sample_export()).unwrap();
        let rows = &batch.files[0].transactions;
        // Fully paid row with positive receivable
        assert_eq!(rows[0].status, "Paid");
        // Unpaid future installment
        assert_eq!(rows[1].status, "Unpaid");
    }

    #[test]
    fn test_parse_header_alias_spellings() {
        let csv = "item_code,U_OCNIC,Amount_Paid,OS_Balance\nF-1,12345,500,100\n";
        let batch = SapExportParser::parse(csv).unwrap();
        let row = &batch.files[0].transactions[0];
        assert_eq!(batch.files[0].file_no, "F-1");
        assert_eq!(row.amount_paid, Decimal::from(500));
        assert_eq!(row.os_balance, Decimal::from(100));
    }

    #[test]
    fn test_parse_first_alias_wins() {
        // Both "balduedeb" and "balance" present: balduedeb is the OS source
        let csv = "itemcode,ocnic,balance,balduedeb\nF-1,12345,999,100\n";
        let batch = SapExportParser::parse(csv).unwrap();
        let row = &batch.files[0].transactions[0];
        assert_eq!(row.os_balance, Decimal::from(100));
        assert_eq!(row.balance, Decimal::from(999));
    }

    #[test]
    fn test_parse_drops_rows_without_identity() {
        let csv = [
            "itemcode,ocnic,receivable",
            "F-1,12345,100",
            ",12345,200",
            "F-1,,300",
            "F-1,---,400",
        ]
        .join("\n");
        let batch = SapExportParser::parse(&csv).unwrap();
        assert_eq!(batch.transaction_count(), 1);
        assert_eq!(batch.files[0].transactions[0].receivable, Decimal::from(100));
    }

    #[test]
    fn test_parse_seq_counts_all_data_rows() {
        // Sequence numbers follow the export order even across skipped rows
        let csv = ["itemcode,ocnic", "F-1,12345", ",skip", "F-1,12345"].join("\n");
        let batch = SapExportParser::parse(&csv).unwrap();
        let rows = &batch.files[0].transactions;
        assert_eq!(rows[0].seq, 1);
        assert_eq!(rows[1].seq, 3);
    }

    #[test]
    fn test_parse_rejects_header_only() {
        let err = SapExportParser::parse("itemcode,ocnic\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat { .. }));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(SapExportParser::parse("").is_err());
        assert!(SapExportParser::parse("\n\n\n").is_err());
    }

    #[test]
    fn test_parse_strips_bom() {
        let csv = "\u{feff}itemcode,ocnic\nF-1,12345\n";
        let batch = SapExportParser::parse(csv).unwrap();
        assert_eq!(batch.files[0].file_no, "F-1");
    }

    #[test]
    fn test_parse_multiple_files_and_owners() {
        let csv = [
            "itemcode,ocnic,oname",
            "F-1,111,Alice",
            "F-2,222,Bilal",
            "F-1,111,Alice",
        ]
        .join("\n");
        let batch = SapExportParser::parse(&csv).unwrap();
        assert_eq!(batch.owners.len(), 2);
        assert_eq!(batch.files.len(), 2);
        assert_eq!(batch.files[0].transactions.len(), 2);
        assert_eq!(batch.files[1].transactions.len(), 1);
    }

    #[test]
    fn test_parse_trans_id_falls_back_to_seq() {
        let csv = "itemcode,ocnic,transid\nF-1,111,\nF-1,111,9001\n";
        let batch = SapExportParser::parse(csv).unwrap();
        let rows = &batch.files[0].transactions;
        assert_eq!(rows[0].trans_id, 1);
        assert_eq!(rows[1].trans_id, 9001);
    }
}
