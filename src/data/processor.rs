//! Data Processor Module
//! Cleans a raw table into typed transactions: header normalization, type
//! coercion, required-field filtering, deduplication.

use super::loader::{LoadError, RawTable};
use super::model::{CleanTable, Transaction};
use super::schema::{self, Schema};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

// Slash dates are read day-first
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Format used when a clean table is written back as text.
const DATETIME_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Counters describing what cleaning did to the source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CleaningReport {
    pub raw_rows: usize,
    pub dropped_missing_required: usize,
    pub duplicates_removed: usize,
    pub invalid_dates: usize,
    /// Non-null cells that could not be coerced, per column.
    pub coercion_failures: BTreeMap<String, usize>,
    pub clean_rows: usize,
}

/// A clean table together with its cleaning report.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub table: CleanTable,
    pub report: CleaningReport,
}

/// Column positions of the canonical fields in a normalized header.
struct ColumnIndex {
    amount: usize,
    store: usize,
    category: usize,
    quantity: Option<usize>,
    payment_method: Option<usize>,
    satisfaction: Option<usize>,
    transaction_date: Option<usize>,
    extra: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| find(name).ok_or_else(|| LoadError::MissingColumn(name.to_string()));

        let amount = required(schema::AMOUNT)?;
        let store = required(schema::STORE)?;
        let category = required(schema::CATEGORY)?;
        let quantity = find(schema::QUANTITY);
        let payment_method = find(schema::PAYMENT_METHOD);
        let satisfaction = find(schema::SATISFACTION);
        let transaction_date = find(schema::TRANSACTION_DATE);

        let canonical: Vec<usize> = [Some(amount), Some(store), Some(category)]
            .into_iter()
            .chain([quantity, payment_method, satisfaction, transaction_date])
            .flatten()
            .collect();
        let extra = (0..headers.len())
            .filter(|i| !canonical.contains(i))
            .collect();

        Ok(Self {
            amount,
            store,
            category,
            quantity,
            payment_method,
            satisfaction,
            transaction_date,
            extra,
        })
    }
}

/// Field-wise identity of a transaction, with floats compared bitwise.
#[derive(PartialEq, Eq, Hash)]
struct DedupKey {
    amount: u64,
    store: String,
    category: String,
    quantity: Option<u64>,
    payment_method: Option<String>,
    satisfaction: Option<u64>,
    transaction_date: Option<NaiveDateTime>,
    extra: Vec<Option<String>>,
}

impl DedupKey {
    fn of(t: &Transaction) -> Self {
        Self {
            amount: float_key(t.amount),
            store: t.store.clone(),
            category: t.category.clone(),
            quantity: t.quantity.map(float_key),
            payment_method: t.payment_method.clone(),
            satisfaction: t.satisfaction.map(float_key),
            transaction_date: t.transaction_date,
            extra: t.extra.clone(),
        }
    }
}

fn float_key(v: f64) -> u64 {
    // 0.0 and -0.0 are the same value
    if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

/// Handles data cleaning operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Strip leading/trailing whitespace from header names.
    pub fn normalize_headers(headers: &[String]) -> Vec<String> {
        headers.iter().map(|h| h.trim().to_string()).collect()
    }

    /// Coerce a cell to a finite number; anything else is null.
    pub fn coerce_number(value: &str) -> Option<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    /// Parse a cell into a timestamp; unparseable values are null.
    pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_local());
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// Clean a raw table.
    ///
    /// Rows missing amount, store or category (including amounts that fail to
    /// coerce) are dropped. Other coercion failures null the cell and keep the
    /// row. Exact duplicates are removed, first occurrence kept.
    pub fn clean(raw: &RawTable) -> Result<CleanOutcome, LoadError> {
        let headers = Self::normalize_headers(&raw.headers);
        let index = ColumnIndex::resolve(&headers)?;
        let schema = Schema::from_headers(&headers);

        for missing in schema.missing_optional() {
            log::warn!("Optional column '{}' not present; dependent views disabled", missing);
        }

        let mut report = CleaningReport {
            raw_rows: raw.rows.len(),
            ..CleaningReport::default()
        };

        let mut seen: HashSet<DedupKey> = HashSet::new();
        let mut records = Vec::with_capacity(raw.rows.len());

        for row in &raw.rows {
            let Some(record) = Self::clean_row(row, &index, &mut report) else {
                report.dropped_missing_required += 1;
                continue;
            };

            if seen.insert(DedupKey::of(&record)) {
                records.push(record);
            } else {
                report.duplicates_removed += 1;
            }
        }

        report.clean_rows = records.len();

        if report.dropped_missing_required > 0 {
            log::warn!(
                "Dropped {} rows missing amount, store or category",
                report.dropped_missing_required
            );
        }
        if report.duplicates_removed > 0 {
            log::debug!("Removed {} duplicate rows", report.duplicates_removed);
        }
        for (column, count) in &report.coercion_failures {
            log::debug!("{} values in '{}' could not be coerced", count, column);
        }

        let extra_columns = index.extra.iter().map(|&i| headers[i].clone()).collect();
        Ok(CleanOutcome {
            table: CleanTable::new(schema, extra_columns, records),
            report,
        })
    }

    fn clean_row(
        row: &[Option<String>],
        index: &ColumnIndex,
        report: &mut CleaningReport,
    ) -> Option<Transaction> {
        let cell = |i: usize| row.get(i).and_then(|c| c.as_deref()).filter(|c| !c.is_empty());

        let amount = Self::coerce_cell(cell(index.amount), schema::AMOUNT, report);
        let store = cell(index.store);
        let category = cell(index.category);

        let quantity = index
            .quantity
            .and_then(|i| Self::coerce_cell(cell(i), schema::QUANTITY, report));

        let satisfaction = index
            .satisfaction
            .and_then(|i| Self::coerce_cell(cell(i), schema::SATISFACTION, report));

        let transaction_date = index.transaction_date.and_then(|i| {
            let text = cell(i)?;
            let parsed = Self::parse_date(text);
            if parsed.is_none() {
                report.invalid_dates += 1;
            }
            parsed
        });

        let payment_method = index
            .payment_method
            .and_then(|i| cell(i))
            .map(str::to_string);

        let extra = index
            .extra
            .iter()
            .map(|&i| row.get(i).cloned().flatten())
            .collect();

        Some(Transaction {
            amount: amount?,
            store: store?.to_string(),
            category: category?.to_string(),
            quantity,
            payment_method,
            satisfaction,
            transaction_date,
            extra,
        })
    }

    fn coerce_cell(value: Option<&str>, column: &str, report: &mut CleaningReport) -> Option<f64> {
        let text = value?;
        let number = Self::coerce_number(text);
        if number.is_none() {
            *report
                .coercion_failures
                .entry(column.to_string())
                .or_default() += 1;
        }
        number
    }

    /// Render a clean table back to raw text cells under canonical headers.
    pub fn to_raw(table: &CleanTable) -> RawTable {
        let schema = table.schema();
        let mut headers: Vec<String> = schema
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        headers.extend(table.extra_columns().iter().cloned());

        let rows = table
            .iter()
            .map(|t| {
                let mut row = vec![
                    Some(t.amount.to_string()),
                    Some(t.store.clone()),
                    Some(t.category.clone()),
                ];
                if schema.has_quantity {
                    row.push(t.quantity.map(|v| v.to_string()));
                }
                if schema.has_payment_method {
                    row.push(t.payment_method.clone());
                }
                if schema.has_satisfaction {
                    row.push(t.satisfaction.map(|v| v.to_string()));
                }
                if schema.has_transaction_date {
                    row.push(
                        t.transaction_date
                            .map(|d| d.format(DATETIME_OUTPUT_FORMAT).to_string()),
                    );
                }
                row.extend(t.extra.iter().cloned());
                row
            })
            .collect();

        RawTable::new(headers, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: [&str; 7] = [
        "Montant",
        "Magasin",
        "Categorie_Produit",
        "Quantite",
        "Mode_Paiement",
        "Satisfaction_Client",
        "Date_Transaction",
    ];

    fn clean(rows: &[&[&str]]) -> CleanOutcome {
        DataProcessor::clean(&RawTable::from_strs(&HEADERS, rows)).unwrap()
    }

    #[test]
    fn test_headers_are_trimmed() {
        let raw = RawTable::from_strs(
            &["  Montant", "Magasin ", " Categorie_Produit "],
            &[&["10", "A", "X"]],
        );
        let outcome = DataProcessor::clean(&raw).unwrap();
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(*outcome.table.schema(), Schema::default());
    }

    #[test]
    fn test_header_match_is_case_sensitive() {
        let raw = RawTable::from_strs(&["montant", "Magasin", "Categorie_Produit"], &[]);
        let err = DataProcessor::clean(&raw).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Montant"));
    }

    #[test]
    fn test_null_amount_dropped_null_payment_kept() {
        let outcome = clean(&[
            &["", "A", "X", "1", "Carte", "4", "2024-01-01"],
            &["15", "A", "X", "1", "", "4", "2024-01-01"],
        ]);
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table.records()[0].amount, 15.0);
        assert_eq!(outcome.table.records()[0].payment_method, None);
        assert_eq!(outcome.report.dropped_missing_required, 1);
    }

    #[test]
    fn test_non_numeric_amount_dropped_non_numeric_satisfaction_kept() {
        let outcome = clean(&[
            &["abc", "A", "X", "1", "Carte", "4", "2024-01-01"],
            &["12", "A", "X", "1", "Carte", "abc", "2024-01-01"],
        ]);
        assert_eq!(outcome.table.len(), 1);
        let kept = &outcome.table.records()[0];
        assert_eq!(kept.amount, 12.0);
        assert_eq!(kept.satisfaction, None);
        assert_eq!(outcome.report.coercion_failures.get("Montant"), Some(&1));
        assert_eq!(outcome.report.coercion_failures.get("Satisfaction_Client"), Some(&1));
    }

    #[test]
    fn test_numeric_satisfaction_kept_as_is() {
        let outcome = clean(&[
            &["10", "A", "X", "1", "Carte", "7", "2024-01-01"],
            &["20", "A", "X", "1", "Carte", "3", "2024-01-02"],
        ]);
        let scores: Vec<Option<f64>> = outcome.table.iter().map(|t| t.satisfaction).collect();
        assert_eq!(scores, vec![Some(7.0), Some(3.0)]);
        assert_eq!(outcome.report.coercion_failures.get("Satisfaction_Client"), None);

        let kpis = crate::stats::SalesAggregator::kpi_summary(&outcome.table);
        assert_eq!(kpis.mean_satisfaction, Some(5.0));
    }

    #[test]
    fn test_missing_store_or_category_dropped() {
        let outcome = clean(&[
            &["10", "", "X", "1", "Carte", "4", "2024-01-01"],
            &["10", "A", "", "1", "Carte", "4", "2024-01-01"],
        ]);
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.report.dropped_missing_required, 2);
    }

    #[test]
    fn test_invalid_date_keeps_row_with_null_date() {
        let outcome = clean(&[&["10", "A", "X", "1", "Carte", "4", "not a date"]]);
        assert_eq!(outcome.table.len(), 1);
        let t = &outcome.table.records()[0];
        assert_eq!(t.transaction_date, None);
        assert_eq!(t.day(), None);
        assert_eq!(t.month(), None);
        assert_eq!(outcome.report.invalid_dates, 1);
    }

    #[test]
    fn test_duplicate_rows_removed() {
        let row: &[&str] = &["10", "A", "X", "1", "Carte", "4", "2024-01-01"];
        let other: &[&str] = &["10", "A", "X", "2", "Carte", "4", "2024-01-01"];
        let base = clean(&[row, other]);
        let with_dup = clean(&[row, other, row]);
        assert_eq!(with_dup.table.len(), base.table.len());
        assert_eq!(with_dup.report.duplicates_removed, 1);
    }

    #[test]
    fn test_numeric_equivalents_are_duplicates() {
        let outcome = clean(&[
            &["10", "A", "X", "1", "Carte", "4", "2024-01-01"],
            &["10.0", "A", "X", "1.00", "Carte", "4", "2024-01-01 00:00:00"],
        ]);
        assert_eq!(outcome.table.len(), 1);
    }

    #[test]
    fn test_extra_columns_participate_in_dedup() {
        let raw = RawTable::from_strs(
            &["ID", "Montant", "Magasin", "Categorie_Produit"],
            &[&["1", "10", "A", "X"], &["2", "10", "A", "X"]],
        );
        let outcome = DataProcessor::clean(&raw).unwrap();
        assert_eq!(outcome.table.len(), 2);
        assert_eq!(outcome.table.extra_columns(), &["ID".to_string()]);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let first = clean(&[
            &["10.25", "A", "X", "1", "Carte", "4", "2024-01-01 13:45:10"],
            &["20", "B", "Y", "", "", "abc", "bad"],
            &["30", "B", "X", "3", "Espèces", "5", "15/02/2024"],
        ]);
        let second = DataProcessor::clean(&DataProcessor::to_raw(&first.table)).unwrap();
        assert_eq!(second.table, first.table);
        assert_eq!(second.report.dropped_missing_required, 0);
        assert_eq!(second.report.duplicates_removed, 0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        for text in ["2024-02-15", "15/02/2024", "2024-02-15 08:30:00", "2024-02-15T08:30:00Z"] {
            let parsed = DataProcessor::parse_date(text).unwrap();
            assert_eq!(parsed.date(), expected, "{}", text);
        }
        assert_eq!(DataProcessor::parse_date("2024-13-45"), None);
        assert_eq!(DataProcessor::parse_date(""), None);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(DataProcessor::coerce_number(" 42.5 "), Some(42.5));
        assert_eq!(DataProcessor::coerce_number("1e3"), Some(1000.0));
        assert_eq!(DataProcessor::coerce_number("NaN"), None);
        assert_eq!(DataProcessor::coerce_number("12,5"), None);
    }

    #[test]
    fn test_absent_optional_columns() {
        let raw = RawTable::from_strs(
            &["Montant", "Magasin", "Categorie_Produit"],
            &[&["10", "A", "X"]],
        );
        let outcome = DataProcessor::clean(&raw).unwrap();
        let schema = outcome.table.schema();
        assert!(!schema.has_payment_method);
        assert!(!schema.has_satisfaction);
        assert!(!schema.has_transaction_date);
    }
}
