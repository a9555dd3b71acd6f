//! Data Model Module
//! Typed transaction records and the clean in-memory table.

use super::schema::Schema;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use std::collections::BTreeSet;

/// One cleaned transaction.
///
/// `amount`, `store` and `category` are always present. Optional fields are
/// `None` either because the value was null/unparseable in this row or because
/// the column is absent from the source; [`Schema`] tells the two apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub amount: f64,
    pub store: String,
    pub category: String,
    pub quantity: Option<f64>,
    pub payment_method: Option<String>,
    pub satisfaction: Option<f64>,
    pub transaction_date: Option<NaiveDateTime>,
    /// Raw cells of the non-canonical source columns, in header order.
    pub extra: Vec<Option<String>>,
}

impl Transaction {
    pub fn new(amount: f64, store: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            amount,
            store: store.into(),
            category: category.into(),
            quantity: None,
            payment_method: None,
            satisfaction: None,
            transaction_date: None,
            extra: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_satisfaction(mut self, score: f64) -> Self {
        self.satisfaction = Some(score);
        self
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.transaction_date = Some(date);
        self
    }

    /// Calendar day of the transaction.
    pub fn day(&self) -> Option<NaiveDate> {
        self.transaction_date.map(|dt| dt.date())
    }

    /// Month number (1-12).
    pub fn month(&self) -> Option<u32> {
        self.transaction_date.map(|dt| dt.month())
    }

    /// English weekday name ("Monday", ...).
    pub fn weekday_name(&self) -> Option<&'static str> {
        self.transaction_date.map(|dt| weekday_name(dt.weekday()))
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Validated, deduplicated, type-coerced transaction table.
///
/// Read-only once built; filtering produces a new table sharing the schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanTable {
    schema: Schema,
    extra_columns: Vec<String>,
    records: Vec<Transaction>,
}

impl CleanTable {
    pub fn new(schema: Schema, extra_columns: Vec<String>, records: Vec<Transaction>) -> Self {
        Self {
            schema,
            extra_columns,
            records,
        }
    }

    /// Same schema, different rows.
    pub fn with_records(&self, records: Vec<Transaction>) -> Self {
        Self {
            schema: self.schema,
            extra_columns: self.extra_columns.clone(),
            records,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct store names.
    pub fn stores(&self) -> Vec<String> {
        distinct(self.records.iter().map(|t| t.store.as_str()))
    }

    /// Sorted distinct product categories.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|t| t.category.as_str()))
    }

    /// Sorted distinct payment methods (empty when the column is absent).
    pub fn payment_methods(&self) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .filter_map(|t| t.payment_method.as_deref()),
        )
    }

    /// First and last calendar day present, ignoring null dates.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut days = self.records.iter().filter_map(Transaction::day);
        let first = days.next()?;
        Some(days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

impl<'a> IntoIterator for &'a CleanTable {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
