//! Dashboard Filter Module
//! Store, category, payment mode and date-range selection applied to a clean table.

use super::model::{CleanTable, Transaction};
use super::schema::Schema;
use chrono::NaiveDate;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Bounds given in either order are swapped into place.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// A single selected day is a one-day range.
    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// User selection; `None` on a dimension means "all".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardFilter {
    pub store: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub date_range: Option<DateRange>,
}

impl DashboardFilter {
    /// No constraint on any dimension.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a single transaction passes every active constraint.
    ///
    /// * The payment constraint is ignored when the column is absent from the schema.
    /// * The date constraint is ignored without a date column; with one,
    ///   rows with a null date fail it.
    pub fn matches(&self, t: &Transaction, schema: &Schema) -> bool {
        if let Some(store) = &self.store {
            if &t.store != store {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &t.category != category {
                return false;
            }
        }
        if let Some(method) = &self.payment_method {
            if schema.has_payment_method && t.payment_method.as_ref() != Some(method) {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if schema.has_transaction_date && !t.day().is_some_and(|d| range.contains(d)) {
                return false;
            }
        }
        true
    }

    /// Produce the filtered table. The input is left untouched.
    pub fn apply(&self, table: &CleanTable) -> CleanTable {
        if self.is_empty() {
            return table.clone();
        }

        let schema = table.schema();
        let records = table
            .iter()
            .filter(|t| self.matches(t, schema))
            .cloned()
            .collect();
        table.with_records(records)
    }
}
