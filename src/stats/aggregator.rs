//! Sales Aggregator Module
//! Pure summary views over an (already filtered) clean table.
//!
//! Every function reads the table once, never mutates it and returns a
//! well-defined result for an empty table. Measures are rounded to 2 decimal
//! places here so every consumer sees the same numbers. Views that need an
//! optional column return [`View::Unavailable`] when the column is absent.

use super::accumulator::{group_fold, round2, Accumulator};
use crate::data::{schema, CleanTable, Transaction};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bin counts used by the dashboard histograms.
pub const AMOUNT_HISTOGRAM_BINS: usize = 30;
pub const QUANTITY_HISTOGRAM_BINS: usize = 20;

/// A summary view, or the marker that its source column is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum View<T> {
    Available(T),
    Unavailable { column: &'static str },
}

impl<T> View<T> {
    pub fn available(&self) -> Option<&T> {
        match self {
            View::Available(v) => Some(v),
            View::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, View::Available(_))
    }

    /// Name of the missing column, if unavailable.
    pub fn missing_column(&self) -> Option<&'static str> {
        match self {
            View::Available(_) => None,
            View::Unavailable { column } => Some(*column),
        }
    }

    fn when(present: bool, column: &'static str, compute: impl FnOnce() -> T) -> Self {
        if present {
            View::Available(compute())
        } else {
            View::Unavailable { column }
        }
    }
}

/// Whole-table scalar metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_amount: f64,
    pub transaction_count: usize,
    pub mean_amount: Option<f64>,
    /// `None` without a satisfaction column or without any score.
    pub mean_satisfaction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSales {
    pub store: String,
    pub total_amount: f64,
    pub mean_amount: Option<f64>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    /// Sum of non-null quantities; 0 when the quantity column is absent.
    pub total_quantity: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreCategorySales {
    pub store: String,
    pub category: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCount {
    pub method: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPayment {
    pub method: String,
    pub share_pct: f64,
}

/// Mean of one measure for one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub day: NaiveDate,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBucket {
    pub score: f64,
    pub count: usize,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Computes the dashboard summary views.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Total, count and means over the whole table.
    pub fn kpi_summary(table: &CleanTable) -> KpiSummary {
        let mut amount = Accumulator::new();
        let mut satisfaction = Accumulator::new();
        for t in table {
            amount.push(Some(t.amount));
            satisfaction.push(t.satisfaction);
        }

        let mean_satisfaction = if table.schema().has_satisfaction {
            satisfaction.mean().map(round2)
        } else {
            None
        };

        KpiSummary {
            total_amount: round2(amount.sum()),
            transaction_count: table.len(),
            mean_amount: amount.mean().map(round2),
            mean_satisfaction,
        }
    }

    /// Sum, mean and count of amounts per store.
    pub fn sales_by_store(table: &CleanTable) -> Vec<StoreSales> {
        group_fold(table, |t| Some(t.store.as_str()), |t| Some(t.amount))
            .into_iter()
            .map(|(store, acc)| StoreSales {
                store: store.to_string(),
                total_amount: round2(acc.sum()),
                mean_amount: acc.mean().map(round2),
                transaction_count: acc.count(),
            })
            .collect()
    }

    /// Quantity and amount totals per product category.
    pub fn sales_by_category(table: &CleanTable) -> Vec<CategorySales> {
        let mut groups: BTreeMap<&str, (Accumulator, Accumulator)> = BTreeMap::new();
        for t in table {
            let (quantity, amount) = groups.entry(t.category.as_str()).or_default();
            quantity.push(t.quantity);
            amount.push(Some(t.amount));
        }

        groups
            .into_iter()
            .map(|(category, (quantity, amount))| CategorySales {
                category: category.to_string(),
                total_quantity: round2(quantity.sum()),
                total_amount: round2(amount.sum()),
            })
            .collect()
    }

    /// Amount per (store, category) pair, ordered by store then category.
    pub fn sales_by_store_and_category(table: &CleanTable) -> Vec<StoreCategorySales> {
        group_fold(
            table,
            |t| Some((t.store.as_str(), t.category.as_str())),
            |t| Some(t.amount),
        )
        .into_iter()
        .map(|((store, category), acc)| StoreCategorySales {
            store: store.to_string(),
            category: category.to_string(),
            total_amount: round2(acc.sum()),
        })
        .collect()
    }

    /// Transactions per payment method, most frequent first.
    ///
    /// Rows with a null payment method are not counted.
    pub fn payment_distribution(table: &CleanTable) -> View<Vec<PaymentCount>> {
        View::when(
            table.schema().has_payment_method,
            schema::PAYMENT_METHOD,
            || {
                let mut counts: Vec<PaymentCount> =
                    group_fold(table, |t| t.payment_method.as_deref(), |_| None)
                        .into_iter()
                        .map(|(method, acc)| PaymentCount {
                            method: method.to_string(),
                            count: acc.rows(),
                        })
                        .collect();
                counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.method.cmp(&b.method)));
                counts
            },
        )
    }

    /// Most used payment method and its share of counted transactions.
    pub fn top_payment_method(distribution: &[PaymentCount]) -> Option<TopPayment> {
        let total: usize = distribution.iter().map(|p| p.count).sum();
        if total == 0 {
            return None;
        }
        distribution
            .iter()
            .min_by(|a, b| b.count.cmp(&a.count).then_with(|| a.method.cmp(&b.method)))
            .map(|top| TopPayment {
                method: top.method.clone(),
                share_pct: round2(top.count as f64 / total as f64 * 100.0),
            })
    }

    /// Mean amount per payment method.
    pub fn mean_amount_by_payment(table: &CleanTable) -> View<Vec<GroupMean>> {
        View::when(
            table.schema().has_payment_method,
            schema::PAYMENT_METHOD,
            || {
                Self::group_means(group_fold(
                    table,
                    |t| t.payment_method.as_deref(),
                    |t| Some(t.amount),
                ))
            },
        )
    }

    /// Mean satisfaction score per store.
    pub fn satisfaction_by_store(table: &CleanTable) -> View<Vec<GroupMean>> {
        Self::satisfaction_by(table, |t| t.store.as_str())
    }

    /// Mean satisfaction score per product category.
    pub fn satisfaction_by_category(table: &CleanTable) -> View<Vec<GroupMean>> {
        Self::satisfaction_by(table, |t| t.category.as_str())
    }

    fn satisfaction_by<'a>(
        table: &'a CleanTable,
        key: impl Fn(&'a Transaction) -> &'a str,
    ) -> View<Vec<GroupMean>> {
        View::when(table.schema().has_satisfaction, schema::SATISFACTION, || {
            Self::group_means(group_fold(table, |t| Some(key(t)), |t| t.satisfaction))
        })
    }

    fn group_means(groups: BTreeMap<&str, Accumulator>) -> Vec<GroupMean> {
        groups
            .into_iter()
            .map(|(key, acc)| GroupMean {
                key: key.to_string(),
                mean: acc.mean().map(round2),
            })
            .collect()
    }

    /// Count and share of each distinct satisfaction score, ascending by score.
    pub fn satisfaction_distribution(table: &CleanTable) -> View<Vec<ScoreBucket>> {
        View::when(table.schema().has_satisfaction, schema::SATISFACTION, || {
            let mut scores: Vec<f64> = table.iter().filter_map(|t| t.satisfaction).collect();
            scores.sort_by(f64::total_cmp);

            let total = scores.len() as f64;
            scores
                .chunk_by(|a, b| a == b)
                .map(|run| ScoreBucket {
                    score: run[0],
                    count: run.len(),
                    share_pct: round2(run.len() as f64 / total * 100.0),
                })
                .collect()
        })
    }

    /// Amount per calendar day, ascending, one row per distinct day.
    ///
    /// Rows with a null date are left out.
    pub fn daily_sales(table: &CleanTable) -> View<Vec<DailySales>> {
        View::when(
            table.schema().has_transaction_date,
            schema::TRANSACTION_DATE,
            || {
                group_fold(table, Transaction::day, |t| Some(t.amount))
                    .into_iter()
                    .map(|(day, acc)| DailySales {
                        day,
                        total_amount: round2(acc.sum()),
                    })
                    .collect()
            },
        )
    }

    /// Distribution of transaction amounts.
    pub fn amount_histogram(table: &CleanTable, bins: usize) -> Histogram {
        Self::histogram(table.iter().map(|t| t.amount), bins)
    }

    /// Distribution of quantities (null quantities skipped).
    pub fn quantity_histogram(table: &CleanTable, bins: usize) -> View<Histogram> {
        View::when(table.schema().has_quantity, schema::QUANTITY, || {
            Self::histogram(table.iter().filter_map(|t| t.quantity), bins)
        })
    }

    /// Equal-width histogram over the value range.
    ///
    /// A single distinct value gets a unit-wide range centered on it. Bin
    /// bounds are exact; rounding is left to display.
    pub fn histogram(values: impl Iterator<Item = f64>, bins: usize) -> Histogram {
        let values: Vec<f64> = values.filter(|v| v.is_finite()).collect();
        if values.is_empty() || bins == 0 {
            return Histogram::default();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in &values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram {
            bins: counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| HistogramBin {
                    lower: lo + i as f64 * width,
                    upper: if i + 1 == bins {
                        hi
                    } else {
                        lo + (i + 1) as f64 * width
                    },
                    count,
                })
                .collect(),
        }
    }

    /// Filtered row count as a percentage of the unfiltered count.
    pub fn kpi_share(filtered_count: usize, total_count: usize) -> Option<f64> {
        (total_count > 0).then(|| round2(filtered_count as f64 / total_count as f64 * 100.0))
    }
}
