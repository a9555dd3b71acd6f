//! Dashboard Views Module
//! Computes every summary view for one filtered table and exports them as JSON.

use super::aggregator::{
    CategorySales, DailySales, GroupMean, Histogram, KpiSummary, PaymentCount, SalesAggregator,
    ScoreBucket, StoreCategorySales, StoreSales, TopPayment, View, AMOUNT_HISTOGRAM_BINS,
    QUANTITY_HISTOGRAM_BINS,
};
use crate::data::CleanTable;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize views: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Overview tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewViews {
    pub kpis: KpiSummary,
    /// Filtered transactions as a percentage of the whole table.
    pub share_of_total_pct: Option<f64>,
    pub daily_sales: View<Vec<DailySales>>,
    pub amount_histogram: Histogram,
    pub quantity_histogram: View<Histogram>,
}

/// Store and category tabs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesViews {
    pub by_store: Vec<StoreSales>,
    pub by_category: Vec<CategorySales>,
    pub by_store_and_category: Vec<StoreCategorySales>,
}

/// Payment tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentViews {
    pub distribution: View<Vec<PaymentCount>>,
    pub top_method: Option<TopPayment>,
    pub mean_amount: View<Vec<GroupMean>>,
}

/// Satisfaction tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionViews {
    pub by_store: View<Vec<GroupMean>>,
    pub by_category: View<Vec<GroupMean>>,
    pub distribution: View<Vec<ScoreBucket>>,
}

/// All summary views for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub overview: OverviewViews,
    pub sales: SalesViews,
    pub payment: PaymentViews,
    pub satisfaction: SatisfactionViews,
}

impl DashboardViews {
    /// Compute every view over `filtered`.
    ///
    /// `total_rows` is the size of the unfiltered table. Independent groups of
    /// views run on the rayon pool; the table is only read.
    pub fn compute(filtered: &CleanTable, total_rows: usize) -> Self {
        let ((overview, sales), (payment, satisfaction)) = rayon::join(
            || {
                rayon::join(
                    || Self::overview(filtered, total_rows),
                    || Self::sales(filtered),
                )
            },
            || {
                rayon::join(
                    || Self::payment(filtered),
                    || Self::satisfaction(filtered),
                )
            },
        );

        Self {
            overview,
            sales,
            payment,
            satisfaction,
        }
    }

    fn overview(table: &CleanTable, total_rows: usize) -> OverviewViews {
        OverviewViews {
            kpis: SalesAggregator::kpi_summary(table),
            share_of_total_pct: SalesAggregator::kpi_share(table.len(), total_rows),
            daily_sales: SalesAggregator::daily_sales(table),
            amount_histogram: SalesAggregator::amount_histogram(table, AMOUNT_HISTOGRAM_BINS),
            quantity_histogram: SalesAggregator::quantity_histogram(
                table,
                QUANTITY_HISTOGRAM_BINS,
            ),
        }
    }

    fn sales(table: &CleanTable) -> SalesViews {
        SalesViews {
            by_store: SalesAggregator::sales_by_store(table),
            by_category: SalesAggregator::sales_by_category(table),
            by_store_and_category: SalesAggregator::sales_by_store_and_category(table),
        }
    }

    fn payment(table: &CleanTable) -> PaymentViews {
        let distribution = SalesAggregator::payment_distribution(table);
        let top_method = distribution
            .available()
            .and_then(|d| SalesAggregator::top_payment_method(d));
        PaymentViews {
            distribution,
            top_method,
            mean_amount: SalesAggregator::mean_amount_by_payment(table),
        }
    }

    fn satisfaction(table: &CleanTable) -> SatisfactionViews {
        SatisfactionViews {
            by_store: SalesAggregator::satisfaction_by_store(table),
            by_category: SalesAggregator::satisfaction_by_category(table),
            distribution: SalesAggregator::satisfaction_distribution(table),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn export_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Exported dashboard views to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DashboardFilter, Schema, Transaction};
    use chrono::NaiveDate;

    fn table() -> CleanTable {
        let at = |d: u32| {
            NaiveDate::from_ymd_opt(2024, 5, d)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        };
        CleanTable::new(
            Schema::full(),
            Vec::new(),
            vec![
                Transaction::new(100.0, "Paris", "TV")
                    .with_quantity(1.0)
                    .with_payment_method("Carte")
                    .with_satisfaction(5.0)
                    .with_date(at(1)),
                Transaction::new(50.0, "Lyon", "Audio")
                    .with_quantity(2.0)
                    .with_payment_method("Espèces")
                    .with_satisfaction(3.0)
                    .with_date(at(2)),
            ],
        )
    }

    #[test]
    fn test_compute_matches_individual_views() {
        let table = table();
        let views = DashboardViews::compute(&table, table.len());

        assert_eq!(views.overview.kpis, SalesAggregator::kpi_summary(&table));
        assert_eq!(views.sales.by_store, SalesAggregator::sales_by_store(&table));
        assert_eq!(views.overview.share_of_total_pct, Some(100.0));
        assert_eq!(views.payment.top_method.as_ref().unwrap().share_pct, 50.0);
        assert_eq!(views.payment.top_method.unwrap().method, "Carte");
    }

    #[test]
    fn test_compute_on_filtered_table() {
        let table = table();
        let filter = DashboardFilter {
            store: Some("Lyon".to_string()),
            ..DashboardFilter::default()
        };
        let filtered = filter.apply(&table);
        let views = DashboardViews::compute(&filtered, table.len());

        assert_eq!(views.overview.kpis.transaction_count, 1);
        assert_eq!(views.overview.kpis.total_amount, 50.0);
        assert_eq!(views.overview.share_of_total_pct, Some(50.0));
    }

    #[test]
    fn test_compute_on_empty_table() {
        let empty = CleanTable::new(Schema::full(), Vec::new(), Vec::new());
        let views = DashboardViews::compute(&empty, 0);

        assert_eq!(views.overview.kpis.transaction_count, 0);
        assert_eq!(views.overview.share_of_total_pct, None);
        assert_eq!(views.payment.top_method, None);
        assert!(views.to_json().is_ok());
    }

    #[test]
    fn test_json_marks_unavailable_views() {
        let table = CleanTable::new(
            Schema::default(),
            Vec::new(),
            vec![Transaction::new(10.0, "A", "X")],
        );
        let json = DashboardViews::compute(&table, 1).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["payment"]["distribution"]["status"], "unavailable");
        assert_eq!(
            value["payment"]["distribution"]["data"]["column"],
            "Mode_Paiement"
        );
        assert_eq!(value["overview"]["kpis"]["mean_satisfaction"], serde_json::Value::Null);
        assert_eq!(value["sales"]["by_store"][0]["store"], "A");
    }

    #[test]
    fn test_export_json_writes_file() {
        let table = table();
        let path = std::env::temp_dir().join(format!(
            "retail_dashboard_export_{}.json",
            std::process::id()
        ));
        DashboardViews::compute(&table, table.len())
            .export_json(&path)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(written.contains("\"daily_sales\""));
    }
}
