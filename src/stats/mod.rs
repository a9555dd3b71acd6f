//! Stats module - grouped aggregation of clean transactions

mod accumulator;
mod aggregator;
mod dashboard;

pub use accumulator::{group_fold, round2, Accumulator};
pub use aggregator::{
    CategorySales, DailySales, GroupMean, Histogram, HistogramBin, KpiSummary, PaymentCount,
    SalesAggregator, ScoreBucket, StoreCategorySales, StoreSales, TopPayment, View,
    AMOUNT_HISTOGRAM_BINS, QUANTITY_HISTOGRAM_BINS,
};
pub use dashboard::{
    DashboardViews, ExportError, OverviewViews, PaymentViews, SalesViews, SatisfactionViews,
};
