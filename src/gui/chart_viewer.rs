//! Chart Viewer Widget
//! Central tabbed area rendering the dashboard views.

use crate::charts::{ChartPlotter, ACCENT};
use egui::{Color32, RichText, ScrollArea};
use retail_dashboard::stats::{DashboardViews, GroupMean, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Stores,
    Categories,
    Payment,
    Satisfaction,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Stores,
        Tab::Categories,
        Tab::Payment,
        Tab::Satisfaction,
    ];

    fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "📈 Overview",
            Tab::Stores => "🏪 Stores",
            Tab::Categories => "📦 Categories",
            Tab::Payment => "💳 Payment",
            Tab::Satisfaction => "⭐ Satisfaction",
        }
    }
}

/// Tabbed display of the current views.
#[derive(Default)]
pub struct ChartViewer {
    pub active_tab: Tab,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, views: Option<&DashboardViews>) {
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.active_tab, tab, RichText::new(tab.title()).size(15.0));
            }
        });
        ui.separator();

        let Some(views) = views else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.active_tab {
                Tab::Overview => Self::show_overview(ui, views),
                Tab::Stores => Self::show_stores(ui, views),
                Tab::Categories => Self::show_categories(ui, views),
                Tab::Payment => Self::show_payment(ui, views),
                Tab::Satisfaction => Self::show_satisfaction(ui, views),
            });
    }

    fn heading(ui: &mut egui::Ui, text: &str) {
        ui.add_space(8.0);
        ui.label(RichText::new(text).size(16.0).strong());
        ui.add_space(4.0);
    }

    fn kpi_card(ui: &mut egui::Ui, label: &str, value: String, detail: Option<String>) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, ACCENT))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_width(200.0);
                ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(22.0).strong());
                if let Some(detail) = detail {
                    ui.label(RichText::new(detail).size(11.0).color(ACCENT));
                }
            });
    }

    fn show_overview(ui: &mut egui::Ui, views: &DashboardViews) {
        let overview = &views.overview;
        let kpis = &overview.kpis;

        ui.horizontal(|ui| {
            Self::kpi_card(
                ui,
                "💰 Total sales",
                format!("{:.0} €", kpis.total_amount),
                kpis.mean_amount.map(|m| format!("{:.2} €/transaction", m)),
            );
            Self::kpi_card(
                ui,
                "🛒 Transactions",
                kpis.transaction_count.to_string(),
                overview
                    .share_of_total_pct
                    .map(|p| format!("{:.1}% of total", p)),
            );
            Self::kpi_card(
                ui,
                "📊 Mean amount",
                format!("{} €", ChartPlotter::fmt_opt(kpis.mean_amount)),
                None,
            );
            Self::kpi_card(
                ui,
                "⭐ Mean satisfaction",
                format!("{}/5", ChartPlotter::fmt_opt(kpis.mean_satisfaction)),
                None,
            );
        });

        Self::heading(ui, "📈 Daily sales");
        match &overview.daily_sales {
            View::Available(days) => ChartPlotter::daily_line(ui, "daily_sales", days),
            View::Unavailable { column } => ChartPlotter::unavailable(ui, column),
        }

        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "📊 Amount distribution");
            ChartPlotter::histogram(
                &mut cols[0],
                "amount_histogram",
                &overview.amount_histogram,
                ChartPlotter::color(0),
            );

            Self::heading(&mut cols[1], "📦 Quantities sold");
            match &overview.quantity_histogram {
                View::Available(hist) => ChartPlotter::histogram(
                    &mut cols[1],
                    "quantity_histogram",
                    hist,
                    ChartPlotter::color(2),
                ),
                View::Unavailable { column } => ChartPlotter::unavailable(&mut cols[1], column),
            }
        });
    }

    fn show_stores(ui: &mut egui::Ui, views: &DashboardViews) {
        let stores = &views.sales.by_store;
        let labels: Vec<String> = stores.iter().map(|s| s.store.clone()).collect();

        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "🥧 Sales by store");
            let totals: Vec<f64> = stores.iter().map(|s| s.total_amount).collect();
            ChartPlotter::bar_chart(&mut cols[0], "store_totals", &labels, &totals, "Sales");

            Self::heading(&mut cols[1], "📊 Mean amount by store");
            let means: Vec<f64> = stores.iter().map(|s| s.mean_amount.unwrap_or(0.0)).collect();
            ChartPlotter::bar_chart(&mut cols[1], "store_means", &labels, &means, "Mean amount");
        });

        Self::heading(ui, "📋 Store summary");
        let rows: Vec<Vec<String>> = stores
            .iter()
            .map(|s| {
                vec![
                    s.store.clone(),
                    format!("{:.2}", s.total_amount),
                    ChartPlotter::fmt_opt(s.mean_amount),
                    s.transaction_count.to_string(),
                ]
            })
            .collect();
        ChartPlotter::table(
            ui,
            "store_table",
            &["Store", "Total sales", "Mean amount", "Transactions"],
            &rows,
        );

        Self::heading(ui, "📊 Sales by store and category");
        ChartPlotter::stacked_store_category(ui, "store_category", &views.sales.by_store_and_category);
    }

    fn show_categories(ui: &mut egui::Ui, views: &DashboardViews) {
        let categories = &views.sales.by_category;
        let labels: Vec<String> = categories.iter().map(|c| c.category.clone()).collect();

        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "📊 Quantity by category");
            let quantities: Vec<f64> = categories.iter().map(|c| c.total_quantity).collect();
            ChartPlotter::bar_chart(&mut cols[0], "category_quantity", &labels, &quantities, "Quantity");

            Self::heading(&mut cols[1], "💰 Sales by category");
            let totals: Vec<f64> = categories.iter().map(|c| c.total_amount).collect();
            ChartPlotter::bar_chart(&mut cols[1], "category_totals", &labels, &totals, "Sales");
        });

        Self::heading(ui, "📋 Category summary");
        let rows: Vec<Vec<String>> = categories
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    format!("{:.2}", c.total_quantity),
                    format!("{:.2}", c.total_amount),
                ]
            })
            .collect();
        ChartPlotter::table(
            ui,
            "category_table",
            &["Category", "Total quantity", "Total sales"],
            &rows,
        );
    }

    fn show_payment(ui: &mut egui::Ui, views: &DashboardViews) {
        let payment = &views.payment;
        let distribution = match &payment.distribution {
            View::Available(d) => d,
            View::Unavailable { column } => {
                ChartPlotter::unavailable(ui, column);
                return;
            }
        };

        Self::heading(ui, "📊 Transactions by payment method");
        let labels: Vec<String> = distribution.iter().map(|p| p.method.clone()).collect();
        let counts: Vec<f64> = distribution.iter().map(|p| p.count as f64).collect();
        ChartPlotter::bar_chart(ui, "payment_counts", &labels, &counts, "Transactions");

        if let Some(top) = &payment.top_method {
            ui.add_space(6.0);
            ui.label(
                RichText::new(format!(
                    "🏆 Most used payment method: {} ({:.1}%)",
                    top.method, top.share_pct
                ))
                .size(14.0)
                .color(Color32::from_rgb(40, 167, 69)),
            );
        }

        if let View::Available(means) = &payment.mean_amount {
            Self::heading(ui, "💰 Mean amount by payment method");
            Self::group_mean_chart(ui, "payment_means", means, "Mean amount");
        }
    }

    fn show_satisfaction(ui: &mut egui::Ui, views: &DashboardViews) {
        let satisfaction = &views.satisfaction;

        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "📊 Satisfaction by store");
            match &satisfaction.by_store {
                View::Available(means) => {
                    Self::group_mean_chart(&mut cols[0], "satisfaction_store", means, "Score (1-5)")
                }
                View::Unavailable { column } => ChartPlotter::unavailable(&mut cols[0], column),
            }

            Self::heading(&mut cols[1], "📦 Satisfaction by category");
            match &satisfaction.by_category {
                View::Available(means) => Self::group_mean_chart(
                    &mut cols[1],
                    "satisfaction_category",
                    means,
                    "Score (1-5)",
                ),
                View::Unavailable { column } => ChartPlotter::unavailable(&mut cols[1], column),
            }
        });

        if let View::Available(buckets) = &satisfaction.distribution {
            Self::heading(ui, "📊 Score distribution");
            let labels: Vec<String> = buckets.iter().map(|b| format!("{}", b.score)).collect();
            let counts: Vec<f64> = buckets.iter().map(|b| b.count as f64).collect();
            ChartPlotter::bar_chart(ui, "score_distribution", &labels, &counts, "Customers");

            let rows: Vec<Vec<String>> = buckets
                .iter()
                .map(|b| {
                    vec![
                        format!("{}", b.score),
                        b.count.to_string(),
                        format!("{:.2}%", b.share_pct),
                    ]
                })
                .collect();
            ChartPlotter::table(ui, "score_table", &["Score", "Count", "Share"], &rows);
        }
    }

    fn group_mean_chart(ui: &mut egui::Ui, id: &str, means: &[GroupMean], y_label: &str) {
        let labels: Vec<String> = means.iter().map(|m| m.key.clone()).collect();
        let values: Vec<f64> = means.iter().map(|m| m.mean.unwrap_or(0.0)).collect();
        ChartPlotter::bar_chart(ui, id, &labels, &values, y_label);
    }
}
