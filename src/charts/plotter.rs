//! Chart Plotter Module
//! Draws summary views as interactive egui_plot charts and grids.

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};
use retail_dashboard::stats::{DailySales, Histogram, StoreCategorySales};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

pub const ACCENT: Color32 = Color32::from_rgb(255, 75, 75);
pub const WARNING: Color32 = Color32::from_rgb(243, 156, 18);

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const CHART_HEIGHT: f32 = 280.0;

/// Creates dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Format an optional measure, "-" when undefined.
    pub fn fmt_opt(value: Option<f64>) -> String {
        value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Axis formatter showing `labels[i]` at integer position `i`.
    fn label_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
        move |mark, _range| {
            let idx = mark.value.round();
            if idx < 0.0 || (idx - mark.value).abs() > 1e-6 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        }
    }

    /// One bar per label, colored from the palette.
    pub fn bar_chart(ui: &mut egui::Ui, id: &str, labels: &[String], values: &[f64], y_label: &str) {
        let bars: Vec<Bar> = labels
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (label, &value))| {
                Bar::new(i as f64, value)
                    .name(label)
                    .fill(Self::color(i))
                    .width(0.6)
            })
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label(y_label.to_string())
            .x_axis_formatter(Self::label_formatter(labels.to_vec()))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(y_label));
            });
    }

    /// Store totals stacked by category.
    pub fn stacked_store_category(ui: &mut egui::Ui, id: &str, rows: &[StoreCategorySales]) {
        let stores: Vec<String> = rows
            .iter()
            .map(|r| r.store.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let categories: BTreeSet<&str> = rows.iter().map(|r| r.category.as_str()).collect();

        let mut charts: Vec<BarChart> = Vec::new();
        for (ci, category) in categories.iter().enumerate() {
            let bars: Vec<Bar> = stores
                .iter()
                .enumerate()
                .map(|(si, store)| {
                    let value = rows
                        .iter()
                        .find(|r| &r.store == store && r.category == *category)
                        .map(|r| r.total_amount)
                        .unwrap_or(0.0);
                    Bar::new(si as f64, value).width(0.6)
                })
                .collect();

            let refs: Vec<&BarChart> = charts.iter().collect();
            let chart = BarChart::new(bars)
                .name(*category)
                .color(Self::color(ci))
                .stack_on(&refs);
            charts.push(chart);
        }

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label("Amount")
            .x_axis_formatter(Self::label_formatter(stores))
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Daily totals as a line with markers, days as x labels.
    pub fn daily_line(ui: &mut egui::Ui, id: &str, days: &[DailySales]) {
        let labels: Vec<String> = days.iter().map(|d| d.day.format("%Y-%m-%d").to_string()).collect();
        let points: Vec<[f64; 2]> = days
            .iter()
            .enumerate()
            .map(|(i, d)| [i as f64, d.total_amount])
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .y_axis_label("Sales")
            .x_axis_formatter(Self::label_formatter(labels))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .color(ACCENT)
                        .width(3.0)
                        .name("Daily sales"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(4.0)
                        .color(ACCENT),
                );
            });
    }

    /// Decimals needed to tell adjacent bin bounds apart.
    fn bound_decimals(width: f64) -> usize {
        if width >= 0.01 || width <= 0.0 {
            2
        } else {
            ((-width.log10()).ceil() as usize + 1).min(12)
        }
    }

    /// Histogram bars centered on each bin.
    pub fn histogram(ui: &mut egui::Ui, id: &str, histogram: &Histogram, color: Color32) {
        let bars: Vec<Bar> = histogram
            .bins
            .iter()
            .map(|bin| {
                let width = bin.upper - bin.lower;
                let decimals = Self::bound_decimals(width);
                Bar::new((bin.lower + bin.upper) / 2.0, bin.count as f64)
                    .width(width.max(f64::EPSILON))
                    .name(format!(
                        "{:.*} – {:.*}",
                        decimals, bin.lower, decimals, bin.upper
                    ))
            })
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_scroll(false)
            .y_axis_label("Count")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(color));
            });
    }

    /// Striped table with a header row.
    pub fn table(ui: &mut egui::Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(id))
                    .striped(true)
                    .min_col_width(80.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for header in headers {
                            ui.label(RichText::new(*header).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(12.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Shown in place of a chart whose source column is missing.
    pub fn unavailable(ui: &mut egui::Ui, column: &str) {
        ui.label(
            RichText::new(format!("⚠ Column '{}' not available", column))
                .color(WARNING)
                .size(14.0),
        );
    }
}
