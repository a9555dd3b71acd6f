//! Control Panel Widget
//! Left side panel with the data source status and the dashboard filters.

use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText};
use egui_extras::DatePickerButton;
use retail_dashboard::data::{CleanTable, CleaningReport, DashboardFilter, DateRange};
use std::path::Path;

/// Current filter selection and the values it can take.
#[derive(Default, Clone)]
pub struct FilterSettings {
    pub store: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub date_enabled: bool,
    pub single_day: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Left side control panel with source info, filters and actions.
#[derive(Default)]
pub struct ControlPanel {
    pub settings: FilterSettings,
    pub source_name: String,
    stores: Vec<String>,
    categories: Vec<String>,
    payment_methods: Vec<String>,
    has_payment_method: bool,
    date_bounds: Option<(NaiveDate, NaiveDate)>,
    report: Option<CleaningReport>,
    shown_rows: usize,
    total_rows: usize,
    pub status: String,
    /// Filter the current views were computed with.
    applied: DashboardFilter,
}

impl ControlPanel {
    pub fn new(source: &Path) -> Self {
        Self {
            source_name: source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| source.display().to_string()),
            status: "Ready".to_string(),
            ..Self::default()
        }
    }

    /// Refresh filter choices after a (re)load; resets the selection.
    pub fn update_choices(&mut self, table: &CleanTable, report: &CleaningReport) {
        self.stores = table.stores();
        self.categories = table.categories();
        self.payment_methods = table.payment_methods();
        self.has_payment_method = table.schema().has_payment_method;
        self.date_bounds = if table.schema().has_transaction_date {
            table.date_bounds()
        } else {
            None
        };
        self.report = Some(report.clone());

        let (start, end) = self.date_bounds.unwrap_or_default();
        self.settings = FilterSettings {
            start,
            end,
            ..FilterSettings::default()
        };
    }

    pub fn set_counts(&mut self, shown: usize, total: usize) {
        self.shown_rows = shown;
        self.total_rows = total;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Filter built from the current selection.
    pub fn filter(&self) -> DashboardFilter {
        let date_range = match (self.settings.date_enabled, self.date_bounds) {
            (true, Some(_)) if self.settings.single_day => {
                Some(DateRange::single(self.settings.start))
            }
            (true, Some(_)) => Some(DateRange::new(self.settings.start, self.settings.end)),
            _ => None,
        };

        DashboardFilter {
            store: self.settings.store.clone(),
            category: self.settings.category.clone(),
            payment_method: self.settings.payment_method.clone(),
            date_range,
        }
    }

    /// True when the selection differs from the filter behind the current views.
    pub fn filter_changed(&self) -> bool {
        self.filter() != self.applied
    }

    /// Record the current selection as applied and return it.
    pub fn commit_filter(&mut self) -> DashboardFilter {
        self.applied = self.filter();
        self.applied.clone()
    }

    /// Combo box with an "all" entry mapped to `None`.
    fn choice_combo(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        all_label: &str,
        choices: &[String],
        selected: &mut Option<String>,
    ) {
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(170.0)
                .selected_text(selected.as_deref().unwrap_or(all_label))
                .show_ui(ui, |ui| {
                    ui.selectable_value(selected, None, all_label);
                    for choice in choices {
                        ui.selectable_value(selected, Some(choice.clone()), choice.as_str());
                    }
                });
        });
    }

    /// Draw the control panel
    ///
    /// A filter change is reported alongside any button action of the same frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> PanelResponse {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Retail Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 75, 75)),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&self.source_name).size(12.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                });

                if let Some(report) = &self.report {
                    ui.label(
                        RichText::new(format!(
                            "{} raw rows → {} clean ({} dropped, {} duplicates, {} bad dates)",
                            report.raw_rows,
                            report.clean_rows,
                            report.dropped_missing_required,
                            report.duplicates_removed,
                            report.invalid_dates
                        ))
                        .size(11.0)
                        .color(Color32::GRAY),
                    );
                }
            });

        ui.add_space(10.0);
        ui.separator();

        // ===== Filters Section =====
        ui.label(RichText::new("🎛 Filters").size(14.0).strong());
        ui.add_space(5.0);

        Self::choice_combo(
            ui,
            "store_filter",
            "🏪 Store:",
            "All",
            &self.stores,
            &mut self.settings.store,
        );
        Self::choice_combo(
            ui,
            "category_filter",
            "📦 Category:",
            "All",
            &self.categories,
            &mut self.settings.category,
        );
        if self.has_payment_method {
            Self::choice_combo(
                ui,
                "payment_filter",
                "💳 Payment:",
                "All",
                &self.payment_methods,
                &mut self.settings.payment_method,
            );
        }

        if let Some((min_day, max_day)) = self.date_bounds {
            ui.add_space(5.0);
            ui.checkbox(&mut self.settings.date_enabled, "📅 Filter by date");
            ui.add_enabled_ui(self.settings.date_enabled, |ui| {
                ui.checkbox(&mut self.settings.single_day, "Single day");
                ui.horizontal(|ui| {
                    ui.label(if self.settings.single_day { "Day:" } else { "From:" });
                    ui.push_id("date_start", |ui| {
                        ui.add(DatePickerButton::new(&mut self.settings.start));
                    });
                });
                if !self.settings.single_day {
                    ui.horizontal(|ui| {
                        ui.label("To:");
                        ui.push_id("date_end", |ui| {
                            ui.add(DatePickerButton::new(&mut self.settings.end));
                        });
                    });
                }
                ui.label(
                    RichText::new(format!("Data covers {} to {}", min_day, max_day))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });
        }

        ui.add_space(10.0);
        if ui.button("Reset filters").clicked() {
            let (start, end) = self.date_bounds.unwrap_or_default();
            self.settings = FilterSettings {
                start,
                end,
                ..FilterSettings::default()
            };
        }

        ui.add_space(10.0);
        ui.separator();

        ui.label(
            RichText::new(format!(
                "📊 {} transactions shown of {}",
                self.shown_rows, self.total_rows
            ))
            .size(13.0),
        );

        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("💾 Export JSON").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportJson;
            }
        });

        ui.add_space(10.0);
        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        PanelResponse {
            action,
            filter_changed: self.filter_changed(),
        }
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
    ExportJson,
}

/// Outcome of drawing the panel for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelResponse {
    pub action: ControlPanelAction,
    pub filter_changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_once(panel: &mut ControlPanel) -> PanelResponse {
        let ctx = egui::Context::default();
        let mut response = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                response = Some(panel.show(ui));
            });
        });
        response.unwrap()
    }

    #[test]
    fn test_unchanged_selection_reports_no_change() {
        let mut panel = ControlPanel::default();
        panel.commit_filter();
        let response = show_once(&mut panel);
        assert_eq!(response.action, ControlPanelAction::None);
        assert!(!response.filter_changed);
    }

    #[test]
    fn test_change_reported_until_committed() {
        let mut panel = ControlPanel::default();
        panel.commit_filter();
        panel.settings.store = Some("Paris Centre".to_string());

        // Stays reported across frames until the views are rebuilt
        let response = show_once(&mut panel);
        assert!(response.filter_changed);
        assert!(panel.filter_changed());

        let applied = panel.commit_filter();
        assert_eq!(applied.store.as_deref(), Some("Paris Centre"));
        assert!(!panel.filter_changed());
        assert!(!show_once(&mut panel).filter_changed);
    }
}
