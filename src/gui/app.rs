//! Retail Dashboard Main Application
//! Main window with the filter panel and the tabbed views.

use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::{Color32, RichText, SidePanel};
use retail_dashboard::config::AppConfig;
use retail_dashboard::data::{CleanOutcome, FailureKind, LoadError, TableCache};
use retail_dashboard::stats::DashboardViews;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

/// Loading result from background thread
enum LoadResult {
    Complete(Arc<CleanOutcome>),
    Error(LoadError),
}

/// Main application window.
pub struct DashboardApp {
    config: AppConfig,
    cache: Arc<Mutex<TableCache>>,
    outcome: Option<Arc<CleanOutcome>>,
    views: Option<DashboardViews>,
    load_error: Option<(FailureKind, String)>,

    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(&config.data_path),
            chart_viewer: ChartViewer::new(),
            config,
            cache: Arc::new(Mutex::new(TableCache::new())),
            outcome: None,
            views: None,
            load_error: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_load(false);
        app
    }

    /// Load (or reload) the data source in a background thread.
    fn start_load(&mut self, force: bool) {
        if self.is_loading {
            return; // Already loading
        }

        self.is_loading = true;
        self.control_panel.set_status("Loading data...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let cache = Arc::clone(&self.cache);
        let path = self.config.data_path.clone();

        thread::spawn(move || {
            let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let result = if force {
                cache.reload(&path)
            } else {
                cache.get_or_load(&path)
            };

            let _ = tx.send(match result {
                Ok(outcome) => LoadResult::Complete(outcome),
                Err(e) => LoadResult::Error(e),
            });
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(outcome)) => {
                self.control_panel
                    .update_choices(&outcome.table, &outcome.report);
                self.control_panel.set_status(&format!(
                    "Loaded {} transactions",
                    outcome.table.len()
                ));
                self.outcome = Some(outcome);
                self.load_error = None;
                self.is_loading = false;
                self.recompute_views();
            }
            Ok(LoadResult::Error(error)) => {
                log::error!("Loading failed at step '{}': {}", error.step(), error);
                self.outcome = None;
                self.views = None;
                self.load_error = Some((error.kind(), error.to_string()));
                self.is_loading = false;
            }
            Err(_) => {
                // Still loading
                self.load_rx = Some(rx);
            }
        }
    }

    /// Apply the current filter and rebuild every view.
    fn recompute_views(&mut self) {
        let Some(outcome) = &self.outcome else {
            self.views = None;
            return;
        };

        let filtered = self.control_panel.commit_filter().apply(&outcome.table);
        self.control_panel
            .set_counts(filtered.len(), outcome.table.len());
        self.views = Some(DashboardViews::compute(&filtered, outcome.table.len()));
    }

    fn handle_export_json(&mut self) {
        let Some(views) = &self.views else {
            self.control_panel.set_status("No views to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("dashboard_views.json")
            .save_file()
        else {
            return; // User cancelled
        };

        match views.export_json(&path) {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Exported to {}", path.display())),
            Err(e) => self.control_panel.set_status(&format!("Error: {}", e)),
        }
    }

    /// Blocking error shown instead of the dashboard when loading failed.
    fn show_load_error(&mut self, ui: &mut egui::Ui, kind: FailureKind, message: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            let title = match kind {
                FailureKind::SourceUnavailable => "❌ Data file not found",
                FailureKind::ParseFailure => "❌ Data file could not be read",
            };
            ui.label(
                RichText::new(title)
                    .size(24.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
            ui.add_space(10.0);
            ui.label(RichText::new(message).size(14.0));
            ui.add_space(10.0);
            ui.label(
                RichText::new(format!(
                    "💡 Place your CSV or Excel file at '{}' or set RETAIL_DASHBOARD_DATA.",
                    self.config.data_path.display()
                ))
                .color(Color32::GRAY),
            );
            ui.add_space(15.0);
            if ui.button("🔄 Retry").clicked() {
                self.start_load(true);
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        if let Some((kind, message)) = self.load_error.clone() {
            egui::CentralPanel::default().show(ctx, |ui| {
                self.show_load_error(ui, kind, &message);
            });
            return;
        }

        // Left panel - Filters
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let response = self.control_panel.show(ui);
                    // Views must reflect the selection before any action uses them
                    if response.filter_changed {
                        self.recompute_views();
                    }
                    match response.action {
                        ControlPanelAction::Reload => self.start_load(true),
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Views
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.is_loading && self.views.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }
            self.chart_viewer.show(ui, self.views.as_ref());
        });
    }
}
