//! Collision Dashboard Main Application
//! Main window with control panel and dashboard page.

use crate::charts::DashboardViews;
use crate::config::DashboardConfig;
use crate::data::{CacheState, CollisionSource, CollisionTable, CsvSource, TableCache};
use crate::gui::{ControlPanel, ControlPanelAction, Dashboard};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info};

/// Table loading result from background thread
enum LoadResult {
    Complete {
        table: Arc<CollisionTable>,
        elapsed_ms: u128,
    },
    Error(String),
}

/// Main application window.
pub struct CollisionApp {
    cache: Arc<TableCache<CsvSource>>,
    control_panel: ControlPanel,
    dashboard: Dashboard,

    original_table: Option<Arc<CollisionTable>>,
    views: Option<DashboardViews>,
    stale: bool,

    // Async table loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl CollisionApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            cache: Arc::new(TableCache::new(
                CsvSource::new(config.data_path.clone()),
                config.cache_policy,
            )),
            control_panel: ControlPanel::new(config.data_path, config.max_rows),
            dashboard: Dashboard::new(),
            original_table: None,
            views: None,
            stale: false,
            load_rx: None,
            is_loading: false,
        };
        app.start_load();
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            info!(
                from = %self.cache.source().path().display(),
                to = %path.display(),
                "Switching collision source"
            );
            let policy = self.cache.policy();
            self.cache = Arc::new(TableCache::new(CsvSource::new(path.clone()), policy));
            self.control_panel.settings.csv_path = path;
            self.start_load();
        }
    }

    /// Load through the cache on a background thread
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        let max_rows = self.control_panel.settings.max_rows;
        let cache = Arc::clone(&self.cache);
        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.busy = true;
        let status = match self.cache.state(max_rows) {
            CacheState::Populated => format!("Checking cached {max_rows} rows..."),
            CacheState::Empty => format!("Reading up to {max_rows} rows..."),
        };
        self.control_panel.set_status(&status);

        thread::spawn(move || {
            let start = Instant::now();
            let result = match cache.load(max_rows) {
                Ok(table) => LoadResult::Complete {
                    table,
                    elapsed_ms: start.elapsed().as_millis(),
                },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            match rx.try_recv() {
                Ok(LoadResult::Complete { table, elapsed_ms }) => {
                    self.control_panel.loaded_rows = Some(table.height());
                    self.control_panel
                        .set_status(&format!("Loaded in {elapsed_ms} ms"));
                    self.original_table = Some(table);
                    self.stale = true;
                    self.finish_load();
                }
                Ok(LoadResult::Error(message)) => {
                    error!(%message, "Collision load failed");
                    self.control_panel.set_status(&format!("Error: {message}"));
                    self.finish_load();
                }
                Err(_) => {
                    // Still running
                    self.load_rx = Some(rx);
                }
            }
        }
    }

    /// Drop the cached entry for the current row limit and read again.
    fn reload(&mut self) {
        if self.is_loading {
            return;
        }
        self.cache.invalidate(self.control_panel.settings.max_rows);
        self.start_load();
    }

    fn clear_cache(&mut self) {
        if self.is_loading {
            return;
        }
        debug!(source = %self.cache.source().describe(), "Clearing collision cache");
        self.cache.clear();
        self.control_panel.set_status("Cache cleared");
    }

    fn finish_load(&mut self) {
        self.is_loading = false;
        self.control_panel.busy = false;
    }

    /// Recompute every view from the original table.
    fn refresh_views(&mut self) {
        if !self.stale {
            return;
        }
        self.stale = false;

        let Some(original_table) = &self.original_table else {
            self.views = None;
            return;
        };
        match DashboardViews::compute(original_table, &self.dashboard.params) {
            Ok(views) => self.views = Some(views),
            Err(e) => {
                error!(error = %e, "Dashboard evaluation failed");
                self.control_panel.set_status(&format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for CollisionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        self.refresh_views();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Load => self.start_load(),
                        ControlPanelAction::Reload => self.reload(),
                        ControlPanelAction::ClearCache => self.clear_cache(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.dashboard.show(ui, self.views.as_ref()) {
                self.stale = true;
                ctx.request_repaint();
            }
        });
    }
}
