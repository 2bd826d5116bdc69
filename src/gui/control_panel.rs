//! Control Panel Widget
//! Left side panel with the data source, row limit and load status.

use egui::{Color32, RichText};
use std::path::PathBuf;

/// Where the data comes from and how much of it to load.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub csv_path: PathBuf,
    pub max_rows: usize,
}

/// Left side control panel with file selection and load controls.
pub struct ControlPanel {
    pub settings: SourceSettings,
    pub loaded_rows: Option<usize>,
    pub status: String,
    pub busy: bool,
}

impl ControlPanel {
    pub fn new(csv_path: PathBuf, max_rows: usize) -> Self {
        Self {
            settings: SourceSettings { csv_path, max_rows },
            loaded_rows: None,
            status: "Ready".to_string(),
            busy: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚗 NYC Collisions")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Motor vehicle collision dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let file_name = self
                        .settings
                        .csv_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(&file_name).size(12.0))
                        .on_hover_text(self.settings.csv_path.display().to_string());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                        });
                    });
                });
            });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("Max rows:");
            ui.add(
                egui::DragValue::new(&mut self.settings.max_rows)
                    .range(0..=10_000_000)
                    .speed(1000.0),
            );
        });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.busy, |ui| {
                let button = egui::Button::new(RichText::new("▶ Load").size(15.0))
                    .min_size(egui::vec2(160.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Load;
                }
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if ui.button("🔄 Reload").on_hover_text("Re-read this row limit").clicked() {
                        action = ControlPanelAction::Reload;
                    }
                    if ui.button("🗑 Clear cache").clicked() {
                        action = ControlPanelAction::ClearCache;
                    }
                });
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        if self.busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }
        if let Some(rows) = self.loaded_rows {
            ui.label(RichText::new(format!("{rows} collisions loaded")).size(12.0));
        }

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Load,
    Reload,
    ClearCache,
}
