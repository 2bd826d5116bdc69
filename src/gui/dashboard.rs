//! Dashboard Widget
//! Central scrollable page: each section pairs its widget with the chart it drives.

use crate::charts::{CollisionPlotter, DashboardParams, DashboardViews};
use crate::data::{InjuryCategory, MAX_HOUR, MAX_INJURY_THRESHOLD};
use egui::{ComboBox, RichText, ScrollArea};

const SECTION_SPACING: f32 = 18.0;

/// Central dashboard page. Widget values live in `params`.
#[derive(Default)]
pub struct Dashboard {
    pub params: DashboardParams,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn header(ui: &mut egui::Ui, text: &str) {
        ui.add_space(SECTION_SPACING);
        ui.label(RichText::new(text).size(20.0).strong());
        ui.add_space(6.0);
    }

    /// Draw the page. Returns true when a widget value changed.
    pub fn show(&mut self, ui: &mut egui::Ui, views: Option<&DashboardViews>) -> bool {
        let before = self.params.clone();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new("MOTOR COLLISIONS IN NEW YORK CITY").size(26.0).strong());
                ui.label(
                    "A dashboard that can be used to analyse motor vehicle collisions in NYC",
                );

                let Some(views) = views else {
                    ui.add_space(40.0);
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No Data").size(20.0));
                    });
                    return;
                };

                // ===== Injuries map =====
                Self::header(ui, "Where are the most people injured in NYC?");
                ui.add(
                    egui::Slider::new(&mut self.params.min_injured, 0..=MAX_INJURY_THRESHOLD)
                        .text("Number of persons injured in vehicle collisions"),
                );
                CollisionPlotter::draw_point_map(ui, "injury_map", &views.injury_map);

                // ===== Hour of day =====
                Self::header(ui, "How many collisions occur during a given time of day?");
                ui.add(egui::Slider::new(&mut self.params.hour, 0..=MAX_HOUR).text("Hour to look at"));
                ui.label(format!("Vehicle collisions between {}", views.hour_label));
                CollisionPlotter::draw_hex_density(ui, views.hex_grid.as_ref(), &views.hexbins);

                ui.add_space(SECTION_SPACING);
                ui.label(
                    RichText::new(format!("Breakdown by minute between {}", views.hour_label))
                        .size(16.0)
                        .strong(),
                );
                CollisionPlotter::draw_minute_histogram(ui, &views.minute_series);

                // ===== Dangerous streets =====
                Self::header(ui, "Top dangerous streets by affected type");
                ui.horizontal(|ui| {
                    ui.label("Affected type of people");
                    ComboBox::from_id_salt("injury_category")
                        .selected_text(self.params.category.label())
                        .show_ui(ui, |ui| {
                            for category in InjuryCategory::ALL {
                                ui.selectable_value(
                                    &mut self.params.category,
                                    category,
                                    category.label(),
                                );
                            }
                        });
                });
                CollisionPlotter::draw_street_table(
                    ui,
                    views.params.category.column(),
                    &views.top_streets,
                );

                // ===== Raw data =====
                ui.add_space(SECTION_SPACING);
                ui.checkbox(&mut self.params.show_raw, "Show raw data");
                if let Some(raw) = &views.raw {
                    ui.label(RichText::new("Raw Data").size(16.0).strong());
                    CollisionPlotter::draw_raw_table(ui, raw);
                }
            });

        self.params != before
    }
}
