//! Chart Plotter Module
//! Draws the collision maps, minute histogram and tables with egui_plot.

use crate::charts::hexbin::{ELEVATION_RANGE, ELEVATION_SCALE};
use crate::charts::{HexBin, HexGrid, MapPoint, MinuteCount, RawTable};
use crate::data::{StreetCount, MINUTES_PER_HOUR};
use egui::{Color32, RichText, ScrollArea};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points, Polygon};

pub const POINT_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

/// Low to high density, yellow through dark red.
pub const DENSITY_PALETTE: [Color32; 6] = [
    Color32::from_rgb(255, 255, 178),
    Color32::from_rgb(254, 217, 118),
    Color32::from_rgb(254, 178, 76),
    Color32::from_rgb(253, 141, 60),
    Color32::from_rgb(240, 59, 32),
    Color32::from_rgb(189, 0, 38),
];

const MAP_HEIGHT: f32 = 380.0;
const CHART_HEIGHT: f32 = 300.0;
// A degree of longitude is ~0.76 of a degree of latitude at NYC.
const MAP_ASPECT: f32 = 0.76;

/// Creates the dashboard charts using egui_plot.
pub struct CollisionPlotter;

impl CollisionPlotter {
    /// Palette color for an elevation produced by hex binning.
    pub fn density_color(elevation: f64) -> Color32 {
        let top = ELEVATION_RANGE.1 * ELEVATION_SCALE;
        let share = if top > 0.0 {
            (elevation / top).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let idx = (share * (DENSITY_PALETTE.len() - 1) as f64).round() as usize;
        DENSITY_PALETTE[idx.min(DENSITY_PALETTE.len() - 1)]
    }

    fn no_data(ui: &mut egui::Ui, height: f32) {
        ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data").size(18.0).color(Color32::GRAY));
            });
        });
    }

    /// Scatter of collision locations, longitude on x.
    pub fn draw_point_map(ui: &mut egui::Ui, id: &str, points: &[MapPoint]) {
        if points.is_empty() {
            Self::no_data(ui, MAP_HEIGHT);
            return;
        }

        let plot_points: PlotPoints = points.iter().map(|p| [p.longitude, p.latitude]).collect();

        Plot::new(id)
            .height(MAP_HEIGHT)
            .data_aspect(MAP_ASPECT)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(plot_points)
                        .radius(2.0)
                        .color(POINT_COLOR.gamma_multiply(0.7))
                        .name("Collisions"),
                );
            });
    }

    /// Hexagons shaded by elevation, centered on the hour midpoint.
    pub fn draw_hex_density(ui: &mut egui::Ui, grid: Option<&HexGrid>, bins: &[HexBin]) {
        let Some(grid) = grid else {
            Self::no_data(ui, MAP_HEIGHT);
            return;
        };

        Plot::new("hex_density")
            .height(MAP_HEIGHT)
            .data_aspect(MAP_ASPECT)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .allow_scroll(false)
            .include_x(grid.origin_lon)
            .include_y(grid.origin_lat)
            .show(ui, |plot_ui| {
                for bin in bins {
                    let color = Self::density_color(bin.elevation);
                    let corners: PlotPoints = grid
                        .cell_corners((bin.q, bin.r))
                        .into_iter()
                        .map(|(lat, lon)| [lon, lat])
                        .collect();
                    plot_ui.polygon(
                        Polygon::new(corners)
                            .fill_color(color.gamma_multiply(0.8))
                            .stroke(egui::Stroke::new(0.5, color))
                            .name(format!("{} crashes", bin.count)),
                    );
                }
            });
    }

    /// Bar per minute of the selected hour.
    pub fn draw_minute_histogram(ui: &mut egui::Ui, series: &[MinuteCount]) {
        let bars: Vec<Bar> = series
            .iter()
            .map(|m| {
                Bar::new(m.minute as f64, m.crashes as f64)
                    .width(0.9)
                    .name(format!("minute {}", m.minute))
            })
            .collect();

        Plot::new("minute_histogram")
            .height(CHART_HEIGHT)
            .x_axis_label("minute")
            .y_axis_label("crashes")
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(-0.5)
            .include_x(MINUTES_PER_HOUR as f64 - 0.5)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("crashes"));
            });
    }

    /// Ranked street table for the selected injury column.
    pub fn draw_street_table(ui: &mut egui::Ui, column: &str, rows: &[StreetCount]) {
        if rows.is_empty() {
            Self::no_data(ui, 60.0);
            return;
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("street_table")
                    .max_height(260.0)
                    .show(ui, |ui| {
                        egui::Grid::new("street_table_grid")
                            .striped(true)
                            .min_col_width(80.0)
                            .spacing([12.0, 4.0])
                            .show(ui, |ui| {
                                ui.label(RichText::new("on street name").strong().size(12.0));
                                ui.label(RichText::new(column).strong().size(12.0));
                                ui.end_row();

                                for row in rows {
                                    ui.label(RichText::new(&row.street).size(12.0));
                                    ui.label(RichText::new(row.count.to_string()).size(12.0));
                                    ui.end_row();
                                }
                            });
                    });
            });
    }

    /// Head of the hour-filtered table.
    pub fn draw_raw_table(ui: &mut egui::Ui, raw: &RawTable) {
        ui.label(
            RichText::new(format!(
                "Showing {} of {} rows",
                raw.rows.len(),
                raw.total_rows
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );

        ScrollArea::both()
            .id_salt("raw_table")
            .max_height(320.0)
            .show(ui, |ui| {
                egui::Grid::new("raw_table_grid")
                    .striped(true)
                    .spacing([10.0, 3.0])
                    .show(ui, |ui| {
                        for name in &raw.columns {
                            ui.label(RichText::new(name).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in &raw.rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
