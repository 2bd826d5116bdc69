//! Dashboard Views
//! One full evaluation of the dashboard: every dataset the widgets and charts consume.

use crate::charts::{HexBin, HexGrid, DEFAULT_HEX_RADIUS_M};
use crate::data::{CollisionTable, FilterError, InjuryCategory, StreetCount, ViewFilters};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Rows shown by the raw data table unless configured otherwise.
pub const DEFAULT_RAW_ROW_LIMIT: usize = 500;

/// Widget values driving one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardParams {
    pub min_injured: u32,
    pub hour: u32,
    pub category: InjuryCategory,
    pub top_streets: Option<usize>,
    pub show_raw: bool,
    pub raw_row_limit: usize,
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self {
            min_injured: 0,
            hour: 0,
            category: InjuryCategory::default(),
            top_streets: None,
            show_raw: false,
            raw_row_limit: DEFAULT_RAW_ROW_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Input row for hex binning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinuteCount {
    pub minute: usize,
    pub crashes: usize,
}

/// Stringified head of a table for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardViews {
    pub params: DashboardParams,
    pub total_rows: usize,
    pub injury_map: Vec<MapPoint>,
    pub hour_label: String,
    pub hour_rows: usize,
    pub midpoint: Option<MapPoint>,
    pub density: Vec<DensityPoint>,
    pub hex_grid: Option<HexGrid>,
    pub hexbins: Vec<HexBin>,
    pub minute_series: Vec<MinuteCount>,
    pub top_streets: Vec<StreetCount>,
    pub raw: Option<RawTable>,
}

impl DashboardViews {
    /// Evaluate every view from the untouched `original_table`.
    pub fn compute(
        original_table: &CollisionTable,
        params: &DashboardParams,
    ) -> Result<Self, FilterError> {
        let injured = ViewFilters::filter_by_min_injuries(original_table, params.min_injured)?;
        let injury_map = to_map_points(&injured.coordinates()?);

        let hour_filtered_table = ViewFilters::filter_by_hour(original_table, params.hour)?;
        let hour_points = hour_filtered_table.coordinates()?;

        let midpoint = match ViewFilters::spatial_midpoint(&hour_filtered_table) {
            Ok(point) => Some(point),
            Err(FilterError::EmptyResult(what)) => {
                debug!(hour = params.hour, what, "No collisions in hour, skipping map center");
                None
            }
            Err(e) => return Err(e),
        };

        let hex_grid = midpoint.map(|center| HexGrid::new(center, DEFAULT_HEX_RADIUS_M));
        let hexbins = hex_grid
            .map(|grid| grid.aggregate(&hour_points))
            .unwrap_or_default();
        let density = hour_points
            .iter()
            .map(|&(latitude, longitude)| DensityPoint {
                latitude,
                longitude,
                weight: 1.0,
            })
            .collect();

        let minute_series = ViewFilters::minute_histogram(&hour_filtered_table)?
            .into_iter()
            .enumerate()
            .map(|(minute, crashes)| MinuteCount { minute, crashes })
            .collect();

        let mut top_streets =
            ViewFilters::top_streets_by_category(original_table, params.category)?;
        if let Some(limit) = params.top_streets {
            top_streets.truncate(limit);
        }

        let raw = if params.show_raw {
            Some(raw_table(&hour_filtered_table, params.raw_row_limit)?)
        } else {
            None
        };

        debug!(
            min_injured = params.min_injured,
            hour = params.hour,
            category = %params.category,
            injury_points = injury_map.len(),
            hour_rows = hour_filtered_table.height(),
            "Dashboard views computed"
        );

        Ok(Self {
            params: params.clone(),
            total_rows: original_table.height(),
            injury_map,
            hour_label: ViewFilters::hour_window_label(params.hour),
            hour_rows: hour_filtered_table.height(),
            midpoint: midpoint.map(|(latitude, longitude)| MapPoint {
                latitude,
                longitude,
            }),
            density,
            hex_grid,
            hexbins,
            minute_series,
            top_streets,
            raw,
        })
    }
}

fn to_map_points(coordinates: &[(f64, f64)]) -> Vec<MapPoint> {
    coordinates
        .iter()
        .map(|&(latitude, longitude)| MapPoint {
            latitude,
            longitude,
        })
        .collect()
}

fn cell_text(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

/// First `limit` rows, every column rendered as text.
pub fn raw_table(table: &CollisionTable, limit: usize) -> Result<RawTable, FilterError> {
    let head = table.frame().head(Some(limit));
    let columns = table.column_names();

    let mut rows = Vec::with_capacity(head.height());
    for i in 0..head.height() {
        let mut row = Vec::with_capacity(columns.len());
        for column in head.get_columns() {
            row.push(cell_text(column.get(i)?));
        }
        rows.push(row);
    }

    Ok(RawTable {
        columns,
        rows,
        total_rows: table.height(),
    })
}
