//! Charts module - View datasets and chart rendering

mod hexbin;
mod plotter;
mod views;

pub use hexbin::{HexBin, HexGrid, DEFAULT_HEX_RADIUS_M};
pub use plotter::CollisionPlotter;
pub use views::{
    DashboardParams, DashboardViews, MapPoint, MinuteCount, RawTable,
    DEFAULT_RAW_ROW_LIMIT,
};
