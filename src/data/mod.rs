//! Data module - CSV loading, caching and view filters

mod cache;
mod loader;
mod processor;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::{CachePolicy, CacheState, CollisionSource, CsvSource, TableCache};
pub use loader::{load_csv, CollisionRecord, CollisionTable, LoaderError};
pub use processor::{
    FilterError, InjuryCategory, StreetCount, ViewFilters, MAX_HOUR, MAX_INJURY_THRESHOLD,
    MINUTES_PER_HOUR,
};
