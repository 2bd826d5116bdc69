//! Headless report - evaluates the dashboard once and renders it as JSON

use crate::charts::{DashboardParams, DashboardViews};
use crate::config::DashboardConfig;
use crate::data::{CollisionRecord, CsvSource, TableCache, ViewFilters};
use anyhow::{Context, Result};
use tracing::info;

/// Load through the cache, compute every view, serialize.
pub fn render_report(
    config: &DashboardConfig,
    params: &DashboardParams,
    pretty: bool,
) -> Result<String> {
    let cache = TableCache::new(CsvSource::new(&config.data_path), config.cache_policy);
    let original_table = cache
        .load(config.max_rows)
        .with_context(|| format!("Loading {}", config.data_path.display()))?;

    let views = DashboardViews::compute(&original_table, params)
        .context("Computing dashboard views")?;
    info!(
        rows = views.total_rows,
        hour_rows = views.hour_rows,
        streets = views.top_streets.len(),
        "Report ready"
    );

    let json = if pretty {
        serde_json::to_string_pretty(&views)?
    } else {
        serde_json::to_string(&views)?
    };
    Ok(json)
}

/// Typed rows of one hour window, at most `limit` of them.
pub fn hour_records(
    config: &DashboardConfig,
    hour: u32,
    limit: Option<usize>,
) -> Result<Vec<CollisionRecord>> {
    let cache = TableCache::new(CsvSource::new(&config.data_path), config.cache_policy);
    let original_table = cache
        .load(config.max_rows)
        .with_context(|| format!("Loading {}", config.data_path.display()))?;

    let hour_filtered_table = ViewFilters::filter_by_hour(&original_table, hour)
        .with_context(|| format!("Filtering hour {hour}"))?;
    let mut records = hour_filtered_table.records()?;
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    info!(hour, records = records.len(), "Hour records ready");
    Ok(records)
}
