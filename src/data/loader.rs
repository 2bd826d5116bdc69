//! Collision CSV Loader Module
//! Reads the collision CSV with Polars and normalizes it into a `CollisionTable`.

use crate::data::schema::{
    self, DATE_TIME, INJURED_CYCLISTS, INJURED_MOTORISTS, INJURED_PEDESTRIANS, INJURED_PERSONS,
    INJURY_COLUMNS, LATITUDE, LONGITUDE, ON_STREET_NAME, SOURCE_CRASH_DATE, SOURCE_CRASH_TIME,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Rows sampled for dtype inference.
const INFER_SCHEMA_ROWS: usize = 10_000;

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("column '{0}' appears more than once after normalization")]
    DuplicateColumn(String),
    #[error("column '{0}' is missing from a normalized collision table")]
    NotNormalized(String),
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read collision data from {}: {reason}", .path.display())]
    DataSource { path: PathBuf, reason: String },
    #[error("Unexpected collision data schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl LoaderError {
    fn data_source(path: &Path, reason: impl ToString) -> Self {
        LoaderError::DataSource {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Typed view of one normalized row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionRecord {
    pub date_time: Option<NaiveDateTime>,
    pub latitude: f64,
    pub longitude: f64,
    pub injured_persons: i64,
    pub injured_pedestrians: i64,
    pub injured_cyclists: i64,
    pub injured_motorists: i64,
    pub on_street_name: Option<String>,
}

/// Normalized collision data: canonical column names, coordinates always present.
///
/// Cloning is cheap, the underlying columns are shared.
#[derive(Debug, Clone)]
pub struct CollisionTable {
    df: DataFrame,
}

impl CollisionTable {
    /// Wrap a frame that already carries the canonical columns.
    pub fn try_from_frame(df: DataFrame) -> Result<Self, SchemaError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let required = [DATE_TIME, LATITUDE, LONGITUDE, ON_STREET_NAME]
            .into_iter()
            .chain(INJURY_COLUMNS);
        for column in required {
            if !names.iter().any(|n| n == column) {
                return Err(SchemaError::NotNormalized(column.to_string()));
            }
        }
        Ok(Self { df })
    }

    /// Filters keep the column set, so their output skips validation.
    pub(crate) fn from_filtered(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// (latitude, longitude) for every row, in table order.
    pub fn coordinates(&self) -> PolarsResult<Vec<(f64, f64)>> {
        let lat = self.df.column(LATITUDE)?.f64()?;
        let lon = self.df.column(LONGITUDE)?.f64()?;
        Ok(lat
            .into_iter()
            .zip(lon)
            .filter_map(|(lat, lon)| Some((lat?, lon?)))
            .collect())
    }

    /// Materialize the typed rows.
    pub fn records(&self) -> PolarsResult<Vec<CollisionRecord>> {
        let millis = self.df.column(DATE_TIME)?.cast(&DataType::Int64)?;
        let millis = millis.i64()?;
        let lat = self.df.column(LATITUDE)?.f64()?;
        let lon = self.df.column(LONGITUDE)?.f64()?;
        let persons = self.df.column(INJURED_PERSONS)?.i64()?;
        let pedestrians = self.df.column(INJURED_PEDESTRIANS)?.i64()?;
        let cyclists = self.df.column(INJURED_CYCLISTS)?.i64()?;
        let motorists = self.df.column(INJURED_MOTORISTS)?.i64()?;
        let streets = self.df.column(ON_STREET_NAME)?.str()?;

        let records = (0..self.df.height())
            .map(|i| CollisionRecord {
                date_time: millis
                    .get(i)
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.naive_utc()),
                latitude: lat.get(i).unwrap_or(f64::NAN),
                longitude: lon.get(i).unwrap_or(f64::NAN),
                injured_persons: persons.get(i).unwrap_or(0),
                injured_pedestrians: pedestrians.get(i).unwrap_or(0),
                injured_cyclists: cyclists.get(i).unwrap_or(0),
                injured_motorists: motorists.get(i).unwrap_or(0),
                on_street_name: streets.get(i).map(str::to_string),
            })
            .collect();
        Ok(records)
    }
}

/// Parse a crash date and time pair into one timestamp.
pub fn parse_crash_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    let time = time.trim();

    let day = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .or_else(|| {
            // ISO exports carry a midnight time part on the date field
            NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })?;
    let clock = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())?;

    Some(day.and_time(clock))
}

/// Read at most `max_rows` rows from `path` and normalize them.
pub fn load_csv(path: &Path, max_rows: usize) -> Result<CollisionTable, LoaderError> {
    let raw = read_raw(path, max_rows)?;
    debug!(rows = raw.height(), columns = raw.width(), "Read raw collision CSV");

    let table = normalize(raw)?;
    info!(
        path = %path.display(),
        max_rows,
        rows = table.height(),
        "Loaded collision table"
    );
    Ok(table)
}

/// The file handle lives only for the duration of this call.
fn read_raw(path: &Path, max_rows: usize) -> Result<DataFrame, LoaderError> {
    let file = File::open(path).map_err(|e| LoaderError::data_source(path, e))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_n_rows(Some(max_rows))
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_ignore_errors(true)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| LoaderError::data_source(path, e))
}

/// Combine date and time, rename columns, coerce dtypes, drop rows without coordinates.
fn normalize(raw: DataFrame) -> Result<CollisionTable, LoaderError> {
    let headers: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing = schema::missing_required(headers.iter().map(String::as_str));
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing).into());
    }

    let find = |wanted: &str| {
        headers
            .iter()
            .find(|h| schema::normalize_header(h) == wanted)
            .cloned()
    };
    let (Some(date_source), Some(time_source)) =
        (find(SOURCE_CRASH_DATE), find(SOURCE_CRASH_TIME))
    else {
        return Err(SchemaError::MissingColumns(vec![
            "CRASH DATE".to_string(),
            "CRASH TIME".to_string(),
        ])
        .into());
    };

    let mut columns: Vec<Column> = vec![combine_date_time(&raw, &date_source, &time_source)?];
    let mut seen: Vec<String> = vec![DATE_TIME.to_string()];

    for header in &headers {
        if *header == date_source || *header == time_source {
            continue;
        }
        let canonical = schema::canonical_name(header);
        if seen.contains(&canonical) {
            return Err(SchemaError::DuplicateColumn(canonical).into());
        }
        let series = raw
            .column(header)?
            .as_materialized_series()
            .clone()
            .with_name(canonical.as_str().into());
        columns.push(series.into_column());
        seen.push(canonical);
    }

    let mut coercions = vec![
        col(LATITUDE).cast(DataType::Float64),
        col(LONGITUDE).cast(DataType::Float64),
        col(ON_STREET_NAME).cast(DataType::String),
    ];
    coercions.extend(INJURY_COLUMNS.iter().map(|name| injury_count(name)));

    let df = DataFrame::new(columns)?
        .lazy()
        .with_columns(coercions)
        .filter(col(LATITUDE).is_not_null().and(col(LONGITUDE).is_not_null()))
        .collect()?;

    Ok(CollisionTable::try_from_frame(df)?)
}

/// Missing or negative counts become zero.
fn injury_count(name: &str) -> Expr {
    let count = col(name).cast(DataType::Int64).fill_null(lit(0i64));
    when(count.clone().lt(lit(0i64)))
        .then(lit(0i64))
        .otherwise(count)
        .alias(name)
}

fn combine_date_time(
    raw: &DataFrame,
    date_source: &str,
    time_source: &str,
) -> Result<Column, LoaderError> {
    let dates = raw.column(date_source)?.cast(&DataType::String)?;
    let times = raw.column(time_source)?.cast(&DataType::String)?;

    let millis: Vec<Option<i64>> = dates
        .str()?
        .into_iter()
        .zip(times.str()?)
        .map(|(date, time)| {
            parse_crash_timestamp(date?, time?).map(|ts| ts.and_utc().timestamp_millis())
        })
        .collect();

    let unparsed = millis.iter().filter(|m| m.is_none()).count();
    if unparsed > 0 {
        debug!(unparsed, "Rows with unparsable crash date/time");
    }

    let series = Series::new(DATE_TIME.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series.into_column())
}
