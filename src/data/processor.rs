//! View Filter Module
//! Pure filters and aggregates over a `CollisionTable`, one per dashboard view.

use crate::data::loader::CollisionTable;
use crate::data::schema::{
    DATE_TIME, INJURED_CYCLISTS, INJURED_MOTORISTS, INJURED_PEDESTRIANS, INJURED_PERSONS,
    LATITUDE, LONGITUDE, ON_STREET_NAME,
};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest value the injured-persons slider offers.
pub const MAX_INJURY_THRESHOLD: u32 = 19;
pub const MAX_HOUR: u32 = 23;
pub const MINUTES_PER_HOUR: usize = 60;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Parameter '{name}' = {value} is outside [{min}, {max}]")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("No rows available for {0}")]
    EmptyResult(&'static str),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Which injury count the street ranking is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InjuryCategory {
    #[default]
    Pedestrians,
    Cyclists,
    Motorists,
}

impl InjuryCategory {
    pub const ALL: [InjuryCategory; 3] = [
        InjuryCategory::Pedestrians,
        InjuryCategory::Cyclists,
        InjuryCategory::Motorists,
    ];

    /// Canonical column holding this category's injury count.
    pub fn column(self) -> &'static str {
        match self {
            InjuryCategory::Pedestrians => INJURED_PEDESTRIANS,
            InjuryCategory::Cyclists => INJURED_CYCLISTS,
            InjuryCategory::Motorists => INJURED_MOTORISTS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InjuryCategory::Pedestrians => "Pedestrians",
            InjuryCategory::Cyclists => "Cyclists",
            InjuryCategory::Motorists => "Motorists",
        }
    }
}

impl fmt::Display for InjuryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InjuryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown injury category '{s}'"))
    }
}

/// One row of the street ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreetCount {
    pub street: String,
    pub count: i64,
}

fn check_range(name: &'static str, value: u32, max: u32) -> Result<(), FilterError> {
    if value > max {
        return Err(FilterError::InvalidParameter {
            name,
            value: i64::from(value),
            min: 0,
            max: i64::from(max),
        });
    }
    Ok(())
}

/// Filters never touch their input, every call yields a new table.
pub struct ViewFilters;

impl ViewFilters {
    /// Rows with at least `threshold` injured persons.
    pub fn filter_by_min_injuries(
        table: &CollisionTable,
        threshold: u32,
    ) -> Result<CollisionTable, FilterError> {
        check_range("threshold", threshold, MAX_INJURY_THRESHOLD)?;

        let filtered = table
            .frame()
            .clone()
            .lazy()
            .filter(
                col(INJURED_PERSONS)
                    .gt_eq(lit(i64::from(threshold)))
                    .and(col(LATITUDE).is_not_null())
                    .and(col(LONGITUDE).is_not_null()),
            )
            .collect()?;
        Ok(CollisionTable::from_filtered(filtered))
    }

    /// Rows whose timestamp falls in `[hour:00, hour+1:00)`. Null timestamps never match.
    pub fn filter_by_hour(
        table: &CollisionTable,
        hour: u32,
    ) -> Result<CollisionTable, FilterError> {
        check_range("hour", hour, MAX_HOUR)?;

        let filtered = table
            .frame()
            .clone()
            .lazy()
            .filter(
                col(DATE_TIME)
                    .dt()
                    .hour()
                    .cast(DataType::Int32)
                    .eq(lit(hour as i32)),
            )
            .collect()?;
        Ok(CollisionTable::from_filtered(filtered))
    }

    /// Label for an hour window. Wraps past midnight for display only.
    pub fn hour_window_label(hour: u32) -> String {
        format!("{}:00 and {}:00", hour, (hour + 1) % 24)
    }

    /// Crash counts per minute 0..59. The caller passes an hour-filtered table.
    pub fn minute_histogram(table: &CollisionTable) -> Result<Vec<usize>, FilterError> {
        let minutes = table
            .frame()
            .clone()
            .lazy()
            .select([col(DATE_TIME).dt().minute().cast(DataType::Int32)])
            .collect()?;

        let mut bins = vec![0usize; MINUTES_PER_HOUR];
        for minute in minutes.column(DATE_TIME)?.i32()?.into_iter().flatten() {
            if let Some(bin) = usize::try_from(minute).ok().and_then(|m| bins.get_mut(m)) {
                *bin += 1;
            }
        }
        Ok(bins)
    }

    /// Mean latitude and longitude, used to center the density map.
    pub fn spatial_midpoint(table: &CollisionTable) -> Result<(f64, f64), FilterError> {
        if table.is_empty() {
            return Err(FilterError::EmptyResult("spatial midpoint"));
        }
        let df = table.frame();
        let lat = df.column(LATITUDE)?.f64()?.mean();
        let lon = df.column(LONGITUDE)?.f64()?.mean();
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(FilterError::EmptyResult("spatial midpoint")),
        }
    }

    /// Streets by injury count for `category`, highest first; ties keep table order.
    pub fn top_streets_by_category(
        table: &CollisionTable,
        category: InjuryCategory,
    ) -> Result<Vec<StreetCount>, FilterError> {
        let df = table.frame();
        let counts = df.column(category.column())?.i64()?;
        let streets = df.column(ON_STREET_NAME)?.str()?;

        let mut ranked: Vec<StreetCount> = Vec::new();
        for (street, count) in streets.into_iter().zip(counts) {
            if let (Some(street), Some(count)) = (street, count) {
                let street = street.trim();
                if count >= 1 && !street.is_empty() {
                    ranked.push(StreetCount {
                        street: street.to_string(),
                        count,
                    });
                }
            }
        }

        // sort_by is stable
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{self, collision_ids, sample_table};
    use chrono::Timelike;

    #[test]
    fn test_min_injuries_threshold_holds_for_every_value() {
        let table = sample_table();
        let all_ids = collision_ids(&table);

        for threshold in 0..=MAX_INJURY_THRESHOLD {
            let filtered = ViewFilters::filter_by_min_injuries(&table, threshold).unwrap();
            let records = filtered.records().unwrap();
            assert!(records
                .iter()
                .all(|r| r.injured_persons >= i64::from(threshold)));
            assert!(collision_ids(&filtered)
                .iter()
                .all(|id| all_ids.contains(id)));
        }
    }

    #[test]
    fn test_min_injuries_counts() {
        let table = sample_table();
        assert_eq!(
            ViewFilters::filter_by_min_injuries(&table, 0).unwrap().height(),
            table.height()
        );
        assert_eq!(
            collision_ids(&ViewFilters::filter_by_min_injuries(&table, 2).unwrap()),
            vec![4455765, 4486555, 4486660, 4486635, 4486800]
        );
        assert!(ViewFilters::filter_by_min_injuries(&table, 19)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_min_injuries_does_not_mutate_input() {
        let table = sample_table();
        let before = table.frame().clone();
        ViewFilters::filter_by_min_injuries(&table, 3).unwrap();
        assert!(table.frame().equals_missing(&before));
    }

    #[test]
    fn test_out_of_range_parameters_rejected() {
        let table = sample_table();
        assert!(matches!(
            ViewFilters::filter_by_min_injuries(&table, 20),
            Err(FilterError::InvalidParameter { name: "threshold", .. })
        ));
        assert!(matches!(
            ViewFilters::filter_by_hour(&table, 24),
            Err(FilterError::InvalidParameter { name: "hour", .. })
        ));
    }

    #[test]
    fn test_hour_filter_matches_hour() {
        let table = sample_table();
        let filtered = ViewFilters::filter_by_hour(&table, 8).unwrap();

        assert_eq!(filtered.height(), 4);
        for record in filtered.records().unwrap() {
            assert_eq!(record.date_time.map(|t| t.hour()), Some(8));
        }
    }

    #[test]
    fn test_hours_partition_table() {
        let table = sample_table();
        let mut seen: Vec<i64> = Vec::new();
        for hour in 0..=MAX_HOUR {
            let filtered = ViewFilters::filter_by_hour(&table, hour).unwrap();
            seen.extend(collision_ids(&filtered));
        }

        let mut unique = seen.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seen.len());
        // only the unparsable timestamp is left out
        assert_eq!(seen.len(), table.height() - 1);
        assert!(!seen.contains(&fixtures::UNPARSABLE_TIME_ID));
    }

    #[test]
    fn test_hour_23_does_not_wrap() {
        let table = sample_table();
        let late = ViewFilters::filter_by_hour(&table, 23).unwrap();
        assert_eq!(collision_ids(&late), vec![4486635, 4486802]);
        assert_eq!(ViewFilters::hour_window_label(23), "23:00 and 0:00");
        assert_eq!(ViewFilters::hour_window_label(8), "8:00 and 9:00");
    }

    #[test]
    fn test_minute_histogram_bins() {
        let table = sample_table();
        let hour = ViewFilters::filter_by_hour(&table, 8).unwrap();
        let bins = ViewFilters::minute_histogram(&hour).unwrap();

        assert_eq!(bins.len(), MINUTES_PER_HOUR);
        assert_eq!(bins.iter().sum::<usize>(), hour.height());
        assert_eq!(bins[13], 2);
        assert_eq!(bins[17], 1);
        assert_eq!(bins[50], 1);
    }

    #[test]
    fn test_minute_histogram_of_empty_table() {
        let table = sample_table();
        let empty = ViewFilters::filter_by_min_injuries(&table, 19).unwrap();
        let bins = ViewFilters::minute_histogram(&empty).unwrap();
        assert_eq!(bins, vec![0; MINUTES_PER_HOUR]);
    }

    #[test]
    fn test_spatial_midpoint_is_mean() {
        let rows = [
            "01/01/2022,1:00,,,40.0,-73.0,A STREET,0,0,0,0,1",
            "01/01/2022,1:30,,,41.0,-74.0,B STREET,0,0,0,0,2",
        ];
        let (_dir, path) = fixtures::write_csv(fixtures::HEADER, &rows);
        let table = crate::data::load_csv(&path, 10).unwrap();

        let (lat, lon) = ViewFilters::spatial_midpoint(&table).unwrap();
        assert!((lat - 40.5).abs() < 1e-9);
        assert!((lon + 73.5).abs() < 1e-9);
    }

    #[test]
    fn test_spatial_midpoint_of_empty_table() {
        let table = sample_table();
        let empty = ViewFilters::filter_by_min_injuries(&table, 19).unwrap();
        assert!(matches!(
            ViewFilters::spatial_midpoint(&empty),
            Err(FilterError::EmptyResult(_))
        ));
    }

    #[test]
    fn test_top_streets_pedestrians() {
        let table = sample_table();
        let ranked =
            ViewFilters::top_streets_by_category(&table, InjuryCategory::Pedestrians).unwrap();

        assert!(ranked.windows(2).all(|w| w[0].count >= w[1].count));
        assert!(ranked.iter().all(|r| r.count >= 1 && !r.street.is_empty()));
        let streets: Vec<&str> = ranked.iter().map(|r| r.street.as_str()).collect();
        assert_eq!(
            streets,
            vec![
                "NORTH CONDUIT AVENUE",
                "QUEENSBORO BRIDGE UPPER",
                "GRAND CONCOURSE",
                "GRAND CONCOURSE"
            ]
        );
    }

    #[test]
    fn test_top_streets_motorists_skip_missing_names() {
        let table = sample_table();
        let ranked =
            ViewFilters::top_streets_by_category(&table, InjuryCategory::Motorists).unwrap();
        assert_eq!(
            ranked,
            vec![
                StreetCount {
                    street: "GRAND CONCOURSE".to_string(),
                    count: 3
                },
                StreetCount {
                    street: "WHITESTONE EXPRESSWAY".to_string(),
                    count: 2
                },
                StreetCount {
                    street: "BROOKLYN QUEENS EXPRESSWAY".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_top_streets_cyclists() {
        let table = sample_table();
        let ranked =
            ViewFilters::top_streets_by_category(&table, InjuryCategory::Cyclists).unwrap();
        let streets: Vec<&str> = ranked.iter().map(|r| r.street.as_str()).collect();
        assert_eq!(streets, vec!["BROOKLYN QUEENS EXPRESSWAY", "OCEAN AVENUE"]);
    }

    #[test]
    fn test_top_streets_trims_padded_names() {
        let rows = [
            "12/15/2021,8:13,BRONX,10451,40.82,-73.92,GRAND CONCOURSE                 ,2,2,0,0,1",
            "12/15/2021,9:13,BRONX,10451,40.82,-73.92,   ,1,1,0,0,2",
        ];
        let (_dir, path) = fixtures::write_csv(fixtures::HEADER, &rows);
        let table = crate::data::load_csv(&path, 10).unwrap();

        let ranked =
            ViewFilters::top_streets_by_category(&table, InjuryCategory::Pedestrians).unwrap();
        assert_eq!(
            ranked,
            vec![StreetCount {
                street: "GRAND CONCOURSE".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("cyclists".parse::<InjuryCategory>(), Ok(InjuryCategory::Cyclists));
        assert_eq!(" Motorists ".parse::<InjuryCategory>(), Ok(InjuryCategory::Motorists));
        assert!("drivers".parse::<InjuryCategory>().is_err());
        assert_eq!(InjuryCategory::Pedestrians.column(), INJURED_PEDESTRIANS);
    }
}
