//! Shared CSV fixtures for data tests.

use crate::data::CollisionTable;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub const HEADER: &str = "CRASH DATE,CRASH TIME,BOROUGH,ZIP CODE,LATITUDE,LONGITUDE,ON STREET NAME,\
NUMBER OF PERSONS INJURED,NUMBER OF PEDESTRIANS INJURED,NUMBER OF CYCLIST INJURED,\
NUMBER OF MOTORIST INJURED,COLLISION_ID";

pub const MISSING_COORDINATES_ID: i64 = 4486900;
pub const UNPARSABLE_TIME_ID: i64 = 4486801;
pub const MISSING_LATITUDE_ID: i64 = 4486903;
pub const MISSING_LONGITUDE_ID: i64 = 4486904;

pub const SAMPLE_ROWS: &[&str] = &[
    "09/11/2021,2:39,,,40.667202,-73.8665,WHITESTONE EXPRESSWAY,2,0,0,2,4455765",
    "03/26/2022,11:45,,,40.68358,-73.97617,QUEENSBORO BRIDGE UPPER,1,1,0,0,4513547",
    "06/29/2022,6:55,,,40.75163,-73.97463,THROGS NECK BRIDGE,0,0,0,0,4541903",
    "09/11/2021,9:35,BROOKLYN,11208,40.667202,-73.8665,,0,0,0,0,4456314",
    "12/14/2021,8:13,BROOKLYN,11233,40.683304,-73.917274,SARATOGA AVENUE,0,0,0,0,4486609",
    "04/14/2021,12:47,,,40.86816,-73.83148,MAJOR DEEGAN EXPRESSWAY,0,0,0,0,4407458",
    "12/14/2021,17:05,,,40.709183,-73.956825,BROOKLYN QUEENS EXPRESSWAY,3,0,1,2,4486555",
    "12/14/2021,8:17,BRONX,10475,40.86816,-73.83148,,2,0,0,2,4486660",
    "12/14/2021,21:10,BROOKLYN,11207,40.67172,-73.8977,,0,0,0,0,4487074",
    "12/14/2021,14:58,MANHATTAN,10017,40.75144,-73.97397,3 AVENUE,0,0,0,0,4486519",
    "12/13/2021,0:34,,,40.701275,-73.88887,MYRTLE AVENUE,0,0,0,0,4486934",
    "12/14/2021,16:50,QUEENS,11413,40.675884,-73.75175,SPRINGFIELD BOULEVARD,0,0,0,0,4487127",
    "12/14/2021,23:10,QUEENS,11434,40.66684,-73.78941,NORTH CONDUIT AVENUE,2,2,0,0,4486635",
    "12/14/2021,17:58,BROOKLYN,11217,40.68158,-73.97463,,0,0,0,0,4486604",
    "12/14/2021,8:13,,,,,BRONX RIVER PARKWAY,1,0,1,0,4486900",
    "12/14/2021,8:50,BROOKLYN,11230,40.62,-73.96,OCEAN AVENUE,1,0,1,0,4486700",
    "12/15/2021,8:13,BRONX,10451,40.82,-73.92,GRAND CONCOURSE,4,1,0,3,4486800",
    "12/15/2021,bad,BRONX,10451,40.82,-73.92,GRAND CONCOURSE,1,1,0,0,4486801",
    "12/16/2021,23:59,QUEENS,11434,40.66,-73.78,  ,1,1,0,0,4486802",
    "12/17/2021,8:20,BROOKLYN,11201,,-73.99,ATLANTIC AVENUE,2,2,0,0,4486903",
    "12/17/2021,8:40,BROOKLYN,11201,40.69,,ATLANTIC AVENUE,2,0,2,0,4486904",
];

/// Sample rows that survive loading: three lack a coordinate.
pub const LOADED_ROWS: usize = SAMPLE_ROWS.len() - 3;

/// Write `header` and `rows` to a CSV inside a fresh temp dir.
pub fn write_csv<S: AsRef<str>>(header: &str, rows: &[S]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collisions.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "{header}").unwrap();
    for row in rows {
        writeln!(file, "{}", row.as_ref()).unwrap();
    }
    (dir, path)
}

/// Load the sample rows through the real CSV loader.
pub fn sample_table() -> CollisionTable {
    let (_dir, path) = write_csv(HEADER, SAMPLE_ROWS);
    crate::data::load_csv(&path, 100_000).unwrap()
}

pub fn collision_ids(table: &CollisionTable) -> Vec<i64> {
    table
        .frame()
        .column("collision_id")
        .unwrap()
        .cast(&polars::prelude::DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}
