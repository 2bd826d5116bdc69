//! Hexagon Binning
//! Aggregates (lat, lon) points into pointy-top hexagons of a fixed radius in meters.

use serde::Serialize;
use std::collections::BTreeMap;

/// Hexagon radius used by the density map.
pub const DEFAULT_HEX_RADIUS_M: f64 = 100.0;
/// Elevation multiplier applied on top of the elevation range.
pub const ELEVATION_SCALE: f64 = 4.0;
pub const ELEVATION_RANGE: (f64, f64) = (0.0, 1000.0);

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Local equirectangular hex grid anchored at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HexGrid {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub radius_m: f64,
}

/// One populated hexagon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexBin {
    pub q: i64,
    pub r: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
    pub elevation: f64,
}

impl HexGrid {
    pub fn new(origin: (f64, f64), radius_m: f64) -> Self {
        Self {
            origin_lat: origin.0,
            origin_lon: origin.1,
            radius_m,
        }
    }

    fn meters_per_degree_lon(&self) -> f64 {
        METERS_PER_DEGREE_LAT * self.origin_lat.to_radians().cos()
    }

    fn to_local(&self, lat: f64, lon: f64) -> (f64, f64) {
        (
            (lon - self.origin_lon) * self.meters_per_degree_lon(),
            (lat - self.origin_lat) * METERS_PER_DEGREE_LAT,
        )
    }

    fn to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_lat + y / METERS_PER_DEGREE_LAT,
            self.origin_lon + x / self.meters_per_degree_lon(),
        )
    }

    /// Axial coordinates of the cell containing a point.
    pub fn cell_of(&self, lat: f64, lon: f64) -> (i64, i64) {
        let (x, y) = self.to_local(lat, lon);
        let q = (SQRT_3 / 3.0 * x - y / 3.0) / self.radius_m;
        let r = (2.0 / 3.0 * y) / self.radius_m;
        axial_round(q, r)
    }

    pub fn cell_center(&self, cell: (i64, i64)) -> (f64, f64) {
        let (q, r) = (cell.0 as f64, cell.1 as f64);
        let x = self.radius_m * (SQRT_3 * q + SQRT_3 / 2.0 * r);
        let y = self.radius_m * (1.5 * r);
        self.to_geo(x, y)
    }

    /// Six corners as (lat, lon), counter-clockwise from the lower right.
    pub fn cell_corners(&self, cell: (i64, i64)) -> Vec<(f64, f64)> {
        let (center_lat, center_lon) = self.cell_center(cell);
        let (cx, cy) = self.to_local(center_lat, center_lon);
        (0..6)
            .map(|i| {
                let angle = (60.0 * i as f64 - 30.0).to_radians();
                self.to_geo(
                    cx + self.radius_m * angle.cos(),
                    cy + self.radius_m * angle.sin(),
                )
            })
            .collect()
    }

    /// Count points per cell. Elevation is scaled linearly over `[0, max count]`.
    pub fn aggregate(&self, points: &[(f64, f64)]) -> Vec<HexBin> {
        let mut counts: BTreeMap<(i64, i64), usize> = BTreeMap::new();
        for &(lat, lon) in points {
            *counts.entry(self.cell_of(lat, lon)).or_insert(0) += 1;
        }

        let max = counts.values().copied().max().unwrap_or(0);
        let (low, high) = ELEVATION_RANGE;
        counts
            .into_iter()
            .map(|((q, r), count)| {
                let (latitude, longitude) = self.cell_center((q, r));
                let share = if max == 0 {
                    0.0
                } else {
                    count as f64 / max as f64
                };
                HexBin {
                    q,
                    r,
                    latitude,
                    longitude,
                    count,
                    elevation: (low + share * (high - low)) * ELEVATION_SCALE,
                }
            })
            .collect()
    }
}

fn axial_round(q: f64, r: f64) -> (i64, i64) {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq as i64, rr as i64)
}
