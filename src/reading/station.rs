//! Station metadata from `ghcnd-stations.txt`.
//!
//! See "GHCN-Daily readme.txt Section IV" for format.

use tracing::warn;

use crate::error::{GhcndError, Result};

/// Elevation used in the metadata file when the height is unknown.
const MISSING_ELEVATION: f64 = -999.9;

const METRES_TO_FEET: f64 = 3.2808399;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationMetadata {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub state: Option<String>,
    /// Station name with runs of whitespace collapsed to one space
    pub name: String,
    pub gsn_flag: Option<String>,
    pub wmo_id: Option<String>,
}

impl StationMetadata {
    pub fn from_line(line: &str) -> Result<Self> {
        let id = column(line, 0, 11).trim().to_string();
        if id.is_empty() {
            return Err(GhcndError::malformed(line, "missing station id"));
        }

        let latitude = parse_f64(column(line, 12, 20))
            .ok_or_else(|| GhcndError::malformed(line, "unparseable latitude"))?;
        let longitude = parse_f64(column(line, 21, 30))
            .ok_or_else(|| GhcndError::malformed(line, "unparseable longitude"))?;
        let elevation = parse_and_filter_f64(column(line, 31, 37));
        let state = parse_str(column(line, 38, 40));
        let name = collapse_whitespace(column(line, 41, 71));
        let gsn_flag = parse_str(column(line, 72, 75));
        let wmo_id = parse_str(column(line, 80, 85));

        Ok(StationMetadata {
            id,
            latitude,
            longitude,
            elevation,
            state,
            name,
            gsn_flag,
            wmo_id,
        })
    }

    /// The name with spaces replaced by underscores, for titles and file names.
    pub fn file_name(&self) -> String {
        self.name.replace(' ', "_")
    }

    pub fn elevation_feet(&self) -> Option<f64> {
        self.elevation.map(|metres| metres * METRES_TO_FEET)
    }
}

/// Finds the row for `station_id`, parsing only that row.
pub fn find_station<S: AsRef<str>>(lines: &[S], station_id: &str) -> Result<StationMetadata> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .find(|line| column(line, 0, 11).trim() == station_id)
        .map(StationMetadata::from_line)
        .unwrap_or_else(|| {
            Err(GhcndError::NotFound {
                station_id: station_id.to_string(),
            })
        })
}

/// Parses every row, skipping (and logging) rows that cannot be read.
pub fn parse_stations<S: AsRef<str>>(lines: &[S]) -> Vec<StationMetadata> {
    let mut stations = Vec::with_capacity(lines.len());

    for line in lines.iter().map(AsRef::as_ref) {
        if line.trim().is_empty() {
            continue;
        }
        match StationMetadata::from_line(line) {
            Ok(station) => stations.push(station),
            Err(e) => warn!("Skipping station row: {}", e),
        }
    }

    stations
}

/// The characters in `[start, end)`, clipped to the end of the line.
pub(super) fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

pub(super) fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn parse_and_filter_f64(s: &str) -> Option<f64> {
    parse_f64(s).filter(|&v| v != MISSING_ELEVATION)
}

pub(super) fn parse_str(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// -- Tests -------------------------------------------------------------------
