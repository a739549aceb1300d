//! Turns grids and statistics into plot-ready series, and draws them.

pub mod accumulation;
pub mod svg;
pub mod temperature;

use std::path::Path;

pub use accumulation::{AccumulationChart, Overlay};
pub use svg::SvgRenderer;
pub use temperature::{TemperatureChart, TemperatureDay};

use crate::{error::Result, reading::StationMetadata};

pub const MM_TO_INCHES: f32 = 0.0393701;

/// Title and subtitle shared by every chart of a station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationHeader {
    pub title: String,
    pub subtitle: String,
}

impl StationHeader {
    pub fn new(station: &StationMetadata) -> Self {
        let elevation = station
            .elevation_feet()
            .map(|feet| format!("{}'", feet as i64))
            .unwrap_or_else(|| "n/a".to_string());

        StationHeader {
            title: format!("{}: {}", station.id, station.file_name()),
            subtitle: format!(
                "LAT= {} | LON= {} | ELEV= {}",
                station.latitude, station.longitude, elevation
            ),
        }
    }
}

/// An x-axis label at a day index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub position: usize,
    pub label: String,
}

/// Rounds `value` to the nearest multiple of 5.
pub(crate) fn round_to_five(value: f32) -> i32 {
    5 * (value / 5.0).round() as i32
}

pub trait ChartRenderer {
    fn render_temperature(&self, chart: &TemperatureChart, file_path: &Path) -> Result<()>;

    fn render_accumulation(&self, chart: &AccumulationChart, file_path: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_header() {
        let station = StationMetadata {
            id: "USW00094728".to_string(),
            latitude: 40.7789,
            longitude: -73.9692,
            elevation: Some(39.6),
            name: "NEW YORK CNTRL PK TWR".to_string(),
            ..Default::default()
        };
        let header = StationHeader::new(&station);

        assert_eq!(header.title, "USW00094728: NEW_YORK_CNTRL_PK_TWR");
        assert_eq!(header.subtitle, "LAT= 40.7789 | LON= -73.9692 | ELEV= 129'");
    }

    #[test]
    fn should_round_to_five() {
        assert_eq!(round_to_five(-3.0), -5);
        assert_eq!(round_to_five(112.4), 110);
        assert_eq!(round_to_five(113.0), 115);
    }
}
