//! Daily temperature range against the record and normal range for a date
//! window.

use chrono::{Datelike, NaiveDate};

use crate::{
    calendar::MONTH_ABBREVIATIONS,
    chart::{round_to_five, StationHeader, Tick},
    error::{GhcndError, Result},
    grid::DailyValueGrid,
    reading::{Element, StationMetadata},
    stats::{compute_calendar_statistics, ClimatologyWindow, TemperatureUnit},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureDay {
    pub date: NaiveDate,
    pub record_max: Option<f32>,
    pub record_min: Option<f32>,
    pub average_max: Option<f32>,
    pub average_min: Option<f32>,
    pub actual_max: Option<f32>,
    pub actual_min: Option<f32>,
}

impl TemperatureDay {
    /// The day's max ties or beats the record for its calendar day.
    pub fn is_max_record(&self) -> bool {
        matches!((self.actual_max, self.record_max), (Some(actual), Some(record)) if actual >= record)
    }

    pub fn is_min_record(&self) -> bool {
        matches!((self.actual_min, self.record_min), (Some(actual), Some(record)) if actual <= record)
    }
}

#[derive(Debug, Clone)]
pub struct TemperatureChart {
    pub header: StationHeader,
    pub unit: TemperatureUnit,
    pub days: Vec<TemperatureDay>,
    pub ticks: Vec<Tick>,
    /// Y range padded by 10 degrees, rounded to multiples of 5
    pub y_range: (i32, i32),
}

impl TemperatureChart {
    pub fn build(
        grid: &DailyValueGrid,
        station: &StationMetadata,
        window: ClimatologyWindow,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        if begin > end {
            return Err(GhcndError::InvalidDate {
                input: format!("{} is after {}", begin.format("%Y%m%d"), end.format("%Y%m%d")),
            });
        }
        if grid.is_empty() || end.year() < grid.begin_year() || begin.year() > grid.end_year() {
            return Err(GhcndError::insufficient_range(
                grid.station_id(),
                format!(
                    "requested {}-{} but data covers {}",
                    begin.year(),
                    end.year(),
                    describe_years(grid)
                ),
            ));
        }

        let unit = TemperatureUnit::Fahrenheit;
        let stats = compute_calendar_statistics(grid, window, unit);

        let mut days = Vec::new();
        let mut ticks = Vec::new();
        for (index, date) in begin.iter_days().take_while(|d| *d <= end).enumerate() {
            let (year, month, day) = (date.year(), date.month(), date.day());
            if index == 0 || day == 1 {
                ticks.push(Tick {
                    position: index,
                    label: format!("{} '{:02}", MONTH_ABBREVIATIONS[month as usize - 1], year.rem_euclid(100)),
                });
            }

            let stat = stats.get(month, day).copied().unwrap_or_default();
            days.push(TemperatureDay {
                date,
                record_max: stat.record_max,
                record_min: stat.record_min,
                average_max: stat.average_max,
                average_min: stat.average_min,
                actual_max: grid.get(year, month, day, Element::Tmax).map(|v| unit.convert(v)),
                actual_min: grid.get(year, month, day, Element::Tmin).map(|v| unit.convert(v)),
            });
        }

        let lowest = days.iter().filter_map(|d| d.record_min).reduce(f32::min);
        let highest = days.iter().filter_map(|d| d.record_max).reduce(f32::max);
        let (Some(lowest), Some(highest)) = (lowest, highest) else {
            return Err(GhcndError::insufficient_range(
                grid.station_id(),
                "no TMAX/TMIN records for the requested days",
            ));
        };

        Ok(TemperatureChart {
            header: StationHeader::new(station),
            unit,
            days,
            ticks,
            y_range: (round_to_five(lowest - 10.0), round_to_five(highest + 10.0)),
        })
    }

    pub fn max_records(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.days
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_max_record())
            .filter_map(|(i, d)| d.actual_max.map(|v| (i, v)))
    }

    pub fn min_records(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.days
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_min_record())
            .filter_map(|(i, d)| d.actual_min.map(|v| (i, v)))
    }
}

fn describe_years(grid: &DailyValueGrid) -> String {
    if grid.is_empty() {
        "no years".to_string()
    } else {
        format!("{}-{}", grid.begin_year(), grid.end_year())
    }
}

// -- Tests -------------------------------------------------------------------
