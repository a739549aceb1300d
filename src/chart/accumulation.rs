//! Season-to-date accumulation curves in inches, with the max, min, average
//! and current seasons picked out.

use crate::{
    calendar::{Season, MONTH_ABBREVIATIONS},
    chart::{round_to_five, StationHeader, Tick, MM_TO_INCHES},
    error::{GhcndError, Result},
    grid::DailyValueGrid,
    reading::{Element, StationMetadata},
    stats::{compute_accumulation_series, AccumulationSeries, AccumulationSummary, SeasonTotal},
};

/// A highlighted curve with its legend label.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub label: String,
    pub values: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct AccumulationChart {
    pub header: StationHeader,
    pub element: Element,
    pub season: Season,
    /// Every completed season, driest first
    pub background: Vec<Vec<f32>>,
    pub max: Option<Overlay>,
    pub min: Option<Overlay>,
    pub average: Option<Overlay>,
    /// Only runs up to the latest valid day
    pub current: Option<Overlay>,
    pub ticks: Vec<Tick>,
    pub y_max: i32,
}

impl AccumulationChart {
    pub fn build(
        grid: &DailyValueGrid,
        station: &StationMetadata,
        element: Element,
        season: Season,
    ) -> Result<Self> {
        let series = compute_accumulation_series(grid, element, season);
        if !series.iter().any(AccumulationSeries::has_data) {
            return Err(GhcndError::insufficient_range(
                grid.station_id(),
                format!("no {} observations", element),
            ));
        }
        let summary = AccumulationSummary::compute(grid, element, season, &series);
        let current_year = summary.current.map(|c| c.season_year);

        let mut completed: Vec<&AccumulationSeries> = series
            .iter()
            .filter(|s| s.has_data() && Some(s.season_year) != current_year)
            .collect();
        completed.sort_by(|a, b| a.total().total_cmp(&b.total()));
        let background = completed.iter().map(|s| to_inches(&s.values)).collect();

        let overlay = |name: &str, total: Option<SeasonTotal>| {
            total.and_then(|t| {
                series.iter().find(|s| s.season_year == t.season_year).map(|s| Overlay {
                    label: format!(
                        "{} ({}: {:.2}\")",
                        name,
                        season_label(season, t.season_year),
                        t.total * MM_TO_INCHES
                    ),
                    values: to_inches(&s.values),
                })
            })
        };

        let max = overlay("Max", summary.max);
        let min = overlay("Min", summary.min);
        let current = overlay("Current", summary.current).map(|mut c| {
            if let Some(slot) = summary.last_valid_slot {
                c.values.truncate(slot + 1);
            }
            c
        });
        let average = summary.average.as_ref().map(|values| Overlay {
            label: format!("Avg ({:.2}\")", values.last().copied().unwrap_or(0.0) * MM_TO_INCHES),
            values: to_inches(values),
        });

        let highest = series
            .iter()
            .map(|s| s.total() * MM_TO_INCHES)
            .fold(0.0f32, f32::max);

        let ticks = season
            .month_starts()
            .into_iter()
            .map(|(position, month)| Tick {
                position,
                label: MONTH_ABBREVIATIONS[month as usize - 1].to_string(),
            })
            .collect();

        Ok(AccumulationChart {
            header: StationHeader::new(station),
            element,
            season,
            background,
            max,
            min,
            average,
            current,
            ticks,
            y_max: round_to_five(highest + 10.0),
        })
    }

    pub fn title(&self) -> String {
        let what = match self.element {
            Element::Snow => "Snowfall",
            Element::Snwd => "Snow depth",
            _ => "Precipitation",
        };
        format!("{} {}", self.header.title, what)
    }
}

/// `1996` for calendar-year seasons, `1995-1996` when the season spans a
/// year boundary.
pub fn season_label(season: Season, season_year: i32) -> String {
    if season.start_month() == 1 {
        season_year.to_string()
    } else {
        format!("{}-{}", season_year - 1, season_year)
    }
}

fn to_inches(values: &[f32]) -> Vec<f32> {
    values.iter().map(|v| v * MM_TO_INCHES).collect()
}

// -- Tests -------------------------------------------------------------------
