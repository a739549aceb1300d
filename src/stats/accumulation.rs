//! Running season-to-date totals (precipitation from Jan 1, snowfall from
//! Oct 1) and the max/min/average seasons derived from them.

use crate::{
    calendar::{is_valid_date, Season, SLOTS_PER_SEASON},
    grid::DailyValueGrid,
    reading::Element,
};

/// One season of running totals over the 366 calendar slots.
///
/// Slots follow the leap-year calendar in every season, so a given month and
/// day always lands on the same slot: in a Jan 1 season Feb 29 is slot 59 and
/// Mar 1 is slot 60, even in common years. A missing day, or Feb 29 in a
/// common year, repeats the previous slot's total.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationSeries {
    pub season_year: i32,
    pub values: Vec<f32>,
    pub valid_days: usize,
}

impl AccumulationSeries {
    pub fn total(&self) -> f32 {
        self.values.last().copied().unwrap_or(0.0)
    }

    pub fn has_data(&self) -> bool {
        self.valid_days > 0
    }
}

/// One series per season year touching the grid's calendar years.
pub fn compute_accumulation_series(
    grid: &DailyValueGrid,
    element: Element,
    season: Season,
) -> Vec<AccumulationSeries> {
    if grid.is_empty() {
        return Vec::new();
    }

    let (first, last) = season.season_years(grid.begin_year(), grid.end_year());
    (first..=last)
        .map(|season_year| accumulate_season(grid, element, season, season_year))
        .collect()
}

fn accumulate_season(
    grid: &DailyValueGrid,
    element: Element,
    season: Season,
    season_year: i32,
) -> AccumulationSeries {
    let mut values = vec![0.0; SLOTS_PER_SEASON];
    let mut running = 0.0f32;
    let mut valid_days = 0;

    for (slot, month, day) in season.slots() {
        let year = season.calendar_year(season_year, month);
        if is_valid_date(year, month, day) {
            if let Some(value) = grid.get(year, month, day, element) {
                running += value;
                valid_days += 1;
            }
        }
        values[slot] = running;
    }

    AccumulationSeries {
        season_year,
        values,
        valid_days,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonTotal {
    pub season_year: i32,
    pub total: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationSummary {
    /// Wettest/snowiest season, ignoring zero totals
    pub max: Option<SeasonTotal>,
    /// Driest season, ignoring zero totals
    pub min: Option<SeasonTotal>,
    /// The season holding the latest valid day
    pub current: Option<SeasonTotal>,
    /// Slot of the latest valid day within the current season
    pub last_valid_slot: Option<usize>,
    /// Mean running total of every season with data except the current one
    pub average: Option<Vec<f32>>,
}

impl AccumulationSummary {
    pub fn compute(grid: &DailyValueGrid, element: Element, season: Season, series: &[AccumulationSeries]) -> Self {
        let last_valid = grid.last_valid_date(element);
        let current_year = last_valid.map(|(year, month, _)| season.season_year_of(year, month));
        let last_valid_slot = last_valid.and_then(|(_, month, day)| season.slot(month, day));

        let current = current_year.and_then(|year| {
            series
                .iter()
                .find(|s| s.season_year == year)
                .map(|s| SeasonTotal {
                    season_year: s.season_year,
                    total: s.total(),
                })
        });

        AccumulationSummary {
            max: extreme_season(series, |candidate, best| candidate > best),
            min: extreme_season(series, |candidate, best| candidate < best),
            current,
            last_valid_slot,
            average: average_series(series, current_year),
        }
    }

    pub fn average_total(&self) -> Option<f32> {
        self.average.as_ref().and_then(|a| a.last().copied())
    }
}

/// First season whose total beats every other non-zero total under
/// `better`; ties keep the earliest season.
fn extreme_season<F>(series: &[AccumulationSeries], better: F) -> Option<SeasonTotal>
where
    F: Fn(f32, f32) -> bool,
{
    let mut best: Option<SeasonTotal> = None;

    for s in series {
        let total = s.total();
        if total == 0.0 {
            continue;
        }
        match best {
            Some(b) if !better(total, b.total) => {}
            _ => {
                best = Some(SeasonTotal {
                    season_year: s.season_year,
                    total,
                })
            }
        }
    }

    best
}

fn average_series(series: &[AccumulationSeries], current_year: Option<i32>) -> Option<Vec<f32>> {
    let with_data: Vec<&AccumulationSeries> = series.iter().filter(|s| s.has_data()).collect();
    let complete: Vec<&AccumulationSeries> = with_data
        .iter()
        .copied()
        .filter(|s| Some(s.season_year) != current_year)
        .collect();

    let included = if complete.is_empty() { with_data } else { complete };
    if included.is_empty() {
        return None;
    }

    let n = included.len() as f64;
    let average = (0..SLOTS_PER_SEASON)
        .map(|slot| {
            let sum: f64 = included.iter().map(|s| s.values[slot] as f64).sum();
            (sum / n) as f32
        })
        .collect();

    Some(average)
}

// -- Tests -------------------------------------------------------------------
