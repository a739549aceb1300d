//! Record and climatological average temperatures for every calendar day.

use crate::{
    grid::{DailyValueGrid, MISSING},
    reading::Element,
};

/// Years averaged for the "normal" max/min, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimatologyWindow {
    pub first_year: i32,
    pub last_year: i32,
}

impl ClimatologyWindow {
    pub fn new(first_year: i32, last_year: i32) -> Self {
        ClimatologyWindow {
            first_year,
            last_year,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }
}

impl Default for ClimatologyWindow {
    fn default() -> Self {
        ClimatologyWindow::new(1981, 2010)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Converts a value in degrees Celsius.
    pub fn convert(&self, celsius: f32) -> f32 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 1.8 + 32.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalendarDayStatistic {
    pub record_max: Option<f32>,
    pub record_min: Option<f32>,
    pub average_max: Option<f32>,
    pub average_min: Option<f32>,
}

impl CalendarDayStatistic {
    pub fn record_max_or_missing(&self) -> f32 {
        self.record_max.unwrap_or(MISSING)
    }

    pub fn record_min_or_missing(&self) -> f32 {
        self.record_min.unwrap_or(MISSING)
    }

    pub fn average_max_or_missing(&self) -> f32 {
        self.average_max.unwrap_or(MISSING)
    }

    pub fn average_min_or_missing(&self) -> f32 {
        self.average_min.unwrap_or(MISSING)
    }
}

/// One [`CalendarDayStatistic`] per `(month, day)`. Slot 31 of short months
/// is always empty.
#[derive(Debug, Clone)]
pub struct CalendarStatistics {
    days: [[CalendarDayStatistic; 31]; 12],
    pub window: ClimatologyWindow,
    pub unit: TemperatureUnit,
}

impl CalendarStatistics {
    pub fn get(&self, month: u32, day: u32) -> Option<&CalendarDayStatistic> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(&self.days[(month - 1) as usize][(day - 1) as usize])
    }
}

/// Record max of TMAX, record min of TMIN and their window averages for each
/// calendar day, after converting to `unit`. Cells with no samples stay
/// `None` rather than averaging to zero.
pub fn compute_calendar_statistics(
    grid: &DailyValueGrid,
    window: ClimatologyWindow,
    unit: TemperatureUnit,
) -> CalendarStatistics {
    let mut days = [[CalendarDayStatistic::default(); 31]; 12];

    for (m, row) in days.iter_mut().enumerate() {
        for (d, stat) in row.iter_mut().enumerate() {
            let month = m as u32 + 1;
            let day = d as u32 + 1;

            let maxes = values_at(grid, month, day, Element::Tmax, unit);
            let mins = values_at(grid, month, day, Element::Tmin, unit);

            stat.record_max = maxes.iter().map(|&(_, v)| v).reduce(f32::max);
            stat.record_min = mins.iter().map(|&(_, v)| v).reduce(f32::min);
            stat.average_max = mean_in_window(&maxes, window);
            stat.average_min = mean_in_window(&mins, window);
        }
    }

    CalendarStatistics { days, window, unit }
}

fn values_at(
    grid: &DailyValueGrid,
    month: u32,
    day: u32,
    element: Element,
    unit: TemperatureUnit,
) -> Vec<(i32, f32)> {
    grid.years()
        .filter_map(|year| {
            grid.get(year, month, day, element)
                .map(|v| (year, unit.convert(v)))
        })
        .collect()
}

fn mean_in_window(values: &[(i32, f32)], window: ClimatologyWindow) -> Option<f32> {
    let (sum, count) = values
        .iter()
        .filter(|(year, _)| window.contains(*year))
        .fold((0.0f64, 0usize), |(sum, count), &(_, v)| (sum + v as f64, count + 1));

    (count > 0).then(|| (sum / count as f64) as f32)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "USW00094728";

    fn grid_fixture() -> DailyValueGrid {
        let mut grid = DailyValueGrid::new(ID, 1979, 2012);
        // Jan 1: TMAX every year from 1979, rising by a degree a year
        for (i, year) in (1979..=2012).enumerate() {
            grid.set(year, 1, 1, Element::Tmax, i as f32);
            grid.set(year, 1, 1, Element::Tmin, -(i as f32));
        }
        grid
    }

    #[test]
    fn should_compute_records() {
        let stats = compute_calendar_statistics(&grid_fixture(), ClimatologyWindow::default(), TemperatureUnit::Celsius);
        let jan1 = stats.get(1, 1).unwrap();

        assert_eq!(jan1.record_max, Some(33.0));
        assert_eq!(jan1.record_min, Some(-33.0));
    }

    #[test]
    fn should_average_over_window_only() {
        let stats = compute_calendar_statistics(&grid_fixture(), ClimatologyWindow::default(), TemperatureUnit::Celsius);
        let jan1 = stats.get(1, 1).unwrap();

        // 1981..=2010 holds the values 2..=31
        assert_eq!(jan1.average_max, Some(16.5));
        assert_eq!(jan1.average_min, Some(-16.5));
    }

    #[test]
    fn should_return_missing_for_empty_cells() {
        let stats = compute_calendar_statistics(&grid_fixture(), ClimatologyWindow::default(), TemperatureUnit::Fahrenheit);
        let jan2 = stats.get(1, 2).unwrap();

        assert_eq!(jan2.record_max, None);
        assert_eq!(jan2.average_min, None);
        assert_eq!(jan2.average_max_or_missing(), MISSING);
        assert_eq!(jan2.record_min_or_missing(), MISSING);
        assert_ne!(jan2.average_max_or_missing(), 0.0);
    }

    #[test]
    fn should_return_missing_when_window_is_empty() {
        let mut grid = DailyValueGrid::new(ID, 1950, 1960);
        grid.set(1955, 7, 4, Element::Tmax, 30.0);

        let stats = compute_calendar_statistics(&grid, ClimatologyWindow::default(), TemperatureUnit::Celsius);
        let jul4 = stats.get(7, 4).unwrap();

        assert_eq!(jul4.record_max, Some(30.0));
        assert_eq!(jul4.average_max, None);
    }

    #[test]
    fn should_convert_before_comparing() {
        let mut grid = DailyValueGrid::new(ID, 2000, 2001);
        grid.set(2000, 6, 1, Element::Tmax, 0.0);
        grid.set(2001, 6, 1, Element::Tmax, 100.0);

        let stats = compute_calendar_statistics(&grid, ClimatologyWindow::new(2000, 2001), TemperatureUnit::Fahrenheit);
        let jun1 = stats.get(6, 1).unwrap();

        assert_eq!(jun1.record_max, Some(212.0));
        assert_eq!(jun1.average_max, Some(122.0));
    }

    #[test]
    fn should_be_all_missing_for_empty_grid() {
        let stats = compute_calendar_statistics(&DailyValueGrid::empty(ID), ClimatologyWindow::default(), TemperatureUnit::Celsius);

        for month in 1..=12 {
            for day in 1..=31 {
                assert_eq!(stats.get(month, day), Some(&CalendarDayStatistic::default()));
            }
        }
        assert!(stats.get(13, 1).is_none());
    }
}
