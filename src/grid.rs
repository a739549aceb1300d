//! Dense per-day grid of one station's decoded values, indexed by
//! `[year, month, day, element]`.

use tracing::{debug, warn};

use crate::{
    calendar::is_valid_date,
    error::Result,
    reading::{DailyReading, Element, ElementSet, NUM_ELEMENTS},
};

/// Value reported for cells that hold no data.
pub const MISSING: f32 = -9999.0;

const MONTHS: usize = 12;
const DAYS: usize = 31;
const CELLS_PER_YEAR: usize = MONTHS * DAYS * NUM_ELEMENTS;

#[derive(Debug, Clone, Default)]
struct Bitset {
    words: Vec<u64>,
}

impl Bitset {
    fn with_len(len: usize) -> Self {
        Bitset {
            words: vec![0; len.div_ceil(64)],
        }
    }

    fn get(&self, i: usize) -> bool {
        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    fn set(&mut self, i: usize) {
        self.words[i / 64] |= 1 << (i % 64);
    }
}

/// Values alongside a validity bitset, so "missing" never depends on
/// comparing floats against the sentinel.
#[derive(Debug, Clone)]
pub struct DailyValueGrid {
    station_id: String,
    begin_year: i32,
    num_years: usize,
    values: Vec<f32>,
    valid: Bitset,
}

impl DailyValueGrid {
    /// A grid covering `begin_year..=end_year` with every cell missing.
    pub fn new(station_id: &str, begin_year: i32, end_year: i32) -> Self {
        let num_years = if end_year >= begin_year {
            (end_year - begin_year + 1) as usize
        } else {
            0
        };
        let cells = num_years * CELLS_PER_YEAR;

        DailyValueGrid {
            station_id: station_id.to_string(),
            begin_year,
            num_years,
            values: vec![MISSING; cells],
            valid: Bitset::with_len(cells),
        }
    }

    /// A grid with no years.
    pub fn empty(station_id: &str) -> Self {
        Self::new(station_id, 0, -1)
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn is_empty(&self) -> bool {
        self.num_years == 0
    }

    pub fn num_years(&self) -> usize {
        self.num_years
    }

    pub fn begin_year(&self) -> i32 {
        self.begin_year
    }

    pub fn end_year(&self) -> i32 {
        self.begin_year + self.num_years as i32 - 1
    }

    /// Calendar years covered by the grid.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.begin_year..=self.end_year()
    }

    pub fn contains_year(&self, year: i32) -> bool {
        !self.is_empty() && self.years().contains(&year)
    }

    fn offset(&self, year: i32, month: u32, day: u32, element: Element) -> Option<usize> {
        if !self.contains_year(year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        let year_index = (year - self.begin_year) as usize;
        let month_index = (month - 1) as usize;
        let day_index = (day - 1) as usize;

        Some(
            ((year_index * MONTHS + month_index) * DAYS + day_index) * NUM_ELEMENTS
                + element.index(),
        )
    }

    /// The value at a coordinate, or `None` when missing or out of range.
    pub fn get(&self, year: i32, month: u32, day: u32, element: Element) -> Option<f32> {
        self.offset(year, month, day, element)
            .filter(|&i| self.valid.get(i))
            .map(|i| self.values[i])
    }

    pub fn get_or_missing(&self, year: i32, month: u32, day: u32, element: Element) -> f32 {
        self.get(year, month, day, element).unwrap_or(MISSING)
    }

    /// Stores a value, replacing any earlier one. Returns `false` if the
    /// coordinate is outside the grid.
    pub fn set(&mut self, year: i32, month: u32, day: u32, element: Element, value: f32) -> bool {
        match self.offset(year, month, day, element) {
            Some(i) => {
                self.values[i] = value;
                self.valid.set(i);
                true
            }
            None => false,
        }
    }

    /// True if any element holds a value on this date.
    pub fn has_any(&self, year: i32, month: u32, day: u32) -> bool {
        Element::ALL
            .iter()
            .any(|&element| self.get(year, month, day, element).is_some())
    }

    /// The latest `(year, month, day)` holding a value for `element`.
    pub fn last_valid_date(&self, element: Element) -> Option<(i32, u32, u32)> {
        for year in self.years().rev() {
            for month in (1..=12).rev() {
                for day in (1..=31).rev() {
                    if self.get(year, month, day, element).is_some() {
                        return Some((year, month, day));
                    }
                }
            }
        }
        None
    }

    /// Years holding at least one value for `element`.
    pub fn valid_years(&self, element: Element) -> Vec<i32> {
        self.years()
            .filter(|&year| {
                (1..=12).any(|month| (1..=31).any(|day| self.get(year, month, day, element).is_some()))
            })
            .collect()
    }

    /// Iterates every calendar-valid date in the grid in chronological order.
    pub fn dates(&self) -> impl Iterator<Item = (i32, u32, u32)> + '_ {
        self.years().flat_map(|year| {
            (1..=12u32).flat_map(move |month| {
                (1..=31u32)
                    .filter(move |&day| is_valid_date(year, month, day))
                    .map(move |day| (year, month, day))
            })
        })
    }
}

/// Builds a grid from one station's `.dly` lines.
///
/// The year range comes from every recognised line, not just the first and
/// last, so unsorted input cannot fall outside the grid. Lines naming a
/// different station are skipped.
pub fn build_daily_grid<S: AsRef<str>>(station_id: &str, lines: &[S]) -> Result<DailyValueGrid> {
    build_daily_grid_with(station_id, lines, &ElementSet::all())
}

pub fn build_daily_grid_with<S: AsRef<str>>(
    station_id: &str,
    lines: &[S],
    elements: &ElementSet,
) -> Result<DailyValueGrid> {
    let mut readings = Vec::with_capacity(lines.len());
    let mut foreign = 0usize;

    for line in lines.iter().map(AsRef::as_ref) {
        let Some(reading) = DailyReading::from_line(line, elements)? else {
            continue;
        };
        if reading.id.trim() != station_id {
            foreign += 1;
            continue;
        }
        readings.push(reading);
    }

    if foreign > 0 {
        warn!("Skipped {} lines for stations other than {}", foreign, station_id);
    }

    let Some(begin_year) = readings.iter().map(|r| r.year).min() else {
        debug!("No usable lines for {}", station_id);
        return Ok(DailyValueGrid::empty(station_id));
    };
    let end_year = readings.iter().map(|r| r.year).max().unwrap_or(begin_year);

    let mut grid = DailyValueGrid::new(station_id, begin_year, end_year);
    let mut written = 0usize;
    for reading in &readings {
        for value in reading.decoded() {
            grid.set(value.year, value.month, value.day, value.element, value.value);
            written += 1;
        }
    }

    debug!(
        "Built grid for {}: {} lines, {}-{}, {} values",
        station_id,
        readings.len(),
        begin_year,
        end_year,
        written
    );

    Ok(grid)
}

// -- Tests -------------------------------------------------------------------
