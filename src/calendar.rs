//! Calendar helpers: month lengths, leap years and the 366-slot day-of-year
//! mapping shared by the accumulation series.

use chrono::NaiveDate;

use crate::error::{GhcndError, Result};

/// Every (month, day) pair valid in this year gets a slot, so Feb 29 always
/// has one.
pub const REFERENCE_LEAP_YEAR: i32 = 2012;

pub const SLOTS_PER_SEASON: usize = 366;

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in `month` of `year`, or `None` if the month
/// is outside 1-12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

pub fn is_valid_date(year: i32, month: u32, day: u32) -> bool {
    day >= 1 && days_in_month(year, month).is_some_and(|n| day <= n)
}

/// Parses a `YYYYMMDD` string.
pub fn parse_yyyymmdd(input: &str) -> Result<NaiveDate> {
    let invalid = || GhcndError::InvalidDate {
        input: input.to_string(),
    };

    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = input[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = input[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = input[6..8].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// A twelve month accumulation window starting on the first of `start_month`.
///
/// A season is labelled by the calendar year its final month falls in, so the
/// snow season running Oct 1995 - Sep 1996 is season 1996.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Season {
    start_month: u32,
}

impl Season {
    pub const CALENDAR_YEAR: Season = Season { start_month: 1 };
    pub const SNOW_YEAR: Season = Season { start_month: 10 };

    pub fn starting_in(start_month: u32) -> Result<Self> {
        if (1..=12).contains(&start_month) {
            Ok(Season { start_month })
        } else {
            Err(GhcndError::InvalidSeason { month: start_month })
        }
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Months in season order, e.g. `[10, 11, 12, 1, .., 9]` for the snow season.
    pub fn months(&self) -> [u32; 12] {
        let mut months = [0; 12];
        for (i, month) in months.iter_mut().enumerate() {
            *month = (self.start_month - 1 + i as u32) % 12 + 1;
        }
        months
    }

    /// The calendar year that `month` of `season_year` falls in.
    pub fn calendar_year(&self, season_year: i32, month: u32) -> i32 {
        if self.start_month > 1 && month >= self.start_month {
            season_year - 1
        } else {
            season_year
        }
    }

    /// The first and last season years touching the calendar years
    /// `begin..=end`.
    pub fn season_years(&self, begin: i32, end: i32) -> (i32, i32) {
        if self.start_month == 1 {
            (begin, end)
        } else {
            (begin, end + 1)
        }
    }

    /// The season year that a calendar date belongs to.
    pub fn season_year_of(&self, year: i32, month: u32) -> i32 {
        if self.start_month > 1 && month >= self.start_month {
            year + 1
        } else {
            year
        }
    }

    /// Walks the 366 slots in order, yielding `(slot, month, day)`.
    pub fn slots(&self) -> impl Iterator<Item = (usize, u32, u32)> {
        self.months()
            .into_iter()
            .flat_map(|month| {
                let days = days_in_month(REFERENCE_LEAP_YEAR, month).unwrap_or(0);
                (1..=days).map(move |day| (month, day))
            })
            .enumerate()
            .map(|(slot, (month, day))| (slot, month, day))
    }

    /// Slot index of `(month, day)`, or `None` if the pair is not a date even
    /// in a leap year.
    pub fn slot(&self, month: u32, day: u32) -> Option<usize> {
        if !is_valid_date(REFERENCE_LEAP_YEAR, month, day) {
            return None;
        }

        let mut slot = 0;
        for m in self.months() {
            if m == month {
                return Some(slot + day as usize - 1);
            }
            slot += days_in_month(REFERENCE_LEAP_YEAR, m).unwrap_or(0) as usize;
        }

        None
    }

    /// Slot index of the first day of every month, in season order.
    pub fn month_starts(&self) -> Vec<(usize, u32)> {
        self.months()
            .into_iter()
            .filter_map(|month| self.slot(month, 1).map(|slot| (slot, month)))
            .collect()
    }
}

impl Default for Season {
    fn default() -> Self {
        Season::CALENDAR_YEAR
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_know_leap_years() {
        assert!(is_leap_year(2012));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
    }

    #[test]
    fn should_count_days_in_month() {
        assert_eq!(days_in_month(2012, 2), Some(29));
        assert_eq!(days_in_month(2013, 2), Some(28));
        assert_eq!(days_in_month(2013, 4), Some(30));
        assert_eq!(days_in_month(2013, 12), Some(31));
        assert_eq!(days_in_month(2013, 13), None);
        assert_eq!(days_in_month(2013, 0), None);
    }

    #[test]
    fn should_reject_feb_30() {
        assert!(!is_valid_date(2012, 2, 30));
        assert!(!is_valid_date(2013, 2, 29));
        assert!(is_valid_date(2012, 2, 29));
        assert!(!is_valid_date(2012, 1, 0));
    }

    #[test]
    fn should_parse_yyyymmdd() {
        let date = parse_yyyymmdd("19490102").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1949, 1, 2).unwrap());

        assert!(parse_yyyymmdd("19490230").is_err());
        assert!(parse_yyyymmdd("1949-1-2").is_err());
        assert!(parse_yyyymmdd("").is_err());
    }

    #[test]
    fn should_order_snow_season_months() {
        assert_eq!(Season::SNOW_YEAR.months(), [10, 11, 12, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(Season::CALENDAR_YEAR.months()[0], 1);
    }

    #[test]
    fn should_have_366_slots() {
        assert_eq!(Season::CALENDAR_YEAR.slots().count(), SLOTS_PER_SEASON);
        assert_eq!(Season::SNOW_YEAR.slots().count(), SLOTS_PER_SEASON);
    }

    #[test]
    fn should_map_slots() {
        let calendar = Season::CALENDAR_YEAR;
        assert_eq!(calendar.slot(1, 1), Some(0));
        assert_eq!(calendar.slot(2, 29), Some(59));
        assert_eq!(calendar.slot(3, 1), Some(60));
        assert_eq!(calendar.slot(12, 31), Some(365));
        assert_eq!(calendar.slot(2, 30), None);

        let snow = Season::SNOW_YEAR;
        assert_eq!(snow.slot(10, 1), Some(0));
        assert_eq!(snow.slot(1, 1), Some(92));
        assert_eq!(snow.slot(9, 30), Some(365));
    }

    #[test]
    fn should_place_months_in_season_years() {
        let snow = Season::SNOW_YEAR;
        assert_eq!(snow.calendar_year(1996, 10), 1995);
        assert_eq!(snow.calendar_year(1996, 2), 1996);
        assert_eq!(snow.season_year_of(1995, 11), 1996);
        assert_eq!(snow.season_year_of(1996, 3), 1996);
        assert_eq!(snow.season_years(1990, 2000), (1990, 2001));
        assert_eq!(Season::CALENDAR_YEAR.season_years(1990, 2000), (1990, 2000));
    }

    #[test]
    fn should_reject_invalid_season() {
        assert!(Season::starting_in(0).is_err());
        assert!(Season::starting_in(13).is_err());
        assert_eq!(Season::starting_in(10).unwrap(), Season::SNOW_YEAR);
    }
}
