//! Statistics derived from a completed [`DailyValueGrid`](crate::grid::DailyValueGrid).

pub mod accumulation;
pub mod calendar;

pub use accumulation::{compute_accumulation_series, AccumulationSeries, AccumulationSummary, SeasonTotal};
pub use calendar::{
    compute_calendar_statistics, CalendarDayStatistic, CalendarStatistics, ClimatologyWindow, TemperatureUnit,
};
