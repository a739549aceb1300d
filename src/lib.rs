//! Reads GHCN-Daily station files into a dense per-day grid, derives
//! calendar-day records and normals plus season-to-date accumulations, and
//! exports them as CSV, parquet and SVG charts.

pub mod calendar;
pub mod chart;
pub mod cli;
pub mod config;
pub mod csv;
pub mod download;
pub mod error;
pub mod grid;
pub mod parquet;
pub mod reading;
pub mod stats;

pub use config::Config;
pub use download::{Archive, StationSource};
pub use error::{GhcndError, Result};
pub use grid::{build_daily_grid, DailyValueGrid};
pub use reading::{find_station, Element, StationMetadata};
pub use stats::{compute_accumulation_series, compute_calendar_statistics};
