//! Save a station's daily values to disk.

use std::path::PathBuf;

use tracing::info;

use crate::{
    config::Config,
    csv::save_csv,
    download::StationSource,
    error::Result,
    parquet::{save_daily, save_year_records},
    reading::{parse_year_records, ElementSet},
};

use super::{load_station, output_path};

/// Writes `{id}.csv` with one row per day that has any value.
pub async fn csv<S: StationSource>(source: &S, config: &Config, station_id: &str) -> Result<PathBuf> {
    let data = load_station(source, station_id).await?;
    let file_path = output_path(config, &format!("{}.csv", station_id))?;

    save_csv(&data.grid, &file_path)?;

    Ok(file_path)
}

/// Writes `{id}.parquet` in long format, one row per valid value.
pub async fn parquet<S: StationSource>(source: &S, config: &Config, station_id: &str) -> Result<PathBuf> {
    let data = load_station(source, station_id).await?;
    let file_path = output_path(config, &format!("{}.parquet", station_id))?;

    save_daily(&data.grid, &file_path)?;

    Ok(file_path)
}

/// Writes `{year}.parquet` from the yearly file, keeping only `station_ids`
/// when any are given.
pub async fn year<S: StationSource>(
    source: &S,
    config: &Config,
    year: i32,
    station_ids: &[String],
) -> Result<PathBuf> {
    let lines = source.fetch_year_file(year).await?;
    let records = parse_year_records(&lines, &ElementSet::all(), station_ids)?;
    info!("Decoded {} of {} rows for {}", records.len(), lines.len(), year);

    let file_path = output_path(config, &format!("{}.parquet", year))?;
    save_year_records(&records, &file_path)?;

    Ok(file_path)
}

// -- Tests -------------------------------------------------------------------
