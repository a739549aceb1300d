//! Station metadata and archive information.
//!
//! See "GHCN-Daily readme.txt Section IV" for the station file format.

use std::{fs, path::PathBuf};

use tracing::info;

use crate::{
    config::Config,
    download::StationSource,
    error::Result,
    parquet,
    reading::{find_station, parse_inventory, parse_stations, station_inventory, InventoryRow, StationMetadata},
};

use super::make_parquet_file_name;

/// Looks up one station and formats it for the terminal.
pub async fn station<S: StationSource>(source: &S, station_id: &str) -> Result<String> {
    let lines = source.fetch_station_metadata().await?;
    let metadata = find_station(&lines, station_id)?;

    Ok(describe(&metadata))
}

/// Saves every parseable station to a dated parquet file.
pub async fn stations<S: StationSource>(source: &S, config: &Config) -> Result<PathBuf> {
    let lines = source.fetch_station_metadata().await?;
    let stations = parse_stations(&lines);
    info!("Parsed {} of {} station rows", stations.len(), lines.len());

    fs::create_dir_all(&config.output_dir)?;
    let parquet_file_name = make_parquet_file_name(&config.output_dir, "stations");
    parquet::save_stations(&stations, &parquet_file_name)?;

    Ok(parquet_file_name)
}

/// Formats one station's element coverage, one element per line.
pub async fn station_elements<S: StationSource>(source: &S, station_id: &str) -> Result<String> {
    let lines = source.fetch_inventory().await?;
    let rows = station_inventory(&lines, station_id)?;

    Ok(rows.iter().map(describe_coverage).collect::<Vec<_>>().join("\n"))
}

/// Saves every parseable inventory row to a dated parquet file.
pub async fn inventory<S: StationSource>(source: &S, config: &Config) -> Result<PathBuf> {
    let lines = source.fetch_inventory().await?;
    let rows = parse_inventory(&lines);
    info!("Parsed {} of {} inventory rows", rows.len(), lines.len());

    fs::create_dir_all(&config.output_dir)?;
    let parquet_file_name = make_parquet_file_name(&config.output_dir, "inventory");
    parquet::save_inventory(&rows, &parquet_file_name)?;

    Ok(parquet_file_name)
}

pub async fn version<S: StationSource>(source: &S) -> Result<String> {
    source.fetch_version().await
}

fn describe(station: &StationMetadata) -> String {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let elevation = station
        .elevation
        .map(|metres| format!("{} m", metres))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "ID:        {}\nName:      {}\nState:     {}\nLatitude:  {}\nLongitude: {}\nElevation: {}\nGSN:       {}\nWMO ID:    {}",
        station.id,
        station.name,
        optional(&station.state),
        station.latitude,
        station.longitude,
        elevation,
        optional(&station.gsn_flag),
        optional(&station.wmo_id),
    )
}

fn describe_coverage(row: &InventoryRow) -> String {
    format!(
        "{:<4} {}-{} ({} years)",
        row.element,
        row.first_year,
        row.last_year,
        row.num_years()
    )
}

// -- Tests -------------------------------------------------------------------
