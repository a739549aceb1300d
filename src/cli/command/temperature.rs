use std::path::PathBuf;

use chrono::NaiveDate;

use crate::{
    chart::{ChartRenderer, TemperatureChart},
    config::Config,
    download::StationSource,
    error::Result,
};

use super::{load_station, output_path};

/// Charts `begin..=end` against records and normals into `{id}_temperature.svg`.
pub async fn temperature<S, R>(
    source: &S,
    config: &Config,
    renderer: &R,
    station_id: &str,
    begin: NaiveDate,
    end: NaiveDate,
) -> Result<PathBuf>
where
    S: StationSource,
    R: ChartRenderer,
{
    let data = load_station(source, station_id).await?;
    let chart = TemperatureChart::build(&data.grid, &data.metadata, config.climatology, begin, end)?;

    let file_path = output_path(config, &format!("{}_temperature.svg", station_id))?;
    renderer.render_temperature(&chart, &file_path)?;

    Ok(file_path)
}

// -- Tests -------------------------------------------------------------------
