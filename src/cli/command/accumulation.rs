use std::path::PathBuf;

use crate::{
    calendar::Season,
    chart::{AccumulationChart, ChartRenderer},
    config::Config,
    download::StationSource,
    error::Result,
    reading::Element,
};

use super::{load_station, output_path};

/// Calendar-year precipitation into `{id}_precipitation.svg`.
pub async fn precipitation<S, R>(source: &S, config: &Config, renderer: &R, station_id: &str) -> Result<PathBuf>
where
    S: StationSource,
    R: ChartRenderer,
{
    accumulation(source, config, renderer, station_id, Element::Prcp, Season::CALENDAR_YEAR, "precipitation").await
}

/// Oct-Sep snowfall into `{id}_snowfall.svg`.
pub async fn snowfall<S, R>(source: &S, config: &Config, renderer: &R, station_id: &str) -> Result<PathBuf>
where
    S: StationSource,
    R: ChartRenderer,
{
    accumulation(source, config, renderer, station_id, Element::Snow, Season::SNOW_YEAR, "snowfall").await
}

async fn accumulation<S, R>(
    source: &S,
    config: &Config,
    renderer: &R,
    station_id: &str,
    element: Element,
    season: Season,
    suffix: &str,
) -> Result<PathBuf>
where
    S: StationSource,
    R: ChartRenderer,
{
    let data = load_station(source, station_id).await?;
    let chart = AccumulationChart::build(&data.grid, &data.metadata, element, season)?;

    let file_path = output_path(config, &format!("{}_{}.svg", station_id, suffix))?;
    renderer.render_accumulation(&chart, &file_path)?;

    Ok(file_path)
}

// -- Tests -------------------------------------------------------------------
