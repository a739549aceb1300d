pub mod accumulation;
pub mod export;
pub mod stations;
pub mod temperature;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Datelike, Local};
use tracing::{error, info};

pub use accumulation::{precipitation, snowfall};
pub use export::{csv, parquet, year};
pub use stations::{inventory, station, station_elements, stations, version};
pub use temperature::temperature;

use crate::{
    calendar::parse_yyyymmdd,
    chart::SvgRenderer,
    cli::Commands,
    config::Config,
    download::StationSource,
    error::Result,
    grid::{build_daily_grid, DailyValueGrid},
    reading::{find_station, StationMetadata},
};

/// A station's metadata together with its decoded records.
pub struct StationData {
    pub metadata: StationMetadata,
    pub grid: DailyValueGrid,
}

/// Fetches and decodes everything needed to export or chart one station.
pub async fn load_station<S: StationSource>(source: &S, station_id: &str) -> Result<StationData> {
    let (metadata_lines, station_lines) =
        tokio::try_join!(source.fetch_station_metadata(), source.fetch_station_file(station_id))?;

    let metadata = find_station(&metadata_lines, station_id)?;
    let grid = build_daily_grid(station_id, &station_lines)?;
    if grid.is_empty() {
        info!("Station {} has no recognised records", station_id);
    } else {
        info!(
            "Station {} covers {}-{}",
            station_id,
            grid.begin_year(),
            grid.end_year()
        );
    }

    Ok(StationData { metadata, grid })
}

/// `file_name` under the configured output directory, creating it if needed.
pub fn output_path(config: &Config, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(&config.output_dir)?;

    Ok(config.output_dir.join(file_name))
}

pub fn make_parquet_file_name(output_dir: &Path, dataset: &str) -> PathBuf {
    let today = Local::now();
    let file_name = format!(
        "ghcnd-{}-{}-{:02}-{:02}.parquet",
        dataset,
        today.year(),
        today.month(),
        today.day()
    );

    output_dir.join(file_name)
}

/// Runs `command`, returning how many stations failed. Commands that work on
/// the whole archive fail outright instead.
pub async fn run<S: StationSource>(source: &S, config: &Config, command: &Commands) -> Result<usize> {
    let renderer = SvgRenderer::default();

    let failures = match command {
        Commands::Csv { station_ids } => {
            for_each_station(station_ids, |id| csv(source, config, id)).await
        }
        Commands::Parquet { station_ids } => {
            for_each_station(station_ids, |id| parquet(source, config, id)).await
        }
        Commands::Temperature {
            station_ids,
            begin,
            end,
        } => {
            let (begin, end) = (parse_yyyymmdd(begin)?, parse_yyyymmdd(end)?);
            for_each_station(station_ids, |id| temperature(source, config, &renderer, id, begin, end)).await
        }
        Commands::Precipitation { station_ids } => {
            for_each_station(station_ids, |id| precipitation(source, config, &renderer, id)).await
        }
        Commands::Snowfall { station_ids } => {
            for_each_station(station_ids, |id| snowfall(source, config, &renderer, id)).await
        }
        Commands::Year { year: wanted, station_ids } => {
            let file_path = year(source, config, *wanted, station_ids).await?;
            println!("File saved to `{}`", file_path.display());
            0
        }
        Commands::Station { station_id } => {
            println!("{}", station(source, station_id).await?);
            0
        }
        Commands::Stations {} => {
            let file_path = stations(source, config).await?;
            println!("File saved to `{}`", file_path.display());
            0
        }
        Commands::Inventory { station_id: Some(station_id) } => {
            println!("{}", station_elements(source, station_id).await?);
            0
        }
        Commands::Inventory { station_id: None } => {
            let file_path = inventory(source, config).await?;
            println!("File saved to `{}`", file_path.display());
            0
        }
        Commands::Version {} => {
            println!("{}", version(source).await?);
            0
        }
    };

    Ok(failures)
}

/// Runs `task` for each station in turn. A failing station is logged and
/// counted; the rest still run.
async fn for_each_station<'a, F, Fut>(station_ids: &'a [String], task: F) -> usize
where
    F: Fn(&'a str) -> Fut,
    Fut: std::future::Future<Output = Result<PathBuf>>,
{
    let mut failures = 0;

    for station_id in station_ids {
        match task(station_id.as_str()).await {
            Ok(file_path) => println!("File saved to `{}`", file_path.display()),
            Err(e) => {
                error!("Station {}: {}", station_id, e);
                failures += 1;
            }
        }
    }

    failures
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use tempfile::TempDir;

    use super::*;
    use crate::{
        chart::{AccumulationChart, ChartRenderer, TemperatureChart},
        error::GhcndError,
        reading::daily::tests::make_line,
    };

    pub(crate) const CENTRAL_PARK: &str = "USW00094728";
    pub(crate) const STATION_LINE: &str =
        "USW00094728  40.7789  -73.9692   39.6 NY NEW YORK CNTRL PK TWR              HCN 72506";

    /// Serves canned text in place of the remote archive.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub metadata: Vec<String>,
        pub files: HashMap<String, Vec<String>>,
        pub version: String,
        pub inventory: Vec<String>,
        pub years: HashMap<i32, Vec<String>>,
    }

    impl FakeSource {
        /// Central Park with two years of temperature and precipitation.
        pub(crate) fn central_park() -> Self {
            let mut lines = Vec::new();
            for year in [2022, 2023] {
                for month in 1..=12 {
                    lines.push(make_line(CENTRAL_PARK, year, month, "TMAX", &[(1, 100, "  W"), (15, 250, "  W")]));
                    lines.push(make_line(CENTRAL_PARK, year, month, "TMIN", &[(1, 0, "  W"), (15, 120, "  W")]));
                    lines.push(make_line(CENTRAL_PARK, year, month, "PRCP", &[(2, 254, "  W")]));
                }
            }
            lines.push(make_line(CENTRAL_PARK, 2023, 1, "SNOW", &[(3, 50, "  W")]));

            let year_2023 = vec![
                "USW00094728,20230101,TMAX,144,,,W,2400".to_string(),
                "USW00094728,20230101,AWND,31,,,W,".to_string(),
                "USC00305801,20230101,TMAX,122,,,7,0700".to_string(),
                "USW00094728,20230102,PRCP,25,,,W,".to_string(),
            ];

            FakeSource {
                metadata: vec![STATION_LINE.to_string()],
                files: [(CENTRAL_PARK.to_string(), lines)].into_iter().collect(),
                version: "GHCN-Daily Version 3.32-upd-2024010105".to_string(),
                inventory: vec![
                    "USW00094728  40.7789  -73.9692 TMAX 1869 2024".to_string(),
                    "USC00305801  40.7789  -73.9667 SNOW 1912 2024".to_string(),
                    "USW00094728  40.7789  -73.9692 PRCP 1869 2024".to_string(),
                ],
                years: [(2023, year_2023)].into_iter().collect(),
            }
        }
    }

    impl StationSource for FakeSource {
        async fn fetch_station_file(&self, station_id: &str) -> Result<Vec<String>> {
            self.files
                .get(station_id)
                .cloned()
                .ok_or_else(|| GhcndError::RemoteFetch {
                    url: format!("fake://all/{}.dly", station_id),
                    reason: "status 404 Not Found".to_string(),
                })
        }

        async fn fetch_station_metadata(&self) -> Result<Vec<String>> {
            Ok(self.metadata.clone())
        }

        async fn fetch_version(&self) -> Result<String> {
            Ok(self.version.clone())
        }

        async fn fetch_inventory(&self) -> Result<Vec<String>> {
            Ok(self.inventory.clone())
        }

        async fn fetch_year_file(&self, year: i32) -> Result<Vec<String>> {
            self.years.get(&year).cloned().ok_or_else(|| GhcndError::RemoteFetch {
                url: format!("fake://by_year/{}.csv.gz", year),
                reason: "status 404 Not Found".to_string(),
            })
        }
    }

    /// Records what it was asked to draw instead of drawing it.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingRenderer {
        pub rendered: Arc<Mutex<Vec<(String, PathBuf)>>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render_temperature(&self, chart: &TemperatureChart, file_path: &Path) -> Result<()> {
            let mut rendered = self.rendered.lock().unwrap();
            rendered.push((chart.header.title.clone(), file_path.to_path_buf()));
            Ok(())
        }

        fn render_accumulation(&self, chart: &AccumulationChart, file_path: &Path) -> Result<()> {
            let mut rendered = self.rendered.lock().unwrap();
            rendered.push((chart.title(), file_path.to_path_buf()));
            Ok(())
        }
    }

    pub(crate) fn config(output: &TempDir) -> Config {
        Config::default().with_output_dir(output.path().to_path_buf())
    }

    #[tokio::test]
    async fn should_load_station() {
        let data = load_station(&FakeSource::central_park(), CENTRAL_PARK).await.unwrap();

        assert_eq!(data.metadata.name, "NEW YORK CNTRL PK TWR");
        assert_eq!(data.grid.begin_year(), 2022);
        assert_eq!(data.grid.end_year(), 2023);
    }

    #[tokio::test]
    async fn should_report_unknown_station() {
        let mut source = FakeSource::central_park();
        source.files.insert("USC00000001".to_string(), Vec::new());

        let err = load_station(&source, "USC00000001").await.err().unwrap();
        assert!(matches!(err, GhcndError::NotFound { .. }));
    }

    #[tokio::test]
    async fn should_continue_after_failed_station() {
        let output = TempDir::new().unwrap();
        let config = config(&output);
        let command = Commands::Csv {
            station_ids: vec!["USC00000001".to_string(), CENTRAL_PARK.to_string()],
        };

        let failures = run(&FakeSource::central_park(), &config, &command).await.unwrap();

        assert_eq!(failures, 1);
        assert!(output.path().join("USW00094728.csv").exists());
    }

    #[tokio::test]
    async fn should_reject_bad_dates_before_fetching() {
        let output = TempDir::new().unwrap();
        let command = Commands::Temperature {
            station_ids: vec![CENTRAL_PARK.to_string()],
            begin: "20230230".to_string(),
            end: "20231231".to_string(),
        };

        let err = run(&FakeSource::central_park(), &config(&output), &command)
            .await
            .unwrap_err();
        assert!(matches!(err, GhcndError::InvalidDate { .. }));
    }

    #[tokio::test]
    async fn should_run_archive_wide_commands() {
        let output = TempDir::new().unwrap();
        let config = config(&output);
        let source = FakeSource::central_park();

        for command in [
            Commands::Year { year: 2023, station_ids: Vec::new() },
            Commands::Inventory { station_id: None },
            Commands::Inventory { station_id: Some(CENTRAL_PARK.to_string()) },
        ] {
            assert_eq!(run(&source, &config, &command).await.unwrap(), 0);
        }
        assert!(output.path().join("2023.parquet").exists());

        let command = Commands::Year { year: 2022, station_ids: Vec::new() };
        assert!(run(&source, &config, &command).await.is_err());
    }

    #[test]
    fn should_make_dated_parquet_name() {
        let name = make_parquet_file_name(Path::new("/data"), "stations");
        let name = name.file_name().unwrap().to_string_lossy().to_string();

        assert!(name.starts_with("ghcnd-stations-"));
        assert!(name.ends_with(".parquet"));
    }
}
