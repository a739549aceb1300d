//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::debug;

use crate::{
    config::Config,
    error::{GhcndError, Result},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Fetches GHCN-Daily station records and turns them into CSV, parquet and
/// charts
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Directory for downloaded station files [default: user cache dir]
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Directory written outputs go to
    #[arg(long, global = true, env = "GHCND_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Root URL of the GHCN-Daily archive
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Download again even if a cached copy exists
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Enable verbose logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Layers the flags that were given over `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        let refresh = self.refresh || config.refresh;
        config.with_refresh(refresh)
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write each station's daily values to `{id}.csv`
    Csv {
        #[arg(required = true)]
        station_ids: Vec<String>,
    },
    /// Write each station's daily values to `{id}.parquet`
    Parquet {
        #[arg(required = true)]
        station_ids: Vec<String>,
    },
    /// Chart daily temperatures against records and normals
    Temperature {
        #[arg(required = true)]
        station_ids: Vec<String>,
        /// First day to chart, YYYYMMDD
        #[arg(long)]
        begin: String,
        /// Last day to chart, YYYYMMDD
        #[arg(long)]
        end: String,
    },
    /// Chart season-to-date precipitation from Jan 1
    Precipitation {
        #[arg(required = true)]
        station_ids: Vec<String>,
    },
    /// Chart season-to-date snowfall from Oct 1
    Snowfall {
        #[arg(required = true)]
        station_ids: Vec<String>,
    },
    /// Write one year of every station's values to `{year}.parquet`
    Year {
        year: i32,
        /// Keep only these stations
        station_ids: Vec<String>,
    },
    /// Print a station's metadata
    Station { station_id: String },
    /// Save all station metadata to parquet
    Stations {},
    /// Print a station's element coverage, or save the whole inventory to parquet
    Inventory { station_id: Option<String> },
    /// Print the archive version
    Version {},
}

/// Initialises the global tracing subscriber; `RUST_LOG` wins over the flags.
pub fn setup_logging(args: &GlobalArgs) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("ghcnd={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .map_err(|e| GhcndError::Configuration {
            message: format!("logging already initialised: {}", e),
        })?;

    debug!("Logging initialised at level {}", log_level);
    Ok(())
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "ghcnd",
            "csv",
            "USW00094728",
            "USC00305801",
            "--cache-dir",
            "/tmp/cache",
            "--timeout",
            "5",
            "-vv",
        ])
        .unwrap();

        match &cli.command {
            Commands::Csv { station_ids } => assert_eq!(station_ids.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.global.log_level(), "debug");

        let config = cli.global.apply(Config::default());
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.refresh);
    }

    #[test]
    fn should_keep_refresh_from_config() {
        let cli = Cli::try_parse_from(["ghcnd", "version"]).unwrap();
        assert!(cli.global.apply(Config::default().with_refresh(true)).refresh);

        let cli = Cli::try_parse_from(["ghcnd", "version", "--refresh"]).unwrap();
        let config = cli.global.apply(Config::default().with_base_url("http://mirror/ghcn"));
        assert!(config.refresh);
        assert_eq!(config.base_url, "http://mirror/ghcn");
    }

    #[test]
    fn should_parse_year_and_inventory() {
        let cli = Cli::try_parse_from(["ghcnd", "year", "2023", "USW00094728"]).unwrap();
        match cli.command {
            Commands::Year { year, station_ids } => {
                assert_eq!(year, 2023);
                assert_eq!(station_ids, vec!["USW00094728"]);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["ghcnd", "inventory"]).unwrap();
        assert!(matches!(cli.command, Commands::Inventory { station_id: None }));
        assert!(Cli::try_parse_from(["ghcnd", "year", "last"]).is_err());
    }

    #[test]
    fn should_require_temperature_window() {
        assert!(Cli::try_parse_from(["ghcnd", "temperature", "USW00094728"]).is_err());
        assert!(Cli::try_parse_from([
            "ghcnd",
            "temperature",
            "USW00094728",
            "--begin",
            "20230101",
            "--end",
            "20231231"
        ])
        .is_ok());
    }

    #[test]
    fn should_reject_quiet_with_verbose() {
        assert!(Cli::try_parse_from(["ghcnd", "version", "-q", "-v"]).is_err());
    }

    #[test]
    fn should_require_station_ids() {
        assert!(Cli::try_parse_from(["ghcnd", "snowfall"]).is_err());
    }
}
