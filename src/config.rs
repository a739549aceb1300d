//! Runtime configuration.
//!
//! Layered: built-in defaults, then `GHCND_*` environment variables, then
//! command line flags (applied by the CLI through the `with_*` methods).

use std::{env, path::PathBuf, time::Duration};

use tracing::debug;

use crate::{
    error::{GhcndError, Result},
    stats::ClimatologyWindow,
};

pub const DEFAULT_BASE_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn/daily";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_BASE_URL: &str = "GHCND_BASE_URL";
pub const ENV_CACHE_DIR: &str = "GHCND_CACHE_DIR";
pub const ENV_TIMEOUT_SECS: &str = "GHCND_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the GHCN-Daily archive, without trailing slash
    pub base_url: String,
    /// Where downloaded `.dly` and metadata files are kept between runs
    pub cache_dir: PathBuf,
    /// Where CSV, parquet and chart files are written
    pub output_dir: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
    /// Download again even when a cached copy exists
    pub refresh: bool,
    pub climatology: ClimatologyWindow,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: default_cache_dir(),
            output_dir: PathBuf::from("."),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh: false,
            climatology: ClimatologyWindow::default(),
        }
    }
}

pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("ghcnd"))
        .unwrap_or_else(|| PathBuf::from(".ghcnd-cache"))
}

impl Config {
    /// Defaults overridden by any `GHCND_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env(|key| env::var(key).ok())
    }

    fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            debug!("{} overrides base url", ENV_BASE_URL);
            self.base_url = url;
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            debug!("{} overrides cache dir", ENV_CACHE_DIR);
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().map_err(|_| GhcndError::Configuration {
                message: format!("{} must be a whole number of seconds, got `{}`", ENV_TIMEOUT_SECS, secs),
            })?;
            self.timeout = Duration::from_secs(secs);
        }

        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_climatology(mut self, climatology: ClimatologyWindow) -> Self {
        self.climatology = climatology;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(GhcndError::Configuration {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        if self.climatology.first_year > self.climatology.last_year {
            return Err(GhcndError::Configuration {
                message: format!(
                    "climatology window {}-{} is inverted",
                    self.climatology.first_year, self.climatology.last_year
                ),
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(GhcndError::Configuration {
                message: "base url is empty".to_string(),
            });
        }

        Ok(())
    }

    /// `{base_url}/{path}` with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = Config::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.climatology, ClimatologyWindow::new(1981, 2010));
        assert!(!config.refresh);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_apply_environment() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://localhost:8080/ghcn/"),
            (ENV_CACHE_DIR, "/tmp/ghcnd"),
            (ENV_TIMEOUT_SECS, "5"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("/tmp/ghcnd"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.url("all/USW00094728.dly"), "http://localhost:8080/ghcn/all/USW00094728.dly");
    }

    #[test]
    fn should_reject_bad_timeout_env() {
        let result = Config::default().apply_env(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn should_validate() {
        assert!(Config::default().with_timeout(Duration::ZERO).validate().is_err());
        assert!(Config::default()
            .with_climatology(ClimatologyWindow::new(2010, 1981))
            .validate()
            .is_err());
        assert!(Config::default().with_base_url("").validate().is_err());
    }
}
