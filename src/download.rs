//! Fetches station files and metadata from the GHCN-Daily archive through a
//! local on-disk cache.

use std::{
    fmt::Display,
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use futures::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{
    cli::create_spinner,
    config::Config,
    error::{GhcndError, Result},
};

pub const STATIONS_FILE: &str = "ghcnd-stations.txt";
pub const VERSION_FILE: &str = "ghcnd-version.txt";
pub const INVENTORY_FILE: &str = "ghcnd-inventory.txt";

/// Where the core gets its raw text from.
#[allow(async_fn_in_trait)]
pub trait StationSource {
    /// The `.dly` lines for one station.
    async fn fetch_station_file(&self, station_id: &str) -> Result<Vec<String>>;

    /// The rows of `ghcnd-stations.txt`.
    async fn fetch_station_metadata(&self) -> Result<Vec<String>>;

    /// The archive version string from `ghcnd-version.txt`.
    async fn fetch_version(&self) -> Result<String>;

    /// The rows of `ghcnd-inventory.txt`.
    async fn fetch_inventory(&self) -> Result<Vec<String>>;

    /// The decompressed rows of `by_year/{year}.csv.gz`.
    async fn fetch_year_file(&self, year: i32) -> Result<Vec<String>>;
}

/// The remote archive, cached under `config.cache_dir`.
pub struct Archive {
    config: Config,
    client: Client,
}

impl Archive {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Archive { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn station_url(&self, station_id: &str) -> String {
        self.config.url(&format!("all/{}.dly", station_id))
    }

    pub fn year_url(&self, year: i32) -> String {
        self.config.url(&format!("by_year/{}.csv.gz", year))
    }

    /// Returns the cached copy of `url` at `file_name`, downloading it first
    /// when absent or when a refresh was requested. A failed download falls
    /// back to a stale cached copy if there is one.
    pub async fn fetch_cached(&self, url: &str, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.cache_dir)?;
        let file_path = self.config.cache_dir.join(file_name);

        if file_path.exists() && !self.config.refresh {
            debug!("Using cached {}", file_path.display());
            return Ok(file_path);
        }

        let bar = create_spinner(format!("Downloading {}...", file_name));
        match download_with_progress(&self.client, url, &file_path, bar.clone()).await {
            Ok(bytes) => {
                bar.finish_with_message(format!("{} downloaded", file_name));
                info!("Downloaded {} ({} bytes)", url, bytes);
            }
            Err(e) if file_path.exists() => {
                bar.abandon_with_message(format!("{} download failed", file_name));
                warn!("{}; using cached copy at {}", e, file_path.display());
            }
            Err(e) => {
                bar.abandon_with_message(format!("{} download failed", file_name));
                return Err(e);
            }
        }

        if !file_path.exists() {
            return Err(GhcndError::MissingLocalFile { path: file_path });
        }

        Ok(file_path)
    }
}

impl StationSource for Archive {
    async fn fetch_station_file(&self, station_id: &str) -> Result<Vec<String>> {
        validate_station_id(station_id)?;
        let url = self.station_url(station_id);
        let path = self.fetch_cached(&url, &format!("{}.dly", station_id)).await?;

        read_lines(&path)
    }

    async fn fetch_station_metadata(&self) -> Result<Vec<String>> {
        let url = self.config.url(STATIONS_FILE);
        let path = self.fetch_cached(&url, STATIONS_FILE).await?;

        read_lines(&path)
    }

    async fn fetch_version(&self) -> Result<String> {
        let url = self.config.url(VERSION_FILE);
        let path = self.fetch_cached(&url, VERSION_FILE).await?;

        Ok(read_lines(&path)?.join(" ").trim().to_string())
    }

    async fn fetch_inventory(&self) -> Result<Vec<String>> {
        let url = self.config.url(INVENTORY_FILE);
        let path = self.fetch_cached(&url, INVENTORY_FILE).await?;

        read_lines(&path)
    }

    async fn fetch_year_file(&self, year: i32) -> Result<Vec<String>> {
        validate_year(year)?;
        let url = self.year_url(year);
        let path = self.fetch_cached(&url, &format!("{}.csv.gz", year)).await?;

        read_gz_lines(&path)
    }
}

/// Station ids are eleven ASCII letters and digits.
pub fn validate_station_id(station_id: &str) -> Result<()> {
    if station_id.len() == 11 && station_id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(GhcndError::InvalidStationId {
            station_id: station_id.to_string(),
        })
    }
}

/// The archive's yearly files start in 1750.
pub fn validate_year(year: i32) -> Result<()> {
    if (1750..=9999).contains(&year) {
        Ok(())
    } else {
        Err(GhcndError::Configuration {
            message: format!("year {} outside the archive's range", year),
        })
    }
}

/// Streams `url` into `file_path`, converting the spinner to a byte progress
/// bar when the size is known. Writes to a `.part` file first so an aborted
/// download never replaces a good cached copy.
pub async fn download_with_progress(
    client: &Client,
    url: &str,
    file_path: &Path,
    progress_bar: ProgressBar,
) -> Result<u64> {
    let fetch_error = |reason: String| GhcndError::RemoteFetch {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!("status {}", response.status())));
    }

    let total_size = response.content_length().unwrap_or(0);
    if total_size > 0 {
        progress_bar.set_length(total_size);
        if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}") {
            progress_bar.set_style(style.progress_chars("=> "));
        }
    }

    let downloaded = save_stream(response.bytes_stream(), file_path, &progress_bar)
        .await
        .map_err(|e| match e {
            GhcndError::RemoteFetch { reason, .. } => fetch_error(reason),
            other => other,
        })?;

    Ok(downloaded)
}

/// Writes `stream` to `file_path` through a sibling `.part` file. The part file
/// is removed if any chunk or write fails, leaving `file_path` untouched.
pub async fn save_stream<S, B, E>(stream: S, file_path: &Path, progress_bar: &ProgressBar) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let part_path = file_path.with_extension("part");

    match write_part(stream, &part_path, progress_bar).await {
        Ok(downloaded) => {
            fs::rename(&part_path, file_path)?;
            Ok(downloaded)
        }
        Err(e) => {
            if let Err(remove_error) = fs::remove_file(&part_path) {
                debug!("Could not remove {}: {}", part_path.display(), remove_error);
            }
            Err(e)
        }
    }
}

async fn write_part<S, B, E>(stream: S, part_path: &Path, progress_bar: &ProgressBar) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut file = File::create(part_path)?;
    let mut downloaded = 0u64;
    let mut stream = std::pin::pin!(stream);

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| GhcndError::RemoteFetch {
            url: part_path.display().to_string(),
            reason: format!("error reading chunk: {}", e),
        })?;
        let chunk = chunk.as_ref();
        file.write_all(chunk)?;
        downloaded += chunk.len() as u64;
        progress_bar.set_position(downloaded);
    }
    file.flush()?;

    Ok(downloaded)
}

/// Reads a text file into lines.
pub fn read_lines(file_path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(file_path).map_err(|e| missing_or_io(file_path, e))?;

    Ok(split_lines(&bytes))
}

/// Reads a gzip-compressed text file into lines.
pub fn read_gz_lines(file_path: &Path) -> Result<Vec<String>> {
    let file = File::open(file_path).map_err(|e| missing_or_io(file_path, e))?;
    let mut bytes = Vec::new();
    GzDecoder::new(file).read_to_end(&mut bytes)?;

    Ok(split_lines(&bytes))
}

/// Splits on `\n`, dropping any `\r`. A line that is not valid UTF-8 is kept
/// byte for byte as Latin-1 so decoders can report the offending byte.
pub fn split_lines(bytes: &[u8]) -> Vec<String> {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    if bytes.is_empty() {
        return Vec::new();
    }

    bytes
        .split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match std::str::from_utf8(line) {
                Ok(text) => text.to_string(),
                Err(_) => line.iter().map(|&b| b as char).collect(),
            }
        })
        .collect()
}

fn missing_or_io(file_path: &Path, e: std::io::Error) -> GhcndError {
    match e.kind() {
        std::io::ErrorKind::NotFound => GhcndError::MissingLocalFile {
            path: file_path.to_path_buf(),
        },
        _ => GhcndError::Io(e),
    }
}

// -- Tests -------------------------------------------------------------------
