//! Writes a station grid as one CSV row per date with any data.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::info;

use crate::{
    error::Result,
    grid::DailyValueGrid,
    reading::Element,
};

pub const CSV_HEADER: &str = "YYYY,MM,DD,TMAX,TMIN,PRCP,SNOW,SNWD";

/// Writes the header and one row per date holding at least one element.
/// Missing elements on an included row are written as `-9999.0`.
pub fn write_csv<W: Write>(grid: &DailyValueGrid, mut writer: W) -> Result<usize> {
    writeln!(writer, "{}", CSV_HEADER)?;

    let mut rows = 0;
    for (year, month, day) in grid.dates() {
        if !grid.has_any(year, month, day) {
            continue;
        }

        write!(writer, "{:04},{:02},{:02}", year, month, day)?;
        for element in Element::ALL {
            write!(writer, ",{:7.1}", grid.get_or_missing(year, month, day, element))?;
        }
        writeln!(writer)?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

pub fn save_csv(grid: &DailyValueGrid, file_path: &Path) -> Result<usize> {
    let file = File::create(file_path)?;
    let rows = write_csv(grid, BufWriter::new(file))?;
    info!("Wrote {} rows to {}", rows, file_path.display());

    Ok(rows)
}

// -- Tests -------------------------------------------------------------------
