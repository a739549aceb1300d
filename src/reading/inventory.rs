//! Element coverage from `ghcnd-inventory.txt`: one row per station and
//! element giving the first and last year with data.
//!
//! See "GHCN-Daily readme.txt Section VII" for format.

use tracing::warn;

use crate::error::{GhcndError, Result};

use super::station::{column, parse_f64, parse_str};

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Raw element code; the inventory lists elements this crate does not decode
    pub element: String,
    pub first_year: i32,
    pub last_year: i32,
}

impl InventoryRow {
    pub fn from_line(line: &str) -> Result<Self> {
        let id = parse_str(column(line, 0, 11)).ok_or_else(|| GhcndError::malformed(line, "missing station id"))?;
        let latitude = parse_f64(column(line, 12, 20))
            .ok_or_else(|| GhcndError::malformed(line, "unparseable latitude"))?;
        let longitude = parse_f64(column(line, 21, 30))
            .ok_or_else(|| GhcndError::malformed(line, "unparseable longitude"))?;
        let element = parse_str(column(line, 31, 35)).ok_or_else(|| GhcndError::malformed(line, "missing element"))?;
        let first_year = parse_year(line, 36, 40, "first year")?;
        let last_year = parse_year(line, 41, 45, "last year")?;

        if first_year > last_year {
            return Err(GhcndError::malformed(
                line,
                format!("first year {} after last year {}", first_year, last_year),
            ));
        }

        Ok(InventoryRow {
            id,
            latitude,
            longitude,
            element,
            first_year,
            last_year,
        })
    }

    pub fn num_years(&self) -> i32 {
        self.last_year - self.first_year + 1
    }
}

/// Parses every row, skipping (and logging) rows that cannot be read.
pub fn parse_inventory<S: AsRef<str>>(lines: &[S]) -> Vec<InventoryRow> {
    let mut rows = Vec::with_capacity(lines.len());

    for line in lines.iter().map(AsRef::as_ref) {
        if line.trim().is_empty() {
            continue;
        }
        match InventoryRow::from_line(line) {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Skipping inventory row: {}", e),
        }
    }

    rows
}

/// The rows for one station, in file order.
pub fn station_inventory<S: AsRef<str>>(lines: &[S], station_id: &str) -> Result<Vec<InventoryRow>> {
    let rows: Vec<InventoryRow> = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| column(line, 0, 11).trim() == station_id)
        .map(InventoryRow::from_line)
        .collect::<Result<_>>()?;

    if rows.is_empty() {
        return Err(GhcndError::NotFound {
            station_id: station_id.to_string(),
        });
    }

    Ok(rows)
}

fn parse_year(line: &str, start: usize, end: usize, name: &str) -> Result<i32> {
    column(line, start, end)
        .trim()
        .parse::<i32>()
        .map_err(|_| GhcndError::malformed(line, format!("unparseable {}", name)))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TMAX: &str = "USW00094728  40.7789  -73.9692 TMAX 1869 2024";
    const SNOW: &str = "USW00094728  40.7789  -73.9692 SNOW 1869 2024";
    const OTHER: &str = "ACW00011604  17.1167  -61.7833 WT16 1961 1966";

    #[test]
    fn should_process_line() {
        let row = InventoryRow::from_line(TMAX).unwrap();

        assert_eq!(row.id, "USW00094728");
        assert_eq!(row.latitude, 40.7789);
        assert_eq!(row.longitude, -73.9692);
        assert_eq!(row.element, "TMAX");
        assert_eq!(row.first_year, 1869);
        assert_eq!(row.last_year, 2024);
        assert_eq!(row.num_years(), 156);
    }

    #[test]
    fn should_keep_unknown_elements() {
        let row = InventoryRow::from_line(OTHER).unwrap();
        assert_eq!(row.element, "WT16");
    }

    #[test]
    fn should_reject_bad_years() {
        let err = InventoryRow::from_line("USW00094728  40.7789  -73.9692 TMAX 18x9 2024").unwrap_err();
        assert!(matches!(err, GhcndError::MalformedRecord { .. }));

        assert!(InventoryRow::from_line("USW00094728  40.7789  -73.9692 TMAX 2024 1869").is_err());
        assert!(InventoryRow::from_line("USW00094728  40.7789  -73.9692 TMAX").is_err());
    }

    #[test]
    fn should_skip_malformed_rows() {
        let lines = vec![TMAX, "", "USW00094728  north", OTHER];
        let rows = parse_inventory(&lines);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "ACW00011604");
    }

    #[test]
    fn should_select_station_rows() {
        let lines = vec![OTHER, TMAX, SNOW];

        let rows = station_inventory(&lines, "USW00094728").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].element, "SNOW");

        let err = station_inventory(&lines, "USC00000001").unwrap_err();
        assert!(matches!(err, GhcndError::NotFound { .. }));
    }
}
