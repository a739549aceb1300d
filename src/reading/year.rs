//! Decoder for the rows of a `by_year/{year}.csv.gz` file: one value per line as
//! `ID,YYYYMMDD,ELEMENT,VALUE,MFLAG,QFLAG,SFLAG,OBSTIME`.
//!
//! See "GHCN-Daily by_year readme" for format.

use chrono::{Datelike, NaiveDate};

use crate::{
    error::{GhcndError, Result},
    reading::{DaySlot, DecodedValue, Element, ElementSet},
};

const NUM_FIELDS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct YearRecord {
    pub id: String,
    pub date: NaiveDate,
    pub element: Element,
    /// Raw value and flags, as they would appear in a `.dly` slot
    pub slot: DaySlot,
    /// Observation time as HHMM, when reported
    pub obs_time: Option<String>,
}

impl YearRecord {
    /// Decodes a row, returning `Ok(None)` for blank rows or elements outside
    /// `elements`.
    pub fn from_line(line: &str, elements: &ElementSet) -> Result<Option<Self>> {
        let line = line.trim_end();
        if line.is_empty() {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != NUM_FIELDS {
            return Err(GhcndError::malformed(
                line,
                format!("expected {} fields, found {}", NUM_FIELDS, fields.len()),
            ));
        }

        let Some(element) = elements.recognise(fields[2]) else {
            return Ok(None);
        };

        let id = fields[0].trim();
        if id.is_empty() {
            return Err(GhcndError::malformed(line, "missing station id"));
        }
        let date = NaiveDate::parse_from_str(fields[1], "%Y%m%d")
            .map_err(|_| GhcndError::malformed(line, format!("bad date `{}`", fields[1])))?;
        let value = fields[3]
            .trim()
            .parse::<i32>()
            .map_err(|_| GhcndError::malformed(line, format!("unparseable value `{}`", fields[3])))?;

        let slot = DaySlot {
            value,
            mflag: flag(line, fields[4])?,
            qflag: flag(line, fields[5])?,
            sflag: flag(line, fields[6])?,
        };
        let obs_time = Some(fields[7].trim())
            .filter(|time| !time.is_empty())
            .map(str::to_string);

        Ok(Some(YearRecord {
            id: id.to_string(),
            date,
            element,
            slot,
            obs_time,
        }))
    }

    pub fn is_valid(&self) -> bool {
        self.slot.is_valid()
    }

    /// The value in physical units, if the row counts.
    pub fn decoded(&self) -> Option<DecodedValue> {
        self.is_valid().then(|| DecodedValue {
            year: self.date.year(),
            month: self.date.month(),
            day: self.date.day(),
            element: self.element,
            value: self.slot.scaled(self.element),
        })
    }
}

/// Decodes every row, keeping only `station_ids` when it is not empty.
pub fn parse_year_records<S: AsRef<str>>(
    lines: &[S],
    elements: &ElementSet,
    station_ids: &[String],
) -> Result<Vec<YearRecord>> {
    let mut records = Vec::new();

    for line in lines.iter().map(AsRef::as_ref) {
        if !station_ids.is_empty() {
            let id = line.split(',').next().unwrap_or("");
            if !station_ids.iter().any(|wanted| wanted == id) {
                continue;
            }
        }
        if let Some(record) = YearRecord::from_line(line, elements)? {
            records.push(record);
        }
    }

    Ok(records)
}

/// An empty flag field is a blank, like the space in a `.dly` slot.
fn flag(line: &str, field: &str) -> Result<char> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(' '),
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(GhcndError::malformed(line, format!("bad flag `{}`", field))),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TMAX: &str = "USW00094728,20230101,TMAX,144,,,W,2400";

    #[test]
    fn should_process_line() {
        let record = YearRecord::from_line(TMAX, &ElementSet::all()).unwrap().unwrap();

        assert_eq!(record.id, "USW00094728");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(record.element, Element::Tmax);
        assert_eq!(record.slot.value, 144);
        assert_eq!(record.slot.mflag, ' ');
        assert_eq!(record.slot.sflag, 'W');
        assert_eq!(record.obs_time, Some("2400".to_string()));

        let decoded = record.decoded().unwrap();
        assert_eq!((decoded.month, decoded.day), (1, 1));
        assert_eq!(decoded.value, 14.4);
    }

    #[test]
    fn should_skip_quality_flagged_values() {
        let line = "USW00094728,20230102,PRCP,3000,,X,W,";
        let record = YearRecord::from_line(line, &ElementSet::all()).unwrap().unwrap();

        assert!(!record.is_valid());
        assert!(record.decoded().is_none());
        assert_eq!(record.obs_time, None);
    }

    #[test]
    fn should_skip_unknown_elements() {
        let line = "USW00094728,20230101,AWND,31,,,W,";
        assert!(YearRecord::from_line(line, &ElementSet::all()).unwrap().is_none());
        assert!(YearRecord::from_line("", &ElementSet::all()).unwrap().is_none());
    }

    #[test]
    fn should_reject_malformed_rows() {
        for line in [
            "USW00094728,20230101,TMAX,144",
            "USW00094728,20230230,TMAX,144,,,W,",
            "USW00094728,20230101,TMAX,1x4,,,W,",
            "USW00094728,20230101,TMAX,144,,XY,W,",
        ] {
            let err = YearRecord::from_line(line, &ElementSet::all()).unwrap_err();
            assert!(matches!(err, GhcndError::MalformedRecord { .. }), "{}", line);
        }
    }

    #[test]
    fn should_filter_by_station() {
        let lines = vec![
            TMAX,
            "USC00305801,20230101,TMAX,122,,,7,0700",
            "USW00094728,20230101,SNOW,0,,,W,",
        ];

        let all = parse_year_records(&lines, &ElementSet::all(), &[]).unwrap();
        assert_eq!(all.len(), 3);

        let wanted = vec!["USW00094728".to_string()];
        let central_park = parse_year_records(&lines, &ElementSet::all(), &wanted).unwrap();
        assert_eq!(central_park.len(), 2);
        assert_eq!(central_park[1].element, Element::Snow);
    }
}
