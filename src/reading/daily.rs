//! Decoder for one fixed-width `.dly` line: a station, year, month and element
//! followed by 31 eight-character day slots.
//!
//! See the GHCN-Daily readme section III for the format.

use tracing::warn;

use crate::{
    calendar::days_in_month,
    error::{GhcndError, Result},
    reading::{Element, ElementSet},
};

pub const DAYS_PER_LINE: usize = 31;
pub const SLOT_START: usize = 21;
pub const SLOT_WIDTH: usize = 8;
pub const MIN_LINE_LENGTH: usize = SLOT_START + DAYS_PER_LINE * SLOT_WIDTH;

/// Raw text of a missing day value.
pub const MISSING_VALUE_TEXT: &str = "-9999";
pub const MISSING_VALUE: i32 = -9999;

/// One day: a 5-character value followed by three single-character flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlot {
    pub value: i32,
    pub mflag: char,
    pub qflag: char,
    pub sflag: char,
}

impl DaySlot {
    /// Decodes an 8-character slot. `line` is only used for error context.
    pub fn decode(slot: &str, line: &str) -> Result<Self> {
        let bytes = slot.as_bytes();
        if bytes.len() != SLOT_WIDTH || !slot.is_ascii() {
            return Err(GhcndError::malformed(line, format!("bad day slot `{}`", slot)));
        }

        let value_text = &slot[..5];
        let value = if value_text == MISSING_VALUE_TEXT {
            MISSING_VALUE
        } else {
            value_text.trim().parse::<i32>().map_err(|_| {
                GhcndError::malformed(line, format!("unparseable day value `{}`", value_text))
            })?
        };

        Ok(DaySlot {
            value,
            mflag: bytes[5] as char,
            qflag: bytes[6] as char,
            sflag: bytes[7] as char,
        })
    }

    /// Re-creates the 8-character slot text.
    pub fn encode(&self) -> String {
        format!("{:>5}{}{}{}", self.value, self.mflag, self.qflag, self.sflag)
    }

    /// A day counts when its value is not the sentinel and the flag at slot
    /// offset 6 is blank. Values flagged there are left out of the grid.
    pub fn is_valid(&self) -> bool {
        self.value != MISSING_VALUE && self.qflag == ' '
    }

    pub fn scaled(&self, element: Element) -> f32 {
        self.value as f32 / element.divisor()
    }
}

/// A single decoded day of one element, in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedValue {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub element: Element,
    pub value: f32,
}

#[derive(Debug, Clone)]
pub struct DailyReading {
    pub id: String,
    pub year: i32,
    pub month: u32,
    pub element: Element,
    pub slots: [DaySlot; DAYS_PER_LINE],
}

impl DailyReading {
    /// Decodes a line, returning `Ok(None)` for lines that are too short or
    /// carry an element outside `elements`. Columns are byte offsets, so any
    /// non-ASCII character is a `MalformedRecord`.
    pub fn from_line(line: &str, elements: &ElementSet) -> Result<Option<Self>> {
        if let Some((column, c)) = line.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
            return Err(GhcndError::malformed(line, non_ascii_reason(column + 1, c)));
        }
        if line.len() < MIN_LINE_LENGTH {
            if !line.trim().is_empty() {
                warn!("Skipping short line ({} characters): `{}`", line.len(), line.trim_end());
            }
            return Ok(None);
        }

        let Some(element) = field(line, 17..21).and_then(|code| elements.recognise(code)) else {
            return Ok(None);
        };

        let id = field(line, 0..11)
            .ok_or_else(|| GhcndError::malformed(line, "bad station id"))?
            .to_string();
        let year = parse_field::<i32>(line, 11..15, "year")?;
        let month = parse_field::<u32>(line, 15..17, "month")?;
        if !(1..=12).contains(&month) {
            return Err(GhcndError::malformed(line, format!("month {} out of range", month)));
        }

        let mut slots = [DaySlot {
            value: MISSING_VALUE,
            mflag: ' ',
            qflag: ' ',
            sflag: ' ',
        }; DAYS_PER_LINE];
        for (i, slot) in slots.iter_mut().enumerate() {
            let start = SLOT_START + i * SLOT_WIDTH;
            let text = field(line, start..start + SLOT_WIDTH)
                .ok_or_else(|| GhcndError::malformed(line, format!("bad day slot {}", i + 1)))?;
            *slot = DaySlot::decode(text, line)?;
        }

        Ok(Some(DailyReading {
            id,
            year,
            month,
            element,
            slots,
        }))
    }

    /// Valid days of this reading that exist in the calendar, scaled to
    /// physical units.
    pub fn decoded(&self) -> impl Iterator<Item = DecodedValue> + '_ {
        let days = days_in_month(self.year, self.month).unwrap_or(0) as usize;

        self.slots
            .iter()
            .take(days)
            .enumerate()
            .filter(|(_, slot)| slot.is_valid())
            .map(move |(i, slot)| DecodedValue {
                year: self.year,
                month: self.month,
                day: i as u32 + 1,
                element: self.element,
                value: slot.scaled(self.element),
            })
    }
}

/// Decodes one line straight to its valid day values.
pub fn decode_line(line: &str, elements: &ElementSet) -> Result<Vec<DecodedValue>> {
    Ok(DailyReading::from_line(line, elements)?
        .map(|reading| reading.decoded().collect())
        .unwrap_or_default())
}

/// Lines that were not valid UTF-8 arrive byte for byte as Latin-1, so a
/// character below U+0100 is the raw byte.
fn non_ascii_reason(column: usize, c: char) -> String {
    match u8::try_from(u32::from(c)) {
        Ok(byte) => format!("non-ASCII byte 0x{:02X} at column {}", byte, column),
        Err(_) => format!("non-ASCII character U+{:04X} at column {}", u32::from(c), column),
    }
}

fn field(line: &str, range: std::ops::Range<usize>) -> Option<&str> {
    line.get(range)
}

fn parse_field<T: std::str::FromStr>(
    line: &str,
    range: std::ops::Range<usize>,
    name: &str,
) -> Result<T> {
    field(line, range)
        .and_then(|text| text.trim().parse::<T>().ok())
        .ok_or_else(|| GhcndError::malformed(line, format!("unparseable {}", name)))
}

// -- Tests ----------------------------------------------------------------------------
