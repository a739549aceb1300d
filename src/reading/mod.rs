//! Decoders for the GHCN-Daily text formats.

pub mod daily;
pub mod element;
pub mod inventory;
pub mod station;
pub mod year;

pub use daily::{decode_line, DailyReading, DaySlot, DecodedValue};
pub use element::{Element, ElementSet, ElementSpec, ELEMENTS, NUM_ELEMENTS};
pub use inventory::{parse_inventory, station_inventory, InventoryRow};
pub use station::{find_station, parse_stations, StationMetadata};
pub use year::{parse_year_records, YearRecord};
