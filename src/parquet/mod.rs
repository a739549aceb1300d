//! Handles serialising and saving data to disk in the _parquet_ file format.

pub mod daily;
pub mod inventory;
pub mod stations;

pub use daily::{save_daily, save_year_records};
pub use inventory::save_inventory;
pub use stations::save_stations;
