//! Save the station metadata to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use tracing::info;

use crate::{error::Result, reading::StationMetadata};

pub fn save_stations(stations: &[StationMetadata], file_path: &Path) -> Result<()> {
    let num_rows = stations.len();

    let mut ids = Vec::with_capacity(num_rows);
    let mut latitudes = Vec::with_capacity(num_rows);
    let mut longitudes = Vec::with_capacity(num_rows);
    let mut elevations = Vec::with_capacity(num_rows);
    let mut states = Vec::with_capacity(num_rows);
    let mut names = Vec::with_capacity(num_rows);
    let mut gsn_flags = Vec::with_capacity(num_rows);
    let mut wmo_ids = Vec::with_capacity(num_rows);

    for s in stations {
        ids.push(s.id.clone());
        latitudes.push(s.latitude);
        longitudes.push(s.longitude);
        elevations.push(s.elevation);
        states.push(s.state.clone());
        names.push(s.name.clone());
        gsn_flags.push(s.gsn_flag.clone());
        wmo_ids.push(s.wmo_id.clone());
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("id", Arc::new(StringArray::from(ids))),
        ("latitude", Arc::new(Float64Array::from(latitudes))),
        ("longitude", Arc::new(Float64Array::from(longitudes))),
        ("elevation", Arc::new(Float64Array::from(elevations))),
        ("state", Arc::new(StringArray::from(states))),
        ("name", Arc::new(StringArray::from(names))),
        ("gsn_flag", Arc::new(StringArray::from(gsn_flags))),
        ("wmo_id", Arc::new(StringArray::from(wmo_ids))),
    ];
    let batch = RecordBatch::try_from_iter(columns)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(file_path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    info!("Wrote {} stations to {}", num_rows, file_path.display());

    Ok(())
}

// -- Tests -------------------------------------------------------------------
