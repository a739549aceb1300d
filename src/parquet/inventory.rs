//! Save the element inventory to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use tracing::info;

use crate::{error::Result, reading::InventoryRow};

pub fn save_inventory(rows: &[InventoryRow], file_path: &Path) -> Result<()> {
    let num_rows = rows.len();

    let mut ids = Vec::with_capacity(num_rows);
    let mut latitudes = Vec::with_capacity(num_rows);
    let mut longitudes = Vec::with_capacity(num_rows);
    let mut elements = Vec::with_capacity(num_rows);
    let mut first_years = Vec::with_capacity(num_rows);
    let mut last_years = Vec::with_capacity(num_rows);

    for row in rows {
        ids.push(row.id.clone());
        latitudes.push(row.latitude);
        longitudes.push(row.longitude);
        elements.push(row.element.clone());
        first_years.push(row.first_year);
        last_years.push(row.last_year);
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("id", Arc::new(StringArray::from(ids))),
        ("latitude", Arc::new(Float64Array::from(latitudes))),
        ("longitude", Arc::new(Float64Array::from(longitudes))),
        ("element", Arc::new(StringArray::from(elements))),
        ("first_year", Arc::new(Int32Array::from(first_years))),
        ("last_year", Arc::new(Int32Array::from(last_years))),
    ];
    let batch = RecordBatch::try_from_iter(columns)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_dictionary_enabled(true)
        .build();

    let file = File::create(file_path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    info!("Wrote {} inventory rows to {}", num_rows, file_path.display());

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::fs;

    use arrow::array::Array;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::reading::parse_inventory;

    #[test]
    fn should_save_inventory() {
        let rows = parse_inventory(&[
            "USW00094728  40.7789  -73.9692 TMAX 1869 2024",
            "USW00094728  40.7789  -73.9692 WT16 1948 1978",
        ]);

        let temp_file = NamedTempFile::new().unwrap();
        save_inventory(&rows, temp_file.path()).unwrap();

        let file = fs::File::open(temp_file.path()).unwrap();
        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batch = reader.next().unwrap().unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);

        let elements = batch.column(3).as_any().downcast_ref::<StringArray>().unwrap();
        let last_years = batch.column(5).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(elements.value(1), "WT16");
        assert_eq!(last_years.value(0), 2024);
    }
}
