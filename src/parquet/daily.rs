//! Save a station grid to a parquet file in long format.

use std::{fs::File, path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, Date32Builder, Float32Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use parquet::{
    arrow::ArrowWriter,
    basic::{Compression, ZstdLevel},
    file::properties::WriterProperties,
};
use tracing::info;

use crate::{
    error::Result,
    grid::DailyValueGrid,
    reading::{Element, YearRecord},
};

const CHUNK_SIZE: usize = 100_000;

fn daily_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("element", DataType::Utf8, false),
        Field::new("value", DataType::Float32, false),
    ]))
}

struct DailyBuilders {
    id: StringBuilder,
    date: Date32Builder,
    element: StringBuilder,
    value: Float32Builder,
    rows: usize,
}

impl DailyBuilders {
    fn new() -> Self {
        DailyBuilders {
            id: StringBuilder::with_capacity(CHUNK_SIZE, CHUNK_SIZE * 11),
            date: Date32Builder::with_capacity(CHUNK_SIZE),
            element: StringBuilder::with_capacity(CHUNK_SIZE, CHUNK_SIZE * 4),
            value: Float32Builder::with_capacity(CHUNK_SIZE),
            rows: 0,
        }
    }

    fn append(&mut self, id: &str, date32: i32, element: Element, value: f32) {
        self.id.append_value(id);
        self.date.append_value(date32);
        self.element.append_value(element.code());
        self.value.append_value(value);
        self.rows += 1;
    }

    fn write(&mut self, writer: &mut ArrowWriter<File>, schema: &Arc<Schema>) -> Result<()> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.id.finish()),
            Arc::new(self.date.finish()),
            Arc::new(self.element.finish()),
            Arc::new(self.value.finish()),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        writer.write(&batch)?;
        self.rows = 0;

        Ok(())
    }
}

fn daily_writer(file_path: &Path, schema: &Arc<Schema>) -> Result<ArrowWriter<File>> {
    let file = File::create(file_path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .set_dictionary_enabled(true)
        .build();

    Ok(ArrowWriter::try_new(file, schema.clone(), Some(props))?)
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch_offset = NaiveDate::from_ymd_opt(1970, 1, 1)
        .map(|d| d.num_days_from_ce())
        .unwrap_or(719_163);

    date.num_days_from_ce() - epoch_offset
}

/// Writes one row per valid grid cell: `id, date, element, value`.
pub fn save_daily(grid: &DailyValueGrid, file_path: &Path) -> Result<usize> {
    let schema = daily_schema();
    let mut writer = daily_writer(file_path, &schema)?;

    let mut builders = DailyBuilders::new();
    let mut total_rows = 0;

    for (year, month, day) in grid.dates() {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let date32 = days_since_epoch(date);

        for element in Element::ALL {
            if let Some(value) = grid.get(year, month, day, element) {
                builders.append(grid.station_id(), date32, element, value);
                total_rows += 1;
            }
        }

        if builders.rows >= CHUNK_SIZE {
            builders.write(&mut writer, &schema)?;
        }
    }

    if builders.rows > 0 {
        builders.write(&mut writer, &schema)?;
    }

    writer.close()?;
    info!("Wrote {} rows to {}", total_rows, file_path.display());

    Ok(total_rows)
}

/// Writes the valid rows of a yearly file in the same long format as
/// [`save_daily`], so both can be read with one schema.
pub fn save_year_records(records: &[YearRecord], file_path: &Path) -> Result<usize> {
    let schema = daily_schema();
    let mut writer = daily_writer(file_path, &schema)?;

    let mut builders = DailyBuilders::new();
    let mut total_rows = 0;

    for record in records {
        let Some(decoded) = record.decoded() else {
            continue;
        };
        builders.append(&record.id, days_since_epoch(record.date), decoded.element, decoded.value);
        total_rows += 1;

        if builders.rows >= CHUNK_SIZE {
            builders.write(&mut writer, &schema)?;
        }
    }

    if builders.rows > 0 {
        builders.write(&mut writer, &schema)?;
    }

    writer.close()?;
    info!("Wrote {} rows to {}", total_rows, file_path.display());

    Ok(total_rows)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::fs;

    use arrow::array::{Array, Date32Array, Float32Array, StringArray};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn should_write_long_format() {
        let mut grid = DailyValueGrid::new("USW00094728", 1970, 1971);
        grid.set(1970, 1, 2, Element::Tmax, 5.0);
        grid.set(1970, 1, 2, Element::Prcp, 0.0);
        grid.set(1971, 12, 31, Element::Snow, 25.0);

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path().to_path_buf();
        assert_eq!(save_daily(&grid, &temp_path).unwrap(), 3);

        let file = fs::File::open(&temp_path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();

        let mut total_rows = 0;
        for batch_result in reader {
            let batch = batch_result.unwrap();
            total_rows += batch.num_rows();

            let schema = batch.schema();
            assert_eq!(schema.fields().len(), 4);
            assert_eq!(schema.field(0).name(), "id");
            assert_eq!(schema.field(1).name(), "date");
            assert_eq!(schema.field(2).name(), "element");
            assert_eq!(schema.field(3).name(), "value");

            let dates = batch.column(1).as_any().downcast_ref::<Date32Array>().unwrap();
            let elements = batch.column(2).as_any().downcast_ref::<StringArray>().unwrap();
            let values = batch.column(3).as_any().downcast_ref::<Float32Array>().unwrap();

            assert_eq!(values.null_count(), 0);
            assert_eq!(dates.value(0), 1);
            assert_eq!(elements.value(0), "TMAX");
            assert_eq!(elements.value(1), "PRCP");
            assert_eq!(values.value(1), 0.0);
            assert_eq!(elements.value(2), "SNOW");
            assert_eq!(values.value(2), 25.0);
        }

        assert_eq!(total_rows, 3);
    }

    #[test]
    fn should_write_valid_year_records() {
        let lines = [
            "USW00094728,20230101,TMAX,144,,,W,2400",
            "USW00094728,20230101,PRCP,3000,,X,W,",
            "USC00305801,20230102,SNOW,25,,,7,0700",
        ];
        let records = crate::reading::parse_year_records(&lines, &crate::reading::ElementSet::all(), &[]).unwrap();

        let temp_file = NamedTempFile::new().unwrap();
        assert_eq!(save_year_records(&records, temp_file.path()).unwrap(), 2);

        let file = fs::File::open(temp_file.path()).unwrap();
        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batch = reader.next().unwrap().unwrap();

        let ids = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        let dates = batch.column(1).as_any().downcast_ref::<Date32Array>().unwrap();
        let values = batch.column(3).as_any().downcast_ref::<Float32Array>().unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(ids.value(1), "USC00305801");
        assert_eq!(dates.value(0), 19358);
        assert_eq!(values.value(0), 14.4);
        assert_eq!(values.value(1), 25.0);
    }

    #[test]
    fn should_write_empty_grid() {
        let grid = DailyValueGrid::empty("USW00094728");
        let temp_file = NamedTempFile::new().unwrap();

        assert_eq!(save_daily(&grid, temp_file.path()).unwrap(), 0);
    }
}
