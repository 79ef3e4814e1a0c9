// src/frame/parquet.rs
use ::parquet::arrow::ArrowWriter;
use ::parquet::basic::Compression;
use ::parquet::file::properties::WriterProperties;
use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Date32Array, Float64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use std::{fs, fs::File, path::Path, sync::Arc};
use tracing::debug;

use super::csv::tmp_sibling;
use super::SeriesFrame;

/// Arrow layout of a frame: `date: Date32` followed by nullable `Float64` columns.
pub fn frame_schema(frame: &SeriesFrame) -> Schema {
    let mut fields = Vec::with_capacity(frame.columns.len() + 1);
    fields.push(Field::new("date", DataType::Date32, false));
    for col in &frame.columns {
        fields.push(Field::new(&col.name, DataType::Float64, true));
    }
    Schema::new(fields)
}

pub fn to_record_batch(frame: &SeriesFrame) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("unix epoch")?;
    let days: Vec<i32> = frame
        .dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(frame.columns.len() + 1);
    arrays.push(Arc::new(Date32Array::from(days)));
    for col in &frame.columns {
        arrays.push(Arc::new(Float64Array::from(col.values.clone())));
    }

    RecordBatch::try_new(Arc::new(frame_schema(frame)), arrays)
        .with_context(|| format!("building record batch for {}", frame.source))
}

/// Write `frame` as a single-row-group Parquet file, via tmp file + rename.
pub fn write_parquet(frame: &SeriesFrame, path: &Path) -> Result<()> {
    let batch = to_record_batch(frame)?;
    let tmp_path = tmp_sibling(path);

    let file = File::create(&tmp_path)
        .with_context(|| format!("creating parquet file {:?}", &tmp_path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let written = (|| -> Result<()> {
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .context("creating Arrow writer for panel")?;
        writer.write(&batch).context("writing panel batch")?;
        writer.close().context("closing panel writer")?;
        Ok(())
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    debug!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use arrow::array::Array;
    use tempfile::tempdir;

    #[test]
    fn panel_round_trips_through_parquet() -> Result<()> {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let mut frame = SeriesFrame::new("features_merged", vec![d(1), d(2)]);
        frame.push_column("cpi_yoy", vec![Some(2.5), None]);

        let dir = tempdir()?;
        let path = dir.path().join("features_merged.parquet");
        write_parquet(&frame, &path)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>()?;
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(1).name(), "cpi_yoy");

        let dates = batch.column(0).as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(dates.value_as_date(1), Some(d(2)));
        let cpi = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(cpi.value(0), 2.5);
        assert!(cpi.is_null(1));
        Ok(())
    }
}
