// src/frame/csv.rs
use chrono::NaiveDate;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::SeriesFrame;
use crate::error::{ExtractError, ExtractResult};
use crate::process::date_parser::parse_datetime_text;
use crate::process::utils::parse_number;

const DATE_COLUMN: &str = "date";

/// Write `frame` as `date,<columns...>`, one row per date.
///
/// The file is written to a hidden sibling first and renamed over `path` once
/// it is complete, so a failure never leaves a truncated artifact behind.
pub fn write_csv(frame: &SeriesFrame, path: &Path) -> ExtractResult<()> {
    let tmp_path = tmp_sibling(path);
    let result = write_rows(frame, &tmp_path).and_then(|()| {
        fs::rename(&tmp_path, path)?;
        Ok(())
    });
    if result.is_err() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            debug!(path = %tmp_path.display(), "tmp cleanup: {}", e);
        }
    }
    result?;
    debug!(path = %path.display(), rows = frame.len(), "wrote csv");
    Ok(())
}

fn write_rows(frame: &SeriesFrame, path: &Path) -> ExtractResult<()> {
    let mut wtr = ::csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(frame.columns.len() + 1);
    header.push(DATE_COLUMN);
    header.extend(frame.column_names());
    wtr.write_record(&header)?;

    for (row, date) in frame.dates.iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.format("%Y-%m-%d").to_string());
        for col in &frame.columns {
            record.push(format_value(col.values[row]));
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Shortest round-trip decimal; absent values are empty cells.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Read a `date,<columns...>` CSV back into a frame.
///
/// Empty or non-numeric cells read as absent; a date that cannot be parsed is
/// an error.
pub fn read_csv(path: &Path, source: &str) -> ExtractResult<SeriesFrame> {
    let mut rdr = ::csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();

    let date_idx = headers
        .iter()
        .position(|h| h.trim() == DATE_COLUMN)
        .ok_or_else(|| ExtractError::missing_column(DATE_COLUMN, path.display().to_string()))?;
    let value_idx: Vec<usize> = (0..headers.len()).filter(|&i| i != date_idx).collect();

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); value_idx.len()];
    for record in rdr.records() {
        let record = record?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_datetime_text(raw_date)
            .map(|dt| dt.date())
            .ok_or_else(|| ExtractError::UnparseableDate {
                raw: raw_date.to_string(),
            })?;
        dates.push(date);
        for (slot, &i) in columns.iter_mut().zip(&value_idx) {
            slot.push(record.get(i).and_then(parse_number));
        }
    }

    let mut frame = SeriesFrame::new(source, dates);
    for (values, &i) in columns.into_iter().zip(&value_idx) {
        frame.push_column(headers.get(i).unwrap_or_default().trim(), values);
    }
    if frame.is_empty() {
        warn!(path = %path.display(), "csv has no rows");
    }
    Ok(frame)
}

/// `dir/name.csv` → `dir/.name.csv.tmp`
pub fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
