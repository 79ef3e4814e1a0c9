use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{ExtractError, ExtractResult};
use crate::grid::Cell;
use crate::process::utils::clean_str;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y"];

/// Parse `"YYYY-MM-DD"`, `"DD/MM/YYYY"` and friends, with or without a time part.
pub fn parse_datetime_text(raw: &str) -> Option<NaiveDateTime> {
    let s = clean_str(raw);
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Excel's 1900 date system, counting from the 1899-12-30 epoch.
pub fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Calendar day held by a cell. Empty cells give `Ok(None)`; anything else
/// that cannot be read as a day is an error.
pub fn cell_date(cell: &Cell) -> ExtractResult<Option<NaiveDate>> {
    if cell.is_empty() {
        return Ok(None);
    }
    let parsed = match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(serial) => excel_serial_date(*serial),
        Cell::Text(s) => parse_datetime_text(s).map(|dt| dt.date()),
        Cell::Empty => None,
    };
    parsed.map(Some).ok_or_else(|| ExtractError::UnparseableDate {
        raw: match cell {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
            other => format!("{:?}", other),
        },
    })
}
