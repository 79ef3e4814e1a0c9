// src/sources/cpif.rs

//! CPIF components sheet. Its layout is fixed, so rows are read by position
//! instead of being discovered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::frame::SeriesFrame;
use crate::grid::{Cell, CellGrid};
use crate::process::{Frequency, PeriodCode};
use crate::transform::{drop_first_year, yoy_percent};

/// Zero-based sheet positions of the CPIF rows and first period column. The
/// published file has a title row and a blank row above the period labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpifLayout {
    pub label_row: usize,
    pub total_row: usize,
    pub energy_row: usize,
    pub first_column: usize,
}

impl Default for CpifLayout {
    fn default() -> Self {
        Self {
            label_row: 2,
            total_row: 3,
            energy_row: 4,
            first_column: 1,
        }
    }
}

pub const COLUMNS: &[&str] = &[
    "kpi_total_index",
    "kpi_energy_index",
    "cpi_yoy",
    "cpi_energy_yoy",
];

/// Total and energy index with their year-over-year changes. The first year
/// is dropped since it has no change to report.
pub fn extract_cpif<G: CellGrid + ?Sized>(
    grid: &G,
    layout: &CpifLayout,
    source: &str,
) -> ExtractResult<SeriesFrame> {
    let rows = [
        ("period labels", layout.label_row),
        (COLUMNS[0], layout.total_row),
        (COLUMNS[1], layout.energy_row),
    ];
    for (what, row) in rows {
        if row >= grid.row_count() {
            return Err(ExtractError::missing_column(
                what,
                format!("row {} of a {}-row sheet", row, grid.row_count()),
            ));
        }
    }

    let empty = Cell::Empty;
    let value_at = |row: usize, col: usize| grid.cell(row, col).unwrap_or(&empty).as_number();

    // date -> (total, energy); a repeated label keeps its last column
    let mut by_date: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
    let labels = grid.row(layout.label_row);
    for (col, cell) in labels.iter().enumerate().skip(layout.first_column) {
        if cell.is_empty() {
            continue;
        }
        let date = label_date(cell)?;
        let values = (
            value_at(layout.total_row, col),
            value_at(layout.energy_row, col),
        );
        if by_date.insert(date, values).is_some() {
            warn!(%date, "repeated CPIF period label; keeping the last column");
        }
    }
    if by_date.is_empty() {
        return Err(ExtractError::missing_column(
            "period labels",
            format!("row {} from column {}", layout.label_row, layout.first_column),
        ));
    }

    let dates: Vec<NaiveDate> = by_date.keys().copied().collect();
    let total: Vec<Option<f64>> = by_date.values().map(|v| v.0).collect();
    let energy: Vec<Option<f64>> = by_date.values().map(|v| v.1).collect();

    let total_yoy = yoy_percent(&dates, &total);
    let energy_yoy = yoy_percent(&dates, &energy);

    let mut frame = SeriesFrame::new(source, dates);
    frame.push_column(COLUMNS[0], total);
    frame.push_column(COLUMNS[1], energy);
    frame.push_column(COLUMNS[2], total_yoy);
    frame.push_column(COLUMNS[3], energy_yoy);

    let months = frame.len();
    drop_first_year(&mut frame);
    debug!(months, kept = frame.len(), "built CPIF components");
    if frame.is_empty() {
        warn!("CPIF sheet covers less than a year; no rows left after dropping the first year");
    }
    Ok(frame)
}

fn label_date(cell: &Cell) -> ExtractResult<NaiveDate> {
    match cell {
        Cell::Text(s) => PeriodCode::parse(s, Frequency::Monthly)?.to_date(),
        other => Err(ExtractError::UnparseableDate {
            raw: match other {
                Cell::Number(v) => v.to_string(),
                Cell::DateTime(dt) => dt.to_string(),
                _ => String::new(),
            },
        }),
    }
}
