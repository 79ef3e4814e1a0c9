// src/sources/electricity.rs

//! Nord Pool daily spot prices for SE3 and SE4, one sheet per year, reduced
//! to monthly means plus an index and its year-over-year change.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::frame::SeriesFrame;
use crate::grid::{CellGrid, NamedSheet};
use crate::process::date_parser::cell_date;
use crate::transform::{monthly_regional_means, rebase_to_year, yoy_percent, DailyPrices};

pub const COLUMNS: &[&str] = &[
    "price_se3",
    "price_se4",
    "elec_price_avg",
    "elec_price_index",
    "elec_price_yoy",
];

/// Header names of the columns read from each sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricityColumns {
    pub date: String,
    pub se3: String,
    pub se4: String,
}

impl Default for ElectricityColumns {
    fn default() -> Self {
        Self {
            date: "Deliver Date CET".to_string(),
            se3: "SE3 (SEK)".to_string(),
            se4: "SE4 (SEK)".to_string(),
        }
    }
}

/// Monthly electricity frame, dated at month end.
///
/// Every sheet contributes its daily rows; the index is rebased so the first
/// calendar year in the data averages 100.
#[instrument(level = "debug", skip(sheets, columns), fields(sheets = sheets.len()))]
pub fn extract_electricity(
    sheets: &[NamedSheet],
    columns: &ElectricityColumns,
    source: &str,
) -> ExtractResult<SeriesFrame> {
    let mut days = Vec::new();
    for sheet in sheets {
        let rows = daily_rows(sheet, columns)?;
        debug!(sheet = %sheet.name, days = rows.len(), "read daily prices");
        days.extend(rows);
    }
    if days.is_empty() {
        return Err(ExtractError::NoDailyPrices {
            sheets: sheets.len(),
        });
    }

    let months = monthly_regional_means(days);
    let mut dates = Vec::with_capacity(months.len());
    let (mut se3, mut se4, mut avg) = (Vec::new(), Vec::new(), Vec::new());
    for m in &months {
        let Some(end) = m.month.last_day() else {
            continue;
        };
        dates.push(end);
        se3.push(m.means.first().copied());
        se4.push(m.means.get(1).copied());
        avg.push(m.cross_region_mean());
    }

    // months come back ascending, so the first one holds the reference year
    let reference_year = dates
        .first()
        .map(|d| d.year())
        .ok_or(ExtractError::NoDailyPrices {
            sheets: sheets.len(),
        })?;
    let index = rebase_to_year(&dates, &avg, reference_year)?;
    let yoy = yoy_percent(&dates, &index);

    let mut frame = SeriesFrame::new(source, dates);
    frame.push_column(COLUMNS[0], se3);
    frame.push_column(COLUMNS[1], se4);
    frame.push_column(COLUMNS[2], avg);
    frame.push_column(COLUMNS[3], index);
    frame.push_column(COLUMNS[4], yoy);

    info!(months = frame.len(), reference_year, "aggregated electricity prices");
    Ok(frame)
}

/// Daily rows of one sheet. The header is the first row with any content.
fn daily_rows(
    sheet: &NamedSheet,
    columns: &ElectricityColumns,
) -> ExtractResult<Vec<DailyPrices>> {
    let grid = &sheet.grid;
    let Some(header_row) =
        (0..grid.row_count()).find(|&r| grid.row(r).iter().any(|c| !c.is_empty()))
    else {
        warn!(sheet = %sheet.name, "empty sheet");
        return Ok(Vec::new());
    };

    let header = grid.row(header_row);
    let position = |name: &str| {
        header
            .iter()
            .position(|c| c.as_text() == Some(name))
            .ok_or_else(|| {
                ExtractError::missing_column(name, format!("sheet {:?}", sheet.name))
            })
    };
    let date_col = position(columns.date.as_str())?;
    let se3_col = position(columns.se3.as_str())?;
    let se4_col = position(columns.se4.as_str())?;

    let mut days = Vec::new();
    let mut incomplete = 0usize;
    for r in header_row + 1..grid.row_count() {
        let Some(date_cell) = grid.cell(r, date_col) else {
            continue;
        };
        let Some(date) = cell_date(date_cell)? else {
            continue;
        };
        let price = |c: usize| grid.cell(r, c).and_then(|cell| cell.as_number());
        match (price(se3_col), price(se4_col)) {
            (Some(se3), Some(se4)) => days.push(DailyPrices {
                date,
                prices: vec![se3, se4],
            }),
            _ => incomplete += 1,
        }
    }
    if incomplete > 0 {
        debug!(sheet = %sheet.name, incomplete, "dropped days missing a regional price");
    }
    Ok(days)
}
