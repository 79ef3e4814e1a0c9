// src/sources/period_sheet.rs

//! Sheets whose layout is only known by its period labels: wages, household
//! inflation expectations and business price plans.

use tracing::{debug, instrument};

use crate::error::ExtractResult;
use crate::frame::SeriesFrame;
use crate::grid::CellGrid;
use crate::process::{extract_period_series, Frequency};
use crate::transform::{drop_first_year, series_yoy};

pub const WAGE_COLUMNS: &[&str] = &["wage_index", "wage_yoy"];
pub const EXPECTATION_COLUMN: &str = "infl_exp_households_1y";
pub const PRICE_PLANS_COLUMN: &str = "price_plans_total";

/// Monthly wage index with its year-over-year change; the first year is dropped.
#[instrument(level = "debug", skip(grid))]
pub fn extract_wages<G: CellGrid + ?Sized>(grid: &G, source: &str) -> ExtractResult<SeriesFrame> {
    let series = extract_period_series(grid, Frequency::Monthly)?;
    let yoy = series_yoy(&series);

    let mut frame = SeriesFrame::from_series(source, WAGE_COLUMNS[0], &series);
    frame.push_column(WAGE_COLUMNS[1], yoy);
    drop_first_year(&mut frame);
    debug!(months = series.len(), kept = frame.len(), "built wage series");
    Ok(frame)
}

/// Households' one-year-ahead inflation expectations, monthly, as published.
#[instrument(level = "debug", skip(grid))]
pub fn extract_expectations<G: CellGrid + ?Sized>(
    grid: &G,
    source: &str,
) -> ExtractResult<SeriesFrame> {
    let series = extract_period_series(grid, Frequency::Monthly)?;
    Ok(SeriesFrame::from_series(source, EXPECTATION_COLUMN, &series))
}

/// Business price plans, one value per quarter dated at the quarter's last day.
#[instrument(level = "debug", skip(grid))]
pub fn extract_price_plans<G: CellGrid + ?Sized>(
    grid: &G,
    source: &str,
) -> ExtractResult<SeriesFrame> {
    let series = extract_period_series(grid, Frequency::Quarterly)?;
    Ok(SeriesFrame::from_series(source, PRICE_PLANS_COLUMN, &series))
}
