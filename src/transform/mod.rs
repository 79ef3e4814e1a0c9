// src/transform/mod.rs

//! Derived metrics computed per source: year-over-year change, rebasing to a
//! reference year, and the daily → monthly regional aggregation used for
//! electricity prices.

pub mod daily;

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::error::{ExtractError, ExtractResult};
use crate::frame::{MonthKey, SeriesFrame};
use crate::process::TidySeries;

pub use daily::{monthly_regional_means, DailyPrices, MonthlyPrices};

/// Year-over-year percent change, `(v[t] / v[t - 12 months] - 1) * 100`.
///
/// The lookback is found by calendar month, so gaps in the series do not
/// pair a value with the wrong month. A row without a value twelve months
/// earlier, or whose base is zero, gets `None`.
pub fn yoy_percent(dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<Option<f64>> {
    let by_month: HashMap<MonthKey, f64> = dates
        .iter()
        .zip(values)
        .filter_map(|(d, v)| v.map(|v| (MonthKey::of(*d), v)))
        .collect();

    dates
        .iter()
        .zip(values)
        .map(|(d, v)| {
            let now = (*v)?;
            let base = *by_month.get(&MonthKey::of(*d).shift(-12))?;
            if base == 0.0 {
                return None;
            }
            Some((now / base - 1.0) * 100.0)
        })
        .collect()
}

/// [`yoy_percent`] over a tidy series, aligned with its observations.
pub fn series_yoy(series: &TidySeries) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = series.values().into_iter().map(Some).collect();
    yoy_percent(&series.dates(), &values)
}

/// Rebase so the mean over `reference_year` equals 100.
pub fn rebase_to_year(
    dates: &[NaiveDate],
    values: &[Option<f64>],
    reference_year: i32,
) -> ExtractResult<Vec<Option<f64>>> {
    let base: Vec<f64> = dates
        .iter()
        .zip(values)
        .filter(|(d, _)| d.year() == reference_year)
        .filter_map(|(_, v)| *v)
        .collect();
    if base.is_empty() {
        return Err(ExtractError::EmptyReferencePeriod {
            year: reference_year,
        });
    }
    let mean = base.iter().sum::<f64>() / base.len() as f64;
    if mean == 0.0 {
        return Err(ExtractError::EmptyReferencePeriod {
            year: reference_year,
        });
    }
    Ok(values.iter().map(|v| v.map(|v| v / mean * 100.0)).collect())
}

/// Drop the first year of rows, i.e. every row dated before
/// `first date + 1 year`. Those rows cannot carry a year-over-year value.
pub fn drop_first_year(frame: &mut SeriesFrame) {
    let Some(first) = frame.dates.first().copied() else {
        return;
    };
    let cutoff = first
        .with_year(first.year() + 1)
        // 29 February has no counterpart next year
        .or_else(|| NaiveDate::from_ymd_opt(first.year() + 1, 3, 1))
        .unwrap_or(first);
    frame.retain_dates(|d| d >= cutoff);
}
