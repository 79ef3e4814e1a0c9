// src/process/tidy.rs
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::grid::{Cell, CellGrid};
use crate::process::locate::{locate_data_row, locate_period_header};
use crate::process::period::{Frequency, PeriodCode};

/// One dated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Dated values, strictly increasing by date. Absent values are not stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TidySeries {
    observations: Vec<Observation>,
}

impl TidySeries {
    /// Build from arbitrary (date, value) pairs: sorted ascending, and when a
    /// date repeats the last pair given for it wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let by_date: BTreeMap<NaiveDate, f64> = pairs.into_iter().collect();
        Self {
            observations: by_date
                .into_iter()
                .map(|(date, value)| Observation { date, value })
                .collect(),
        }
    }

    /// Pair period labels with the cells beneath them.
    ///
    /// Cells that are empty or not numeric are dropped along with their label;
    /// only surviving labels are converted to dates.
    pub fn from_periods<S: AsRef<str>>(
        labels: &[S],
        cells: &[&Cell],
        frequency: Frequency,
    ) -> ExtractResult<Self> {
        let mut pairs = Vec::with_capacity(labels.len());
        for (label, cell) in labels.iter().zip(cells) {
            let Some(value) = cell.as_number() else {
                continue;
            };
            let date = PeriodCode::parse(label.as_ref(), frequency)?.to_date()?;
            pairs.push((date, value));
        }
        if pairs.is_empty() {
            return Err(ExtractError::NoDataProduced {
                periods: labels.len(),
            });
        }

        let kept = pairs.len();
        let series = Self::from_pairs(pairs);
        if series.len() < kept {
            warn!(
                duplicates = kept - series.len(),
                "repeated period labels; keeping the last value for each"
            );
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }
}

/// Locate the period header and data row of a label-free sheet and reshape
/// that row into a tidy series.
#[instrument(level = "debug", skip(grid))]
pub fn extract_period_series<G: CellGrid + ?Sized>(
    grid: &G,
    frequency: Frequency,
) -> ExtractResult<TidySeries> {
    let header = locate_period_header(grid, frequency)?;
    let data_row = locate_data_row(grid, header.row, &header.columns)?;

    let empty = Cell::Empty;
    let cells: Vec<&Cell> = header
        .columns
        .iter()
        .map(|&c| grid.cell(data_row, c).unwrap_or(&empty))
        .collect();

    let series = TidySeries::from_periods(&header.labels, &cells, frequency)?;
    debug!(
        header_row = header.row,
        data_row,
        observations = series.len(),
        "built tidy series"
    );
    Ok(series)
}
