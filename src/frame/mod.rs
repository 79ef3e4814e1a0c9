// src/frame/mod.rs

//! Named, date-aligned value columns: the per-source series that get persisted
//! as intermediate CSVs and joined into the panel.

pub mod csv;
pub mod parquet;

use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::error::{ExtractError, ExtractResult};
use crate::process::period::last_day_of_month;
use crate::process::TidySeries;

pub use self::csv::{read_csv, write_csv};
pub use self::parquet::write_parquet;

/// Calendar month, the join key between series of different native dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Move by whole months, forwards or backwards.
    pub fn shift(self, months: i32) -> Self {
        let total = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: total.div_euclid(12),
            month: total.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        last_day_of_month(self.year, self.month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// One or more value columns sharing a date axis, tagged with the source that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFrame {
    pub source: String,
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl SeriesFrame {
    pub fn new(source: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self {
            source: source.into(),
            dates,
            columns: Vec::new(),
        }
    }

    /// Single-column frame from a tidy series.
    pub fn from_series(source: impl Into<String>, name: &str, series: &TidySeries) -> Self {
        let mut frame = Self::new(source, series.dates());
        frame.push_column(name, series.values().into_iter().map(Some).collect());
        frame
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.dates.len(), "column length must match dates");
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`column`](Self::column) but a missing column is an error.
    pub fn require(&self, name: &str) -> ExtractResult<&Column> {
        self.column(name)
            .ok_or_else(|| ExtractError::missing_column(name, format!("{} series", self.source)))
    }

    /// Rename the value column at `idx` (0 = first column after the date).
    pub fn rename_column(&mut self, idx: usize, name: &str) -> ExtractResult<()> {
        let col = self
            .columns
            .get_mut(idx)
            .ok_or_else(|| ExtractError::missing_column(name, format!("{} series", self.source)))?;
        col.name = name.to_string();
        Ok(())
    }

    /// New frame with only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> ExtractResult<SeriesFrame> {
        let mut out = SeriesFrame::new(self.source.clone(), self.dates.clone());
        for name in names {
            let col = self.require(name)?;
            out.columns.push(col.clone());
        }
        Ok(out)
    }

    /// Keep rows whose date satisfies `keep`, across every column.
    pub fn retain_dates<F: Fn(NaiveDate) -> bool>(&mut self, keep: F) {
        let mask: Vec<bool> = self.dates.iter().map(|d| keep(*d)).collect();
        let filter = |values: &mut Vec<Option<f64>>| {
            let mut it = mask.iter();
            values.retain(|_| *it.next().unwrap_or(&false));
        };
        let mut it = mask.iter();
        self.dates.retain(|_| *it.next().unwrap_or(&false));
        for col in &mut self.columns {
            filter(&mut col.values);
        }
    }

    /// Value of `column` at each row, or `None` if the column is unknown.
    pub fn values(&self, column: &str) -> Option<&[Option<f64>]> {
        self.column(column).map(|c| c.values.as_slice())
    }
}
