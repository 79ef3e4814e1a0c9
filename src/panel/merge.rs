// src/panel/merge.rs
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::ExtractResult;
use crate::frame::{MonthKey, SeriesFrame};

/// Monthly feature panel. Row presence and order come from the base series;
/// everything else is joined onto it by calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPanel {
    frame: SeriesFrame,
}

impl MonthlyPanel {
    /// Start from every row and column of `base`.
    pub fn from_base(source: impl Into<String>, base: &SeriesFrame) -> Self {
        let mut frame = base.clone();
        frame.source = source.into();
        let mut panel = Self { frame };
        panel.sort_by_date();
        panel
    }

    /// Left join `columns` of `other` by (year, month). Base rows without a
    /// matching month get `None`; months only present in `other` are ignored.
    /// If `other` repeats a month, its last row for that month is used.
    pub fn left_join(&mut self, other: &SeriesFrame, columns: &[&str]) -> ExtractResult<()> {
        let mut row_of: HashMap<MonthKey, usize> = HashMap::with_capacity(other.len());
        for (i, d) in other.dates.iter().enumerate() {
            if row_of.insert(MonthKey::of(*d), i).is_some() {
                warn!(
                    source = %other.source,
                    month = %MonthKey::of(*d),
                    "repeated month; last row wins"
                );
            }
        }
        let base_rows: Vec<Option<usize>> = self
            .frame
            .dates
            .iter()
            .map(|d| row_of.get(&MonthKey::of(*d)).copied())
            .collect();

        for name in columns {
            let col = other.require(name)?;
            let values = base_rows
                .iter()
                .map(|r| r.and_then(|i| col.values[i]))
                .collect();
            self.frame.push_column(*name, values);
        }

        let matched = base_rows.iter().filter(|r| r.is_some()).count();
        debug!(
            source = %other.source,
            matched,
            rows = self.frame.len(),
            "joined"
        );
        Ok(())
    }

    /// Stable chronological sort of every row.
    pub fn sort_by_date(&mut self) {
        let frame = &mut self.frame;
        if frame.dates.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }
        let mut order: Vec<usize> = (0..frame.dates.len()).collect();
        order.sort_by_key(|&i| frame.dates[i]);
        frame.dates = order.iter().map(|&i| frame.dates[i]).collect();
        for col in &mut frame.columns {
            col.values = order.iter().map(|&i| col.values[i]).collect();
        }
    }

    /// `name[t] = column[t - 1]`; the first row is `None`.
    pub fn add_lag(&mut self, column: &str, name: &str) -> ExtractResult<()> {
        let src = &self.frame.require(column)?.values;
        let mut values = Vec::with_capacity(src.len());
        if !src.is_empty() {
            values.push(None);
            values.extend_from_slice(&src[..src.len() - 1]);
        }
        self.frame.push_column(name, values);
        Ok(())
    }

    /// `name[t] = column[t + 1]`; the last row is `None`.
    pub fn add_lead(&mut self, column: &str, name: &str) -> ExtractResult<()> {
        let src = &self.frame.require(column)?.values;
        let mut values: Vec<Option<f64>> = src.iter().skip(1).copied().collect();
        if !src.is_empty() {
            values.push(None);
        }
        self.frame.push_column(name, values);
        Ok(())
    }

    pub fn frame(&self) -> &SeriesFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base(values: &[f64]) -> SeriesFrame {
        let dates = (0..values.len()).map(|i| ymd(2024, i as u32 + 1, 1)).collect();
        let mut f = SeriesFrame::new("scb", dates);
        f.push_column("cpi_yoy", values.iter().copied().map(Some).collect());
        f
    }

    #[test]
    fn left_join_keeps_every_base_row() {
        let mut panel = MonthlyPanel::from_base("panel", &base(&[1.0, 2.0, 3.0]));

        // month-end dates, middle month missing, plus a month outside the base
        let mut other = SeriesFrame::new(
            "elec",
            vec![ymd(2024, 1, 31), ymd(2024, 3, 31), ymd(2024, 9, 30)],
        );
        other.push_column("price", vec![Some(10.0), Some(30.0), Some(90.0)]);
        panel.left_join(&other, &["price"]).unwrap();

        assert_eq!(panel.len(), 3);
        assert_eq!(
            panel.frame().values("price").unwrap(),
            &[Some(10.0), None, Some(30.0)]
        );
    }

    #[test]
    fn join_of_unknown_column_fails() {
        let mut panel = MonthlyPanel::from_base("panel", &base(&[1.0]));
        let other = SeriesFrame::new("wages", vec![ymd(2024, 1, 1)]);
        let err = panel.left_join(&other, &["wage_yoy"]).unwrap_err();
        assert!(matches!(err, ExtractError::MissingExpectedColumn { .. }));
    }

    #[test]
    fn repeated_months_use_the_last_row() {
        let mut panel = MonthlyPanel::from_base("panel", &base(&[1.0]));
        let mut other = SeriesFrame::new("x", vec![ymd(2024, 1, 1), ymd(2024, 1, 31)]);
        other.push_column("v", vec![Some(1.0), Some(2.0)]);
        panel.left_join(&other, &["v"]).unwrap();
        assert_eq!(panel.frame().values("v").unwrap(), &[Some(2.0)]);
    }

    #[test]
    fn lag_and_lead() {
        let mut panel = MonthlyPanel::from_base("panel", &base(&[100.0, 110.0, 120.0]));
        panel.add_lag("cpi_yoy", "cpi_yoy_lag1").unwrap();
        panel.add_lead("cpi_yoy", "cpi_yoy_target_next").unwrap();

        let f = panel.frame();
        assert_eq!(f.values("cpi_yoy_lag1").unwrap(), &[None, Some(100.0), Some(110.0)]);
        assert_eq!(
            f.values("cpi_yoy_target_next").unwrap(),
            &[Some(110.0), Some(120.0), None]
        );
    }

    #[test]
    fn lag_of_missing_column_fails() {
        let mut panel = MonthlyPanel::from_base("panel", &base(&[1.0]));
        assert!(panel.add_lag("wage_yoy", "wage_yoy_lag1").is_err());
        assert!(panel.add_lead("nope", "x").is_err());
    }

    #[test]
    fn unsorted_base_is_sorted_with_its_columns() {
        let mut f =
            SeriesFrame::new("scb", vec![ymd(2024, 3, 1), ymd(2024, 1, 1), ymd(2024, 2, 1)]);
        f.push_column("v", vec![Some(3.0), Some(1.0), Some(2.0)]);
        let panel = MonthlyPanel::from_base("panel", &f);
        assert_eq!(panel.frame().dates[0], ymd(2024, 1, 1));
        assert_eq!(panel.frame().values("v").unwrap(), &[Some(1.0), Some(2.0), Some(3.0)]);
    }
}
