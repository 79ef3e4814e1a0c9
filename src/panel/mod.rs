// src/panel/mod.rs

//! Assembling the monthly feature panel from the per-source series.

pub mod harmonize;
pub mod merge;

use tracing::info;

use crate::error::ExtractResult;
use crate::frame::SeriesFrame;
use crate::process::TidySeries;
use crate::sources::{
    SourceKind, ELECTRICITY_COLUMNS, EXPECTATION_COLUMN, PRICE_PLANS_COLUMN, WAGE_COLUMNS,
};

pub use harmonize::forward_fill_monthly;
pub use merge::MonthlyPanel;

pub const PANEL_SOURCE: &str = "features_merged";

/// (driver column, lag column) pairs.
pub const LAG_FEATURES: &[(&str, &str)] = &[
    ("wage_yoy", "wage_yoy_lag1"),
    ("elec_price_yoy", "elec_price_yoy_lag1"),
    ("price_plans_total", "price_plans_total_lag1"),
];

/// (outcome column, target column).
pub const TARGET: (&str, &str) = ("cpi_yoy", "cpi_yoy_target_next");

/// Every per-source series the panel needs. The CPIF frame is the base axis.
#[derive(Debug, Clone)]
pub struct PanelInputs {
    pub cpif: SeriesFrame,
    pub wages: SeriesFrame,
    pub expectations: SeriesFrame,
    pub price_plans: SeriesFrame,
    pub electricity: SeriesFrame,
}

impl PanelInputs {
    pub fn frame(&self, kind: SourceKind) -> &SeriesFrame {
        match kind {
            SourceKind::Cpif => &self.cpif,
            SourceKind::Wages => &self.wages,
            SourceKind::Expectations => &self.expectations,
            SourceKind::PricePlans => &self.price_plans,
            SourceKind::Electricity => &self.electricity,
        }
    }
}

/// Join every source onto the CPIF months, then add lag and target columns.
pub fn build_panel(inputs: &PanelInputs) -> ExtractResult<MonthlyPanel> {
    let mut panel = MonthlyPanel::from_base(PANEL_SOURCE, &inputs.cpif);

    panel.left_join(&inputs.wages, WAGE_COLUMNS)?;
    panel.left_join(&inputs.expectations, &[EXPECTATION_COLUMN])?;
    panel.left_join(&inputs.electricity, ELECTRICITY_COLUMNS)?;

    let monthly_plans = monthly_price_plans(&inputs.price_plans)?;
    panel.left_join(&monthly_plans, &[PRICE_PLANS_COLUMN])?;

    panel.sort_by_date();
    for (driver, lag) in LAG_FEATURES {
        panel.add_lag(driver, lag)?;
    }
    panel.add_lead(TARGET.0, TARGET.1)?;

    info!(
        rows = panel.len(),
        columns = ?panel.frame().column_names(),
        "merged panel"
    );
    Ok(panel)
}

/// Quarterly price plans carried forward onto every month.
fn monthly_price_plans(quarterly: &SeriesFrame) -> ExtractResult<SeriesFrame> {
    let col = quarterly.require(PRICE_PLANS_COLUMN)?;
    let series = TidySeries::from_pairs(
        quarterly
            .dates
            .iter()
            .zip(&col.values)
            .filter_map(|(d, v)| v.map(|v| (*d, v))),
    );
    let monthly = forward_fill_monthly(&series);
    Ok(SeriesFrame::from_series(
        quarterly.source.clone(),
        PRICE_PLANS_COLUMN,
        &monthly,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MonthKey;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn frame(
        source: &str,
        dates: Vec<NaiveDate>,
        cols: &[(&str, Vec<Option<f64>>)],
    ) -> SeriesFrame {
        let mut f = SeriesFrame::new(source, dates);
        for (name, values) in cols {
            f.push_column(*name, values.clone());
        }
        f
    }

    fn months(year: i32, from: u32, n: u32, day_of: fn(MonthKey) -> NaiveDate) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| day_of(MonthKey { year, month: from }.shift(i as i32)))
            .collect()
    }

    fn sample_inputs() -> PanelInputs {
        let first = |k: MonthKey| k.first_day().unwrap();
        let last = |k: MonthKey| k.last_day().unwrap();
        PanelInputs {
            cpif: frame(
                "scb_cpif_components",
                months(2023, 4, 3, first),
                &[
                    ("kpi_total_index", vec![Some(1.0), Some(2.0), Some(3.0)]),
                    ("kpi_energy_index", vec![Some(1.0), Some(2.0), Some(3.0)]),
                    ("cpi_yoy", vec![Some(100.0), Some(110.0), Some(120.0)]),
                    ("cpi_energy_yoy", vec![None, None, None]),
                ],
            ),
            wages: frame(
                "mi_wages",
                vec![ymd(2023, 4, 1), ymd(2023, 6, 1)],
                &[
                    ("wage_index", vec![Some(200.0), Some(202.0)]),
                    ("wage_yoy", vec![Some(4.0), Some(4.2)]),
                ],
            ),
            expectations: frame(
                "ki_inflation_expectations",
                months(2023, 1, 12, first),
                &[(EXPECTATION_COLUMN, (0..12).map(|i| Some(i as f64)).collect())],
            ),
            price_plans: frame(
                "ki_price_plans",
                vec![ymd(2023, 3, 31), ymd(2023, 6, 30)],
                &[(PRICE_PLANS_COLUMN, vec![Some(10.0), Some(20.0)])],
            ),
            electricity: frame(
                "nordpool_electricity_monthly",
                months(2023, 5, 2, last),
                &[
                    ("price_se3", vec![Some(1.0), Some(2.0)]),
                    ("price_se4", vec![Some(3.0), Some(4.0)]),
                    ("elec_price_avg", vec![Some(2.0), Some(3.0)]),
                    ("elec_price_index", vec![Some(100.0), Some(150.0)]),
                    ("elec_price_yoy", vec![None, Some(5.0)]),
                ],
            ),
        }
    }

    #[test]
    fn panel_has_the_published_column_order() {
        let panel = build_panel(&sample_inputs()).unwrap();
        assert_eq!(
            panel.frame().column_names(),
            vec![
                "kpi_total_index",
                "kpi_energy_index",
                "cpi_yoy",
                "cpi_energy_yoy",
                "wage_index",
                "wage_yoy",
                "infl_exp_households_1y",
                "price_se3",
                "price_se4",
                "elec_price_avg",
                "elec_price_index",
                "elec_price_yoy",
                "price_plans_total",
                "wage_yoy_lag1",
                "elec_price_yoy_lag1",
                "price_plans_total_lag1",
                "cpi_yoy_target_next",
            ]
        );
    }

    #[test]
    fn panel_values_follow_the_base_months() {
        let panel = build_panel(&sample_inputs()).unwrap();
        let f = panel.frame();
        assert_eq!(f.len(), 3);
        assert_eq!(f.values("wage_yoy").unwrap(), &[Some(4.0), None, Some(4.2)]);
        assert_eq!(f.values("infl_exp_households_1y").unwrap(), &[Some(3.0), Some(4.0), Some(5.0)]);
        assert_eq!(f.values("elec_price_yoy").unwrap(), &[None, None, Some(5.0)]);
        assert_eq!(f.values("price_plans_total").unwrap(), &[Some(10.0), Some(10.0), Some(20.0)]);
        assert_eq!(f.values("wage_yoy_lag1").unwrap(), &[None, Some(4.0), None]);
        assert_eq!(f.values("price_plans_total_lag1").unwrap(), &[None, Some(10.0), Some(10.0)]);
        assert_eq!(
            f.values("cpi_yoy_target_next").unwrap(),
            &[Some(110.0), Some(120.0), None]
        );
    }

    #[test]
    fn missing_driver_column_aborts_the_merge() {
        let mut inputs = sample_inputs();
        inputs.wages = inputs.wages.select(&["wage_index"]).unwrap();
        assert!(build_panel(&inputs).is_err());
    }
}
