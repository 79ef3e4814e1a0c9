// src/sources/mod.rs

//! One extractor per published workbook. Each turns raw sheets into a
//! [`SeriesFrame`](crate::frame::SeriesFrame) ready to be written as an
//! intermediate CSV.

pub mod cpif;
pub mod electricity;
pub mod period_sheet;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use cpif::{extract_cpif, CpifLayout};
pub use electricity::{extract_electricity, ElectricityColumns};
pub use period_sheet::{
    extract_expectations, extract_price_plans, extract_wages, EXPECTATION_COLUMN,
    PRICE_PLANS_COLUMN, WAGE_COLUMNS,
};

pub const CPIF_COLUMNS: &[&str] = cpif::COLUMNS;
pub const ELECTRICITY_COLUMNS: &[&str] = electricity::COLUMNS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Cpif,
    Wages,
    Expectations,
    PricePlans,
    Electricity,
}

impl SourceKind {
    /// Processing order. CPIF comes first as it is the panel's base axis.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Cpif,
        SourceKind::Wages,
        SourceKind::Expectations,
        SourceKind::PricePlans,
        SourceKind::Electricity,
    ];

    /// Stem of the intermediate CSV, also used as the frame's source name.
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Cpif => "scb_cpif_components",
            SourceKind::Wages => "mi_wages",
            SourceKind::Expectations => "ki_inflation_expectations",
            SourceKind::PricePlans => "ki_price_plans",
            SourceKind::Electricity => "nordpool_electricity_monthly",
        }
    }

    pub fn default_input(self) -> &'static str {
        match self {
            SourceKind::Cpif => "scb_cpif_components_total_and_energy_raw.xlsx",
            SourceKind::Wages => "mi_wages_total_economy.xlsx",
            SourceKind::Expectations => "ki_inflation_expectations_households.xlsx",
            SourceKind::PricePlans => "ki_price_plans_total_business.xlsx",
            SourceKind::Electricity => "nordpool_daily_se3_se4_2023_2025.xlsx",
        }
    }

    pub fn default_output(self) -> String {
        format!("{}.csv", self.name())
    }

    /// Value columns of the intermediate CSV, after `date`.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            SourceKind::Cpif => CPIF_COLUMNS,
            SourceKind::Wages => WAGE_COLUMNS,
            SourceKind::Expectations => &[EXPECTATION_COLUMN],
            SourceKind::PricePlans => &[PRICE_PLANS_COLUMN],
            SourceKind::Electricity => ELECTRICITY_COLUMNS,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|k| k.name() == s || serde_name(*k) == s)
            .ok_or_else(|| format!("unknown source {s:?}"))
    }
}

fn serde_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Cpif => "cpif",
        SourceKind::Wages => "wages",
        SourceKind::Expectations => "expectations",
        SourceKind::PricePlans => "price_plans",
        SourceKind::Electricity => "electricity",
    }
}
