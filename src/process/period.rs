// src/process/period.rs

//! Period labels as they appear in the statistics agencies' sheets:
//! `2008M01` for months, `2002Q1` for quarters.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{ExtractError, ExtractResult};

static MONTHLY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}M(0[1-9]|1[0-2])$").expect("valid monthly period regex"));
static QUARTERLY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}Q[1-4]$").expect("valid quarterly period regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Does the trimmed label match this frequency's grammar?
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        match self {
            Frequency::Monthly => MONTHLY_CODE.is_match(label),
            Frequency::Quarterly => QUARTERLY_CODE.is_match(label),
        }
    }

    pub fn example(&self) -> &'static str {
        match self {
            Frequency::Monthly => "2008M01",
            Frequency::Quarterly => "2002Q1",
        }
    }

    fn marker(&self) -> char {
        match self {
            Frequency::Monthly => 'M',
            Frequency::Quarterly => 'Q',
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "m" => Ok(Frequency::Monthly),
            "quarterly" | "q" => Ok(Frequency::Quarterly),
            other => Err(format!("unknown frequency {:?}", other)),
        }
    }
}

/// A validated period label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodCode {
    pub year: i32,
    /// Month (1-12) or quarter (1-4), depending on `frequency`.
    pub index: u32,
    pub frequency: Frequency,
}

impl PeriodCode {
    /// Parse a label under the given grammar. Surrounding whitespace is ignored.
    pub fn parse(raw: &str, frequency: Frequency) -> ExtractResult<Self> {
        let label = raw.trim();
        let unparseable = || ExtractError::UnparseableDate {
            raw: raw.to_string(),
        };
        if !frequency.matches(label) {
            return Err(unparseable());
        }
        // grammar guarantees ASCII: 4 year digits, marker, 1-2 index digits
        let year = label[..4].parse().map_err(|_| unparseable())?;
        let index = label[5..].parse().map_err(|_| unparseable())?;
        Ok(Self {
            year,
            index,
            frequency,
        })
    }

    /// Calendar date of the period: first day of a month, last day of a quarter.
    pub fn to_date(&self) -> ExtractResult<NaiveDate> {
        let date = match self.frequency {
            Frequency::Monthly => NaiveDate::from_ymd_opt(self.year, self.index, 1),
            Frequency::Quarterly => last_day_of_month(self.year, self.index * 3),
        };
        date.ok_or_else(|| ExtractError::UnparseableDate {
            raw: self.to_string(),
        })
    }
}

impl fmt::Display for PeriodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frequency {
            Frequency::Monthly => {
                write!(f, "{:04}{}{:02}", self.year, self.frequency.marker(), self.index)
            }
            Frequency::Quarterly => {
                write!(f, "{:04}{}{}", self.year, self.frequency.marker(), self.index)
            }
        }
    }
}

/// Last calendar day of `year`-`month`.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}
