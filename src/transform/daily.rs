// src/transform/daily.rs
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::frame::MonthKey;

/// One delivery day with a price per region, in a fixed region order.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPrices {
    pub date: NaiveDate,
    pub prices: Vec<f64>,
}

/// Mean daily price per region over one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPrices {
    pub month: MonthKey,
    pub means: Vec<f64>,
}

impl MonthlyPrices {
    /// Unweighted average across regions.
    pub fn cross_region_mean(&self) -> Option<f64> {
        if self.means.is_empty() {
            return None;
        }
        Some(self.means.iter().sum::<f64>() / self.means.len() as f64)
    }
}

/// Group daily rows (in any order, possibly from several sheets) by month and
/// average each region. Months come back in ascending order.
pub fn monthly_regional_means<I>(days: I) -> Vec<MonthlyPrices>
where
    I: IntoIterator<Item = DailyPrices>,
{
    let mut acc: BTreeMap<MonthKey, (Vec<f64>, usize)> = BTreeMap::new();
    for day in days {
        let (sums, count) = acc
            .entry(MonthKey::of(day.date))
            .or_insert_with(|| (vec![0.0; day.prices.len()], 0));
        if sums.len() != day.prices.len() {
            continue;
        }
        for (s, p) in sums.iter_mut().zip(&day.prices) {
            *s += p;
        }
        *count += 1;
    }

    acc.into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(month, (sums, count))| MonthlyPrices {
            month,
            means: sums.into_iter().map(|s| s / count as f64).collect(),
        })
        .collect()
}
