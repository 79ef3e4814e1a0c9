// src/panel/harmonize.rs
use tracing::debug;

use crate::frame::MonthKey;
use crate::process::TidySeries;

/// Spread a lower-frequency series onto every calendar month by carrying the
/// latest observation forward.
///
/// Output runs from the month of the first observation to the month of the
/// last, dated at month end. A month takes the value of the most recent
/// observation falling in or before it; nothing is back-filled, so months
/// before the first observation are absent.
pub fn forward_fill_monthly(series: &TidySeries) -> TidySeries {
    let obs = series.observations();
    let (Some(first), Some(last)) = (obs.first(), obs.last()) else {
        return TidySeries::default();
    };

    let end = MonthKey::of(last.date);
    let mut month = MonthKey::of(first.date);
    let mut next = 0;
    let mut current: Option<f64> = None;
    let mut pairs = Vec::new();

    while month <= end {
        while next < obs.len() && MonthKey::of(obs[next].date) <= month {
            current = Some(obs[next].value);
            next += 1;
        }
        if let (Some(value), Some(date)) = (current, month.last_day()) {
            pairs.push((date, value));
        }
        month = month.next();
    }

    debug!(
        observations = obs.len(),
        months = pairs.len(),
        "forward-filled to monthly"
    );
    TidySeries::from_pairs(pairs)
}
