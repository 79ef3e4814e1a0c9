// src/process/mod.rs

//! Turning label-free period sheets into tidy series: period grammar,
//! header/data-row discovery and the reshaping step.

pub mod date_parser;
pub mod locate;
pub mod period;
pub mod tidy;
pub mod utils;

pub use locate::{locate_data_row, locate_period_header, PeriodHeader};
pub use period::{Frequency, PeriodCode};
pub use tidy::{extract_period_series, Observation, TidySeries};
