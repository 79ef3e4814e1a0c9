// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::process::period::Frequency;

/// Everything that can go wrong while turning one raw workbook into a series.
///
/// All of these are fatal for the source being processed: a guessed header or
/// a made-up date would shift every downstream join.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no row holds {frequency} period labels such as {}", .frequency.example())]
    HeaderNotFound { frequency: Frequency },

    #[error("no row below header row {header_row} holds a numeric value under the period columns")]
    DataRowNotFound { header_row: usize },

    #[error("every value under the {periods} period columns was empty or unparseable")]
    NoDataProduced { periods: usize },

    #[error("none of the {sheets} sheets holds a dated row with every regional price")]
    NoDailyPrices { sheets: usize },

    #[error("cannot read {raw:?} as a date")]
    UnparseableDate { raw: String },

    #[error("expected column {column:?} is missing ({location})")]
    MissingExpectedColumn { column: String, location: String },

    #[error("no values fall in reference year {year}")]
    EmptyReferencePeriod { year: i32 },

    #[error("workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path} has no sheets")]
    NoSheets { path: PathBuf },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Pipeline stage the error belongs to, used when reporting a failed source.
    pub fn stage(&self) -> &'static str {
        match self {
            ExtractError::Workbook { .. } | ExtractError::NoSheets { .. } => "read",
            ExtractError::HeaderNotFound { .. } => "locate-header",
            ExtractError::DataRowNotFound { .. } => "locate-data",
            ExtractError::NoDataProduced { .. }
            | ExtractError::NoDailyPrices { .. }
            | ExtractError::UnparseableDate { .. }
            | ExtractError::MissingExpectedColumn { .. } => "build-series",
            ExtractError::EmptyReferencePeriod { .. } => "derive",
            ExtractError::Csv(_) | ExtractError::Io(_) => "write",
        }
    }

    pub fn missing_column(column: impl Into<String>, location: impl Into<String>) -> Self {
        ExtractError::MissingExpectedColumn {
            column: column.into(),
            location: location.into(),
        }
    }
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
