// src/process/locate.rs

//! Content-based discovery of the period header and the data row in sheets
//! that carry no usable column names.

use tracing::{debug, trace};

use crate::error::{ExtractError, ExtractResult};
use crate::grid::CellGrid;
use crate::process::period::Frequency;

/// The header row of a period sheet and the columns that hold period labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodHeader {
    pub row: usize,
    /// Matching column indices, in grid order. Not necessarily contiguous.
    pub columns: Vec<usize>,
    /// Trimmed labels, aligned with `columns`.
    pub labels: Vec<String>,
}

/// First row with at least one text cell matching the frequency's grammar.
pub fn locate_period_header<G: CellGrid + ?Sized>(
    grid: &G,
    frequency: Frequency,
) -> ExtractResult<PeriodHeader> {
    for row_idx in 0..grid.row_count() {
        let mut columns = Vec::new();
        let mut labels = Vec::new();
        for (col_idx, cell) in grid.row(row_idx).iter().enumerate() {
            if let Some(text) = cell.as_text() {
                if frequency.matches(text) {
                    columns.push(col_idx);
                    labels.push(text.to_string());
                }
            }
        }
        if !columns.is_empty() {
            debug!(
                row = row_idx,
                periods = columns.len(),
                first_columns = ?&columns[..columns.len().min(10)],
                "located {} header",
                frequency
            );
            return Ok(PeriodHeader {
                row: row_idx,
                columns,
                labels,
            });
        }
        trace!(row = row_idx, "no period labels");
    }
    Err(ExtractError::HeaderNotFound { frequency })
}

/// First row strictly below `header_row` holding a number in any of `columns`.
pub fn locate_data_row<G: CellGrid + ?Sized>(
    grid: &G,
    header_row: usize,
    columns: &[usize],
) -> ExtractResult<usize> {
    for row_idx in header_row + 1..grid.row_count() {
        let has_value = columns.iter().any(|&c| {
            grid.cell(row_idx, c)
                .and_then(|cell| cell.as_number())
                .is_some()
        });
        if has_value {
            debug!(row = row_idx, header_row, "located data row");
            return Ok(row_idx);
        }
    }
    Err(ExtractError::DataRowNotFound { header_row })
}
