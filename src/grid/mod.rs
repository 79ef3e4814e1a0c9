// src/grid/mod.rs

//! A spreadsheet tab as a plain 2-D cell grid, with no header or type
//! assumptions. Everything that scans for period labels works against the
//! [`CellGrid`] trait so it can be fed synthetic grids in tests.

pub mod workbook;

use chrono::NaiveDateTime;

use crate::process::utils::{clean_str, parse_number};

pub use workbook::{NamedSheet, SheetLoader, XlsxLoader};

/// One cell as read from the sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Text content, trimmed. Only `Text` cells have any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.trim()),
            _ => None,
        }
    }

    /// Numeric reading of the cell, coercing numeric-looking text.
    /// Empty, date and non-numeric cells read as `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => clean_str(s).is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

/// Read-only access to a grid of cells. Rows may be ragged.
pub trait CellGrid {
    fn row_count(&self) -> usize;

    fn row(&self, idx: usize) -> &[Cell];

    fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.row_count() {
            return None;
        }
        self.row(row).get(col)
    }

    /// Widest row in the grid.
    fn col_count(&self) -> usize {
        (0..self.row_count())
            .map(|i| self.row(i).len())
            .max()
            .unwrap_or(0)
    }
}

/// A sheet exactly as read, addressed by absolute (row, column) position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }
}

impl CellGrid for RawGrid {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, idx: usize) -> &[Cell] {
        &self.rows[idx]
    }
}
