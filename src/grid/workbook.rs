// src/grid/workbook.rs
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::debug;

use super::{Cell, CellGrid, RawGrid};
use crate::error::{ExtractError, ExtractResult};
use crate::process::date_parser::parse_datetime_text;

/// One tab of a workbook.
#[derive(Debug, Clone)]
pub struct NamedSheet {
    pub name: String,
    pub grid: RawGrid,
}

/// Source of raw sheets. The pipeline only ever asks for whole workbooks, so
/// tests can swap in an in-memory implementation.
pub trait SheetLoader: Sync {
    /// Every tab of the workbook at `path`, in workbook order.
    fn load(&self, path: &Path) -> ExtractResult<Vec<NamedSheet>>;

    /// The first tab only.
    fn load_first(&self, path: &Path) -> ExtractResult<NamedSheet> {
        self.load(path)?
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::NoSheets {
                path: path.to_path_buf(),
            })
    }
}

/// Reads `.xlsx` / `.xls` / `.ods` files through calamine.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxLoader;

impl SheetLoader for XlsxLoader {
    #[tracing::instrument(level = "debug", skip(self), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> ExtractResult<Vec<NamedSheet>> {
        let workbook_err = |source| ExtractError::Workbook {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
        let names = workbook.sheet_names();

        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            let range = workbook.worksheet_range(&name).map_err(workbook_err)?;
            let grid = grid_from_range(&range);
            debug!(
                sheet = %name,
                rows = grid.row_count(),
                cols = grid.col_count(),
                "read sheet"
            );
            sheets.push(NamedSheet { name, grid });
        }
        Ok(sheets)
    }
}

/// calamine ranges start at the first used cell; pad so indices stay absolute.
pub fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let (row0, col0) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row0 as usize];
    for r in range.rows() {
        let mut row = vec![Cell::Empty; col0 as usize];
        row.extend(r.iter().map(Cell::from));
        rows.push(row);
    }
    RawGrid::new(rows)
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => dt.as_datetime().map(Cell::DateTime).unwrap_or_default(),
            Data::DateTimeIso(s) => parse_datetime_text(s)
                .map(Cell::DateTime)
                .unwrap_or_else(|| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) | Data::Empty => Cell::Empty,
        }
    }
}
