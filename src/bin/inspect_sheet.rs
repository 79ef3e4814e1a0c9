use clap::Parser;
use inflation_panel::grid::{Cell, CellGrid, NamedSheet, SheetLoader, XlsxLoader};
use inflation_panel::process::{locate_data_row, locate_period_header, Frequency};
use std::{path::PathBuf, process::exit};

/// Print the raw layout of a workbook, tab by tab.
#[derive(Parser)]
#[command(author, version, about = "Peek at the raw cells of a workbook")]
struct Args {
    workbook: PathBuf,
    /// Also locate the period header and data row (`monthly` or `quarterly`).
    #[arg(long)]
    grammar: Option<Frequency>,
    /// Rows shown per tab.
    #[arg(long, default_value_t = 8)]
    rows: usize,
    /// Columns shown per row.
    #[arg(long, default_value_t = 6)]
    cols: usize,
}

fn main() {
    let args = Args::parse();
    let sheets = match XlsxLoader.load(&args.workbook) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    println!("=== Workbook: {} ===", args.workbook.display());
    println!("Tabs: {}", sheets.len());
    for sheet in &sheets {
        println!();
        print_sheet(sheet, &args);
    }
}

fn print_sheet(sheet: &NamedSheet, args: &Args) {
    let grid = &sheet.grid;
    println!("--- {} ---", sheet.name);
    println!("Shape: {} rows x {} cols", grid.row_count(), grid.col_count());

    for r in 0..grid.row_count().min(args.rows) {
        let shown: Vec<String> = grid
            .row(r)
            .iter()
            .take(args.cols)
            .map(render)
            .collect();
        println!("{:>4} | {}", r, shown.join(" | "));
    }

    let Some(frequency) = args.grammar else {
        return;
    };
    match locate_period_header(grid, frequency) {
        Ok(header) => {
            let first: Vec<String> = header
                .columns
                .iter()
                .zip(&header.labels)
                .take(5)
                .map(|(c, l)| format!("{c}:{l}"))
                .collect();
            println!(
                "{} header at row {} ({} periods), first columns: {}",
                frequency,
                header.row,
                header.columns.len(),
                first.join(", ")
            );
            match locate_data_row(grid, header.row, &header.columns) {
                Ok(row) => println!("Data row: {}", row),
                Err(e) => println!("Data row: {}", e),
            }
        }
        Err(e) => println!("Header: {}", e),
    }
}

fn render(cell: &Cell) -> String {
    match cell {
        Cell::Empty => "·".to_string(),
        Cell::Number(v) => v.to_string(),
        Cell::Text(s) => {
            let s = s.trim();
            if s.chars().count() > 24 {
                format!("{}…", s.chars().take(23).collect::<String>())
            } else {
                s.to_string()
            }
        }
        Cell::DateTime(dt) => dt.to_string(),
    }
}
