// Reading the source workbook into plain tables.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use exam_tables::{Cell, Table};

use crate::unify::{ExportResult, OpeningExcelSnafu, ReadingSheetSnafu};

/// Reads every sheet of the workbook, in workbook order. The first row
/// of each sheet is its header.
pub fn read_workbook(path: &str) -> ExportResult<Vec<(String, Table)>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let names = workbook.sheet_names().to_vec();
    debug!("read_workbook: path: {:?} sheets: {:?}", path, names);

    let mut sheets: Vec<(String, Table)> = Vec::new();
    for name in names {
        let range = match workbook.worksheet_range(&name) {
            Some(r) => r.context(ReadingSheetSnafu {
                path,
                sheet: name.clone(),
            })?,
            None => continue,
        };
        let table = to_table(&range);
        debug!(
            "read_workbook: sheet {:?}: {} columns, {} rows",
            name,
            table.columns.len(),
            table.rows.len()
        );
        sheets.push((name, table));
    }
    Ok(sheets)
}

fn to_table(range: &calamine::Range<DataType>) -> Table {
    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header.iter().map(|c| to_cell(c).render()).collect(),
        None => Vec::new(),
    };
    let width = columns.len();
    let rows: Vec<Vec<Cell>> = rows_iter
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(to_cell).collect();
            // Pad to the header width so that column positions always resolve.
            while cells.len() < width {
                cells.push(Cell::Empty);
            }
            cells
        })
        .collect();
    Table { columns, rows }
}

fn to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(format!("{}", other)),
    }
}
