//! Workbook loader - Excel (.xlsx) bytes → Table

use crate::error::{BacklogError, BacklogResult};
use crate::types::{CellValue, InputKind, Table};
use calamine::{CellErrorType, Data, Range, Reader, Xlsx};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Parse the first worksheet of an .xlsx byte stream into a table.
///
/// The first row is the header; column names and order are kept exactly as
/// authored. Cells keep their native type (text, number, boolean, date).
pub fn load_table(bytes: &[u8], input: InputKind) -> BacklogResult<Table> {
    load_labeled_table(bytes, input.label())
}

/// Read a workbook file fully into memory, then parse it like `load_table`
pub fn load_table_from_path(path: &Path, input: InputKind) -> BacklogResult<Table> {
    let bytes = read_file(path, input.label())?;
    load_table(&bytes, input)
}

/// Load any workbook file; errors and the table are named after the file
pub fn load_workbook_file(path: &Path) -> BacklogResult<Table> {
    let label = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
    let bytes = read_file(path, &label)?;
    load_labeled_table(&bytes, &label)
}

fn read_file(path: &Path, label: &str) -> BacklogResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        BacklogError::Io(format!(
            "Failed to read {} file {}: {}",
            label,
            path.display(),
            e
        ))
    })
}

fn load_labeled_table(bytes: &[u8], label: &str) -> BacklogResult<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| BacklogError::parse(label, format!("not a valid workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| BacklogError::parse(label, "workbook has no worksheets"))?
        .map_err(|e| BacklogError::parse(label, format!("failed to read first sheet: {}", e)))?;

    let table = range_to_table(&range, label)?;
    debug!(
        input = label,
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded table"
    );
    Ok(table)
}

fn range_to_table(range: &Range<Data>, label: &str) -> BacklogResult<Table> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| BacklogError::parse(label, "sheet is empty (no header row)"))?;

    // The range starts at the first used cell; blank leading columns still count
    let offset = range.start().map_or(0, |(_, col)| col as usize);
    let empty = Data::Empty;
    let leading = || std::iter::repeat(&empty).take(offset);

    let header: Vec<&Data> = leading().chain(header).collect();
    let mut table = Table::with_columns(label, header_names(&header));

    for row in rows {
        let cells: Vec<CellValue> = leading().chain(row).map(convert_cell).collect();
        table.push_row(cells);
    }

    // Trailing blank rows carry no data
    while table
        .rows
        .last()
        .is_some_and(|r| r.iter().all(CellValue::is_empty))
    {
        table.rows.pop();
    }

    Ok(table)
}

/// Header names with the usual dataframe conventions: blank headers become
/// `Unnamed: <index>` and repeated names get `.1`, `.2`, ... suffixes.
fn header_names(header: &[&Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match *cell {
                Data::String(s) => s.clone(),
                Data::Int(i) => i.to_string(),
                Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                    format!("{}", *f as i64)
                }
                Data::Float(f) => f.to_string(),
                Data::Bool(true) => "True".to_string(),
                Data::Bool(false) => "False".to_string(),
                Data::DateTime(dt) => dt.as_f64().to_string(),
                Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
                Data::Error(e) => e.to_string(),
                Data::Empty => format!("Unnamed: {}", idx),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(CellErrorType::NA) => CellValue::Empty,
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
