//! Report workbook builder - three tables → highlighted .xlsx bytes

use crate::config::ReconcileConfig;
use crate::core::EnrichedReport;
use crate::error::{BacklogError, BacklogResult};
use crate::types::{CellValue, Table};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, FormatPattern, Workbook, Worksheet};
use tracing::debug;

/// Content type of the generated workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Suggested download name, e.g. `Backlog_analysis_19102026.xlsx`
pub fn report_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.xlsx", prefix, date.format("%d%m%Y"))
}

/// Remove the hidden technical columns from the comparison table.
/// Names that are not present are skipped.
pub fn prune_comparison(table: &mut Table, config: &ReconcileConfig) -> Vec<String> {
    let dropped = table.drop_columns(&config.hidden_columns);
    debug!(?dropped, "pruned comparison columns");
    dropped
}

/// A delta cell is highlighted unless it holds exactly the number 0
pub fn needs_highlight(value: &CellValue) -> bool {
    !matches!(value, CellValue::Number(n) if *n == 0.0)
}

/// Data rows (0-based, header excluded) whose `column` cell gets highlighted.
/// Empty when the column does not exist.
pub fn highlighted_rows(table: &Table, column: &str) -> Vec<usize> {
    let Some(values) = table.column_values(column) else {
        return Vec::new();
    };
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| needs_highlight(v))
        .map(|(i, _)| i)
        .collect()
}

/// Cell styles shared by all sheets
struct ReportFormats {
    header: Format,
    date: Format,
    highlight: Format,
    highlight_date: Format,
}

impl ReportFormats {
    fn new(highlight_color: u32) -> Self {
        let fill = |format: Format| {
            format
                .set_pattern(FormatPattern::Solid)
                .set_background_color(highlight_color)
        };
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(DATE_FORMAT),
            highlight: fill(Format::new()),
            highlight_date: fill(Format::new().set_num_format(DATE_FORMAT)),
        }
    }
}

/// Serializes the enriched tables into the report workbook
pub struct ReportBuilder<'a> {
    config: &'a ReconcileConfig,
    formats: ReportFormats,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(config: &'a ReconcileConfig) -> Self {
        Self {
            config,
            formats: ReportFormats::new(config.highlight_color),
        }
    }

    /// Build the workbook: Comparison, New Items, Solved Items (in that
    /// order), with the delta column highlighted on the comparison sheet.
    pub fn build(&self, report: &EnrichedReport) -> BacklogResult<Vec<u8>> {
        let sheets = &self.config.sheets;
        let mut workbook = Workbook::new();

        self.write_sheet(
            &mut workbook,
            &sheets.comparison,
            &report.comparison,
            Some(&self.config.delta_column),
        )?;
        self.write_sheet(&mut workbook, &sheets.new_items, &report.new_items, None)?;
        self.write_sheet(&mut workbook, &sheets.solved_items, &report.solved_items, None)?;

        workbook
            .save_to_buffer()
            .map_err(|e| BacklogError::Serialization(format!("Failed to create workbook: {}", e)))
    }

    fn write_sheet(
        &self,
        workbook: &mut Workbook,
        name: &str,
        table: &Table,
        highlight_column: Option<&str>,
    ) -> BacklogResult<()> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name).map_err(|e| {
            BacklogError::Serialization(format!("Failed to set worksheet name '{}': {}", name, e))
        })?;

        for (col, header) in table.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, to_col(col)?, header.as_str(), &self.formats.header)
                .map_err(|e| {
                    BacklogError::Serialization(format!("Failed to write header: {}", e))
                })?;
        }

        // First matching header only
        let highlight_idx = highlight_column.and_then(|c| table.column_index(c));
        if highlight_column.is_some() && highlight_idx.is_none() {
            debug!(sheet = name, "no delta column, highlighting skipped");
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = to_row(row_idx + 1)?;
            for (col, value) in row.iter().enumerate() {
                let highlighted = highlight_idx == Some(col) && needs_highlight(value);
                self.write_cell(worksheet, row_num, to_col(col)?, value, highlighted)
                    .map_err(|e| {
                        BacklogError::Serialization(format!(
                            "Failed to write {} cell ({}, {}): {}",
                            name,
                            row_num,
                            col,
                            e
                        ))
                    })?;
            }
        }

        Ok(())
    }

    /// Write a single cell; empty cells are only written when highlighted
    fn write_cell(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        value: &CellValue,
        highlighted: bool,
    ) -> Result<(), rust_xlsxwriter::XlsxError> {
        let formats = &self.formats;
        match (value, highlighted) {
            (CellValue::Empty, false) => {}
            (CellValue::Empty, true) => {
                worksheet.write_blank(row, col, &formats.highlight)?;
            }
            (CellValue::Text(s), false) => {
                worksheet.write_string(row, col, s.as_str())?;
            }
            (CellValue::Text(s), true) => {
                worksheet.write_string_with_format(row, col, s.as_str(), &formats.highlight)?;
            }
            (CellValue::Number(n), false) => {
                worksheet.write_number(row, col, *n)?;
            }
            (CellValue::Number(n), true) => {
                worksheet.write_number_with_format(row, col, *n, &formats.highlight)?;
            }
            (CellValue::Bool(b), false) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            (CellValue::Bool(b), true) => {
                worksheet.write_boolean_with_format(row, col, *b, &formats.highlight)?;
            }
            (CellValue::Date(serial), false) => {
                worksheet.write_number_with_format(row, col, *serial, &formats.date)?;
            }
            (CellValue::Date(serial), true) => {
                worksheet.write_number_with_format(row, col, *serial, &formats.highlight_date)?;
            }
        }
        Ok(())
    }
}

fn to_row(idx: usize) -> BacklogResult<u32> {
    u32::try_from(idx)
        .map_err(|_| BacklogError::Serialization(format!("Row {} exceeds sheet limits", idx)))
}

fn to_col(idx: usize) -> BacklogResult<u16> {
    u16::try_from(idx)
        .map_err(|_| BacklogError::Serialization(format!("Column {} exceeds sheet limits", idx)))
}
