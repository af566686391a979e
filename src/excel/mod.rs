//! Excel input/output for the backlog check
//!
//! - Loader: .xlsx bytes → `Table` (first sheet, header row)
//! - Report: three tables → highlighted .xlsx bytes

pub mod loader;
pub mod report;

pub use loader::{load_table, load_table_from_path, load_workbook_file};
pub use report::{
    highlighted_rows, needs_highlight, prune_comparison, report_file_name, ReportBuilder,
    XLSX_CONTENT_TYPE,
};
