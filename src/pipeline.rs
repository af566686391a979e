//! End-to-end backlog check: load → reconcile → enrich → report
//!
//! `reconcile` is a pure function of its four tables, the configuration and
//! the invocation date. Nothing is retained between calls.

use crate::config::ReconcileConfig;
use crate::core::{enrich, reconcile_backlogs, ReconcileStats};
use crate::error::{BacklogError, BacklogResult};
use crate::excel::{
    load_table, load_table_from_path, prune_comparison, report_file_name, ReportBuilder,
    XLSX_CONTENT_TYPE,
};
use crate::types::{InputKind, Table};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The four input tables, fully loaded
#[derive(Debug, Clone)]
pub struct InputTables {
    pub previous: Table,
    pub current: Table,
    pub roster: Table,
    pub teco: Table,
}

/// Locations of the four input workbooks
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub previous: PathBuf,
    pub current: PathBuf,
    pub roster: PathBuf,
    pub teco: PathBuf,
}

impl InputTables {
    /// Parse four in-memory workbooks
    pub fn from_bytes(
        previous: &[u8],
        current: &[u8],
        roster: &[u8],
        teco: &[u8],
    ) -> BacklogResult<Self> {
        Ok(Self {
            previous: load_table(previous, InputKind::PreviousBacklog)?,
            current: load_table(current, InputKind::CurrentBacklog)?,
            roster: load_table(roster, InputKind::ManagerRoster)?,
            teco: load_table(teco, InputKind::TecoStatus)?,
        })
    }

    /// Read and parse all four files before any processing starts
    pub fn from_paths(paths: &InputPaths) -> BacklogResult<Self> {
        Ok(Self {
            previous: load_table_from_path(&paths.previous, InputKind::PreviousBacklog)?,
            current: load_table_from_path(&paths.current, InputKind::CurrentBacklog)?,
            roster: load_table_from_path(&paths.roster, InputKind::ManagerRoster)?,
            teco: load_table_from_path(&paths.teco, InputKind::TecoStatus)?,
        })
    }
}

/// Result of one run: the three tables as written, the workbook and its name
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub comparison: Table,
    pub new_items: Table,
    pub solved_items: Table,
    pub artifact: Vec<u8>,
    pub file_name: String,
    pub stats: ReconcileStats,
}

impl ReconcileOutcome {
    pub fn content_type(&self) -> &'static str {
        XLSX_CONTENT_TYPE
    }

    pub fn status_text(&self) -> String {
        format!(
            "✅ Comparison complete! {} compared, {} new, {} solved",
            self.comparison.row_count(),
            self.new_items.row_count(),
            self.solved_items.row_count()
        )
    }

    /// Write the workbook into `dir` under its suggested file name
    pub fn write_to_dir(&self, dir: &Path) -> BacklogResult<PathBuf> {
        let path = dir.join(&self.file_name);
        self.write_to(&path)?;
        Ok(path)
    }

    pub fn write_to(&self, path: &Path) -> BacklogResult<()> {
        fs::write(path, &self.artifact).map_err(|e| {
            BacklogError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// Run the whole check on loaded tables.
///
/// Structural problems (missing key or lookup columns, unwritable workbook)
/// abort with no artifact. Non-numeric backlog values only empty that row's
/// delta.
pub fn reconcile(
    inputs: &InputTables,
    config: &ReconcileConfig,
    date: NaiveDate,
) -> BacklogResult<ReconcileOutcome> {
    let reconciliation = reconcile_backlogs(&inputs.previous, &inputs.current, config)?;
    let mut report = enrich(reconciliation, &inputs.roster, &inputs.teco, config)?;
    prune_comparison(&mut report.comparison, config);

    let artifact = ReportBuilder::new(config).build(&report)?;
    let file_name = report_file_name(&config.file_prefix, date);
    info!(file = %file_name, bytes = artifact.len(), "report built");

    Ok(ReconcileOutcome {
        comparison: report.comparison,
        new_items: report.new_items,
        solved_items: report.solved_items,
        artifact,
        file_name,
        stats: report.stats,
    })
}

/// `reconcile` over four workbook files
pub fn reconcile_files(
    paths: &InputPaths,
    config: &ReconcileConfig,
    date: NaiveDate,
) -> BacklogResult<ReconcileOutcome> {
    let inputs = InputTables::from_paths(paths)?;
    reconcile(&inputs, config, date)
}

/// Local calendar date of this invocation
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
