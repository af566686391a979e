//! Backlog Check - weekly backlog reconciliation
//!
//! Compares two snapshots of a sales backlog export, keyed by
//! (Sales Order, CLI, WBS Element), and builds a three-sheet Excel report.
//!
//! # Features
//!
//! - Comparison of matched lines with per-field change flags
//! - Remaining Backlog delta, highlighted whenever it is not zero
//! - New and solved line items, enriched with engagement manager names
//! - TECO closure status for solved items
//! - Column and sheet names configurable through YAML
//!
//! # Example
//!
//! ```no_run
//! use backlog_check::config::ReconcileConfig;
//! use backlog_check::pipeline::{self, InputPaths};
//! use std::path::{Path, PathBuf};
//!
//! let paths = InputPaths {
//!     previous: PathBuf::from("prev.xlsx"),
//!     current: PathBuf::from("curr.xlsx"),
//!     roster: PathBuf::from("eng_mgr.xlsx"),
//!     teco: PathBuf::from("teco.xlsx"),
//! };
//! let config = ReconcileConfig::default();
//! let outcome = pipeline::reconcile_files(&paths, &config, pipeline::today())?;
//!
//! println!("{}", outcome.status_text());
//! outcome.write_to_dir(Path::new("reports"))?;
//! # Ok::<(), backlog_check::error::BacklogError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::ReconcileConfig;
pub use error::{BacklogError, BacklogResult};
pub use types::{CellValue, InputKind, Table};
