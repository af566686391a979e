//! Reconciliation settings
//!
//! Every column name the pipeline relies on lives here, so a drifted input
//! schema is fixed with a YAML file instead of a rebuild. All fields default
//! to the layout of the weekly backlog export.

use crate::error::{BacklogError, BacklogResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Excel caps worksheet names at 31 characters
const MAX_SHEET_NAME_LEN: usize = 31;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Composite identity of a backlog line
    pub key_columns: Vec<String>,
    pub remaining_backlog_column: String,
    pub delta_column: String,
    /// Fields that get a `<field>_diff` flag. `None` derives them from the
    /// previous backlog's non-key columns that also exist in the current one.
    pub comparable_fields: Option<Vec<String>>,
    /// Columns removed from the Comparison sheet before writing
    pub hidden_columns: Vec<String>,
    pub roster: RosterColumns,
    pub teco: TecoColumns,
    pub sheets: SheetNames,
    /// RGB fill for changed deltas
    pub highlight_color: u32,
    pub file_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    /// Backlog column matched against `join_column`
    pub backlog_column: String,
    pub join_column: String,
    pub first_name_column: String,
    pub last_name_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TecoColumns {
    pub join_columns: Vec<String>,
    pub status_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub comparison: String,
    pub new_items: String,
    pub solved_items: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            key_columns: strings(&["Sales Order", "CLI", "WBS Element"]),
            remaining_backlog_column: "Remaining Backlog".to_string(),
            delta_column: "Remaining Backlog Delta".to_string(),
            comparable_fields: None,
            hidden_columns: strings(&[
                "_merge",
                "Sales Organization_diff",
                "CLI Start Date_diff",
                "CLI End Date_diff",
                "Measurement customer Name 1_diff",
                "Item Status_diff",
                "Item Net Value LC_diff",
                "Total invoiced_diff",
                "Invoiced Currency_diff",
                "Remaining Backlog_diff",
                "Contract Currency_diff",
                "Sales Document",
            ]),
            roster: RosterColumns::default(),
            teco: TecoColumns::default(),
            sheets: SheetNames::default(),
            highlight_color: 0xFFFF00,
            file_prefix: "Backlog_analysis".to_string(),
        }
    }
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            backlog_column: "Sales Order".to_string(),
            join_column: "Sales Document".to_string(),
            first_name_column: "Eng Mgr - First name".to_string(),
            last_name_column: "Eng Mgr - Last name".to_string(),
        }
    }
}

impl Default for TecoColumns {
    fn default() -> Self {
        Self {
            join_columns: strings(&["Sales Order", "WBS Element"]),
            status_column: "Item Status".to_string(),
        }
    }
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            comparison: "Comparison".to_string(),
            new_items: "New Items".to_string(),
            solved_items: "Solved Items".to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Load a YAML config file; unspecified fields keep their defaults
    pub fn load(path: &Path) -> BacklogResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BacklogError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> BacklogResult<Self> {
        let config: ReconcileConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> BacklogResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> BacklogResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> BacklogResult<()> {
        if self.key_columns.is_empty() {
            return Err(BacklogError::Config(
                "key_columns must name at least one column".to_string(),
            ));
        }
        if self.teco.join_columns.is_empty() {
            return Err(BacklogError::Config(
                "teco.join_columns must name at least one column".to_string(),
            ));
        }
        if self.delta_column.is_empty() {
            return Err(BacklogError::Config("delta_column is empty".to_string()));
        }

        let names = [
            &self.sheets.comparison,
            &self.sheets.new_items,
            &self.sheets.solved_items,
        ];
        let mut seen = HashSet::new();
        for name in names {
            if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
                return Err(BacklogError::Config(format!(
                    "Sheet name '{}' must be 1-{} characters",
                    name, MAX_SHEET_NAME_LEN
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(BacklogError::Config(format!(
                    "Duplicate sheet name '{}'",
                    name
                )));
            }
        }
        if self.highlight_color > 0xFFFFFF {
            return Err(BacklogError::Config(format!(
                "highlight_color {:#X} is not an RGB value",
                self.highlight_color
            )));
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
