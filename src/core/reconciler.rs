//! Previous vs current backlog reconciliation
//!
//! Every row is classified by its composite key into exactly one of three
//! outputs: continuing (key in both snapshots), new (current only) or solved
//! (previous only). Continuing rows carry both sides, a change flag per
//! comparable field and the remaining-backlog delta.

use crate::config::ReconcileConfig;
use crate::core::join::{index_rows, LEFT_SUFFIX, RIGHT_SUFFIX};
use crate::error::{BacklogError, BacklogResult};
use crate::types::{CellValue, Table};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const STAGE: &str = "reconcile";

/// Name of the merge-indicator column on the comparison table
pub const MERGE_INDICATOR: &str = "_merge";
pub const MERGE_BOTH: &str = "both";
pub const DIFF_SUFFIX: &str = "_diff";

/// Row counts and recoveries of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub comparison_rows: usize,
    pub new_rows: usize,
    pub solved_rows: usize,
    pub compared_fields: usize,
    pub delta_computed: bool,
    /// Comparison rows whose delta is empty (missing or non-numeric operand)
    pub null_deltas: usize,
}

/// The three classified tables, before enrichment
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub comparison: Table,
    pub new_items: Table,
    pub solved_items: Table,
    pub stats: ReconcileStats,
}

/// One comparable field: diff column name plus its position on each side
#[derive(Debug, Clone, PartialEq)]
struct FieldPair {
    name: String,
    previous: usize,
    current: usize,
}

/// Where each comparison cell comes from
#[derive(Debug, Clone, Copy)]
enum Source {
    Previous(usize),
    Current(usize),
}

/// Classify `previous` and `current` by key and build the three output tables.
pub fn reconcile_backlogs(
    previous: &Table,
    current: &Table,
    config: &ReconcileConfig,
) -> BacklogResult<Reconciliation> {
    let prev_keys = previous.require_columns(&config.key_columns, STAGE)?;
    let curr_keys = current.require_columns(&config.key_columns, STAGE)?;

    let current_index = index_rows(current, &curr_keys);
    let previous_keys: HashSet<_> = (0..previous.row_count())
        .map(|i| previous.key_of(i, &prev_keys))
        .collect();

    let (mut columns, sources) = comparison_layout(previous, current, config);
    columns.push(MERGE_INDICATOR.to_string());

    let fields = comparable_fields(previous, current, config);
    columns.extend(fields.iter().map(|f| format!("{}{}", f.name, DIFF_SUFFIX)));

    let delta = delta_operands(previous, current, config);
    if delta.is_some() {
        columns.push(config.delta_column.clone());
    } else {
        debug!(
            column = %config.remaining_backlog_column,
            "delta skipped: column not present in both backlogs"
        );
    }

    let mut stats = ReconcileStats {
        compared_fields: fields.len(),
        delta_computed: delta.is_some(),
        ..Default::default()
    };

    let mut comparison = Table::with_columns(config.sheets.comparison.clone(), columns);
    let mut solved_items =
        Table::with_columns(config.sheets.solved_items.clone(), previous.columns.clone());
    let mut new_items =
        Table::with_columns(config.sheets.new_items.clone(), current.columns.clone());

    for (i, prev_row) in previous.rows.iter().enumerate() {
        let Some(matches) = current_index.get(&previous.key_of(i, &prev_keys)) else {
            solved_items.push_row(prev_row.clone());
            continue;
        };

        for &j in matches {
            let curr_row = &current.rows[j];
            let mut row: Vec<CellValue> = sources
                .iter()
                .map(|src| match *src {
                    Source::Previous(idx) => prev_row[idx].clone(),
                    Source::Current(idx) => curr_row[idx].clone(),
                })
                .collect();
            row.push(CellValue::from(MERGE_BOTH));
            row.extend(
                fields
                    .iter()
                    .map(|f| CellValue::Bool(prev_row[f.previous] != curr_row[f.current])),
            );

            if let Some((p, c)) = delta {
                let value = match backlog_delta(
                    &prev_row[p],
                    &curr_row[c],
                    &config.remaining_backlog_column,
                ) {
                    Ok(Some(d)) => CellValue::Number(d),
                    Ok(None) => CellValue::Empty,
                    Err(e) => {
                        debug!(row = i, error = %e, "delta set to empty");
                        CellValue::Empty
                    }
                };
                if value.is_empty() {
                    stats.null_deltas += 1;
                }
                row.push(value);
            }

            comparison.push_row(row);
        }
    }

    for (j, curr_row) in current.rows.iter().enumerate() {
        if !previous_keys.contains(&current.key_of(j, &curr_keys)) {
            new_items.push_row(curr_row.clone());
        }
    }

    stats.comparison_rows = comparison.row_count();
    stats.new_rows = new_items.row_count();
    stats.solved_rows = solved_items.row_count();
    info!(
        comparison = stats.comparison_rows,
        new = stats.new_rows,
        solved = stats.solved_rows,
        "backlogs reconciled"
    );

    Ok(Reconciliation {
        comparison,
        new_items,
        solved_items,
        stats,
    })
}

/// Merged header: previous columns (shared non-key ones suffixed `_x`), then
/// current non-key columns (shared ones suffixed `_y`).
fn comparison_layout(
    previous: &Table,
    current: &Table,
    config: &ReconcileConfig,
) -> (Vec<String>, Vec<Source>) {
    let is_key = |c: &String| config.key_columns.contains(c);
    let mut columns = Vec::new();
    let mut sources = Vec::new();

    for (idx, name) in previous.columns.iter().enumerate() {
        if !is_key(name) && current.has_column(name) {
            columns.push(format!("{}{}", name, LEFT_SUFFIX));
        } else {
            columns.push(name.clone());
        }
        sources.push(Source::Previous(idx));
    }
    for (idx, name) in current.columns.iter().enumerate() {
        if is_key(name) {
            continue;
        }
        if previous.has_column(name) {
            columns.push(format!("{}{}", name, RIGHT_SUFFIX));
        } else {
            columns.push(name.clone());
        }
        sources.push(Source::Current(idx));
    }

    (columns, sources)
}

/// The declared list of fields that get a change flag
fn comparable_fields(
    previous: &Table,
    current: &Table,
    config: &ReconcileConfig,
) -> Vec<FieldPair> {
    let pair = |name: &str| -> Option<FieldPair> {
        Some(FieldPair {
            name: name.to_string(),
            previous: previous.column_index(name)?,
            current: current.column_index(name)?,
        })
    };

    match &config.comparable_fields {
        Some(declared) => declared
            .iter()
            .filter_map(|name| {
                if config.key_columns.contains(name) {
                    warn!(field = %name, "key column cannot be a comparable field");
                    return None;
                }
                let found = pair(name.as_str());
                if found.is_none() {
                    warn!(field = %name, "comparable field missing from one backlog, skipped");
                }
                found
            })
            .collect(),
        None => previous
            .columns
            .iter()
            .filter(|c| !config.key_columns.contains(*c))
            .filter_map(|c| pair(c.as_str()))
            .collect(),
    }
}

/// Column positions of the remaining-backlog value, when both sides have it
fn delta_operands(
    previous: &Table,
    current: &Table,
    config: &ReconcileConfig,
) -> Option<(usize, usize)> {
    let column = &config.remaining_backlog_column;
    if config.key_columns.contains(column) {
        return None;
    }
    Some((previous.column_index(column)?, current.column_index(column)?))
}

/// previous − current. Empty operands give no delta; a non-numeric operand is
/// a `TypeMismatch`.
pub fn backlog_delta(
    previous: &CellValue,
    current: &CellValue,
    column: &str,
) -> BacklogResult<Option<f64>> {
    if previous.is_empty() || current.is_empty() {
        return Ok(None);
    }
    match (previous.as_number(), current.as_number()) {
        (Some(p), Some(c)) => Ok(Some(p - c)),
        _ => Err(BacklogError::TypeMismatch {
            column: column.to_string(),
            detail: format!(
                "cannot subtract {} from {}",
                current.type_name(),
                previous.type_name()
            ),
        }),
    }
}
