//! Manager and closure-status lookups for the reconciled tables

use crate::config::ReconcileConfig;
use crate::core::join::left_join;
use crate::core::reconciler::{ReconcileStats, Reconciliation};
use crate::error::BacklogResult;
use crate::types::Table;
use tracing::info;

/// The three output tables after enrichment, ready for the report
#[derive(Debug, Clone)]
pub struct EnrichedReport {
    pub comparison: Table,
    pub new_items: Table,
    pub solved_items: Table,
    pub stats: ReconcileStats,
}

/// Left join engagement-manager first/last name on the roster's sales document
pub fn attach_managers(
    base: &Table,
    roster: &Table,
    config: &ReconcileConfig,
) -> BacklogResult<Table> {
    let columns = &config.roster;
    left_join(
        base,
        roster,
        &[(
            columns.backlog_column.as_str(),
            columns.join_column.as_str(),
        )],
        &[
            columns.first_name_column.as_str(),
            columns.last_name_column.as_str(),
        ],
        "manager enrichment",
    )
}

/// Left join the TECO item status on (Sales Order, WBS Element)
pub fn attach_closure_status(
    solved: &Table,
    teco: &Table,
    config: &ReconcileConfig,
) -> BacklogResult<Table> {
    let on: Vec<(&str, &str)> = config
        .teco
        .join_columns
        .iter()
        .map(|c| (c.as_str(), c.as_str()))
        .collect();
    left_join(
        solved,
        teco,
        &on,
        &[config.teco.status_column.as_str()],
        "closure status enrichment",
    )
}

/// Enrich all three tables. The roster key column is dropped from New and
/// Solved items here; on the comparison it goes with the hidden columns.
pub fn enrich(
    reconciliation: Reconciliation,
    roster: &Table,
    teco: &Table,
    config: &ReconcileConfig,
) -> BacklogResult<EnrichedReport> {
    let roster_key = [config.roster.join_column.as_str()];

    let comparison = attach_managers(&reconciliation.comparison, roster, config)?;

    let mut new_items = attach_managers(&reconciliation.new_items, roster, config)?;
    new_items.drop_columns(&roster_key);

    let mut solved_items = attach_managers(&reconciliation.solved_items, roster, config)?;
    solved_items.drop_columns(&roster_key);
    let solved_items = attach_closure_status(&solved_items, teco, config)?;

    info!(
        comparison = comparison.row_count(),
        new = new_items.row_count(),
        solved = solved_items.row_count(),
        "tables enriched"
    );

    Ok(EnrichedReport {
        comparison,
        new_items,
        solved_items,
        stats: reconciliation.stats,
    })
}
