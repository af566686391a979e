//! Reconciliation core: key partition, change detection and lookups

pub mod enricher;
pub mod join;
pub mod reconciler;

pub use enricher::{attach_closure_status, attach_managers, enrich, EnrichedReport};
pub use join::left_join;
pub use reconciler::{backlog_delta, reconcile_backlogs, ReconcileStats, Reconciliation};
