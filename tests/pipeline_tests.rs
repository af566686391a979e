//! End-to-end pipeline tests
//!
//! Inputs are generated in memory with rust_xlsxwriter and the report is read
//! back with calamine, so these cover loader → reconcile → enrich → report.

use backlog_check::config::ReconcileConfig;
use backlog_check::error::BacklogError;
use backlog_check::excel::highlighted_rows;
use backlog_check::pipeline::{reconcile, reconcile_files, InputPaths, InputTables};
use backlog_check::types::{CellValue, Table};
use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::collections::HashSet;
use std::io::Cursor;
use tempfile::TempDir;

const BACKLOG_COLUMNS: [&str; 5] = [
    "Sales Order",
    "CLI",
    "WBS Element",
    "Item Status",
    "Remaining Backlog",
];

fn workbook(columns: &[&str], rows: &[Vec<CellValue>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, value) in row.iter().enumerate() {
            let c = c as u16;
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    sheet.write_string(r, c, s.as_str()).unwrap();
                }
                CellValue::Number(n) | CellValue::Date(n) => {
                    sheet.write_number(r, c, *n).unwrap();
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(r, c, *b).unwrap();
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn line(
    so: &str,
    cli: &str,
    wbs: &str,
    status: &str,
    backlog: impl Into<CellValue>,
) -> Vec<CellValue> {
    vec![so.into(), cli.into(), wbs.into(), status.into(), backlog.into()]
}

fn roster_bytes(rows: &[(&str, &str, &str)]) -> Vec<u8> {
    let rows: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|(doc, first, last)| vec![(*doc).into(), (*first).into(), (*last).into()])
        .collect();
    workbook(
        &["Sales Document", "Eng Mgr - First name", "Eng Mgr - Last name"],
        &rows,
    )
}

fn teco_bytes(rows: &[(&str, &str, &str)]) -> Vec<u8> {
    let rows: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|(so, wbs, status)| vec![(*so).into(), (*wbs).into(), (*status).into()])
        .collect();
    workbook(&["Sales Order", "WBS Element", "Item Status"], &rows)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn inputs(previous: &[Vec<CellValue>], current: &[Vec<CellValue>]) -> InputTables {
    InputTables::from_bytes(
        &workbook(&BACKLOG_COLUMNS, previous),
        &workbook(&BACKLOG_COLUMNS, current),
        &roster_bytes(&[("SO1", "Ada", "Lovelace"), ("SO3", "Alan", "Turing")]),
        &teco_bytes(&[("SO3", "WBS3", "TECO")]),
    )
    .unwrap()
}

fn strings(table: &Table, column: &str) -> Vec<String> {
    table
        .column_values(column)
        .unwrap()
        .iter()
        .map(|v| v.to_string())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_changed_backlog_and_new_line() {
    let inputs = inputs(
        &[line("SO1", "CLI1", "WBS1", "REL", 100.0)],
        &[
            line("SO1", "CLI1", "WBS1", "REL", 80.0),
            line("SO2", "CLI2", "WBS2", "REL", 50.0),
        ],
    );

    let outcome = reconcile(&inputs, &ReconcileConfig::default(), date()).unwrap();

    assert_eq!(outcome.comparison.row_count(), 1);
    assert_eq!(
        outcome.comparison.cell(0, "Remaining Backlog Delta"),
        Some(&CellValue::Number(20.0))
    );
    assert_eq!(
        highlighted_rows(&outcome.comparison, "Remaining Backlog Delta"),
        vec![0]
    );
    assert_eq!(strings(&outcome.new_items, "Sales Order"), vec!["SO2"]);
    assert_eq!(strings(&outcome.new_items, "WBS Element"), vec!["WBS2"]);
    assert!(outcome.solved_items.is_empty());
    assert_eq!(outcome.file_name, "Backlog_analysis_19102026.xlsx");
    assert_eq!(
        outcome.content_type(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn test_solved_line_gets_manager_and_teco_status() {
    let inputs = inputs(
        &[
            line("SO1", "CLI1", "WBS1", "REL", 10.0),
            line("SO3", "CLI3", "WBS3", "REL", 5.0),
        ],
        &[line("SO1", "CLI1", "WBS1", "REL", 10.0)],
    );

    let outcome = reconcile(&inputs, &ReconcileConfig::default(), date()).unwrap();
    let solved = &outcome.solved_items;

    assert_eq!(solved.row_count(), 1);
    assert_eq!(solved.cell(0, "Sales Order"), Some(&CellValue::from("SO3")));
    assert_eq!(solved.cell(0, "Eng Mgr - First name"), Some(&CellValue::from("Alan")));
    assert_eq!(solved.cell(0, "Eng Mgr - Last name"), Some(&CellValue::from("Turing")));
    // Backlog and TECO both carry Item Status
    assert_eq!(solved.cell(0, "Item Status_x"), Some(&CellValue::from("REL")));
    assert_eq!(solved.cell(0, "Item Status_y"), Some(&CellValue::from("TECO")));
    assert!(!solved.has_column("Sales Document"));
}

#[test]
fn test_comparison_columns_after_pruning() {
    let inputs = inputs(
        &[line("SO1", "CLI1", "WBS1", "REL", 100.0)],
        &[line("SO1", "CLI1", "WBS1", "REL", 100.0)],
    );

    let outcome = reconcile(&inputs, &ReconcileConfig::default(), date()).unwrap();

    assert_eq!(
        outcome.comparison.columns,
        vec![
            "Sales Order",
            "CLI",
            "WBS Element",
            "Item Status_x",
            "Remaining Backlog_x",
            "Item Status_y",
            "Remaining Backlog_y",
            "Remaining Backlog Delta",
            "Eng Mgr - First name",
            "Eng Mgr - Last name",
        ]
    );
    assert!(highlighted_rows(&outcome.comparison, "Remaining Backlog Delta").is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_every_key_lands_in_exactly_one_output() {
    let previous = vec![
        line("SO1", "CLI1", "WBS1", "REL", 1.0),
        line("SO2", "CLI2", "WBS2", "REL", 2.0),
        line("SO3", "CLI3", "WBS3", "REL", 3.0),
        line("SO4", "CLI4", "WBS4", "REL", 4.0),
    ];
    let current = vec![
        line("SO2", "CLI2", "WBS2", "REL", 2.0),
        line("SO4", "CLI4", "WBSX", "REL", 4.0),
        line("SO5", "CLI5", "WBS5", "REL", 5.0),
    ];
    let outcome = reconcile(&inputs(&previous, &current), &ReconcileConfig::default(), date())
        .unwrap();

    let keys = |t: &Table| -> HashSet<(String, String, String)> {
        let so = strings(t, "Sales Order");
        let cli = strings(t, "CLI");
        let wbs = strings(t, "WBS Element");
        so.into_iter()
            .zip(cli)
            .zip(wbs)
            .map(|((a, b), c)| (a, b, c))
            .collect()
    };
    let comparison = keys(&outcome.comparison);
    let new_items = keys(&outcome.new_items);
    let solved = keys(&outcome.solved_items);

    assert!(comparison.is_disjoint(&new_items));
    assert!(comparison.is_disjoint(&solved));
    assert!(new_items.is_disjoint(&solved));
    assert_eq!(comparison.len() + new_items.len() + solved.len(), 6);
    assert_eq!(strings(&outcome.solved_items, "Sales Order"), vec!["SO1", "SO3", "SO4"]);
    assert_eq!(strings(&outcome.new_items, "Sales Order"), vec!["SO4", "SO5"]);
}

#[test]
fn test_delta_and_highlight_laws() {
    let previous = vec![
        line("SO1", "C", "W", "REL", 100.0),
        line("SO2", "C", "W", "REL", 50.0),
        line("SO3", "C", "W", "REL", CellValue::Empty),
        line("SO4", "C", "W", "REL", "pending"),
    ];
    let current = vec![
        line("SO1", "C", "W", "REL", 40.5),
        line("SO2", "C", "W", "REL", 50.0),
        line("SO3", "C", "W", "REL", 7.0),
        line("SO4", "C", "W", "REL", 1.0),
    ];
    let outcome = reconcile(&inputs(&previous, &current), &ReconcileConfig::default(), date())
        .unwrap();

    let deltas: Vec<CellValue> = outcome
        .comparison
        .column_values("Remaining Backlog Delta")
        .unwrap()
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(
        deltas,
        vec![
            CellValue::Number(59.5),
            CellValue::Number(0.0),
            CellValue::Empty,
            CellValue::Empty,
        ]
    );
    assert_eq!(
        highlighted_rows(&outcome.comparison, "Remaining Backlog Delta"),
        vec![0, 2, 3]
    );
    assert_eq!(outcome.stats.null_deltas, 2);
}

#[test]
fn test_empty_roster_keeps_rows_with_empty_names() {
    let tables = InputTables::from_bytes(
        &workbook(&BACKLOG_COLUMNS, &[line("SO1", "C", "W", "REL", 1.0)]),
        &workbook(
            &BACKLOG_COLUMNS,
            &[
                line("SO1", "C", "W", "REL", 1.0),
                line("SO2", "C", "W", "REL", 1.0),
            ],
        ),
        &roster_bytes(&[]),
        &teco_bytes(&[]),
    )
    .unwrap();

    let outcome = reconcile(&tables, &ReconcileConfig::default(), date()).unwrap();

    assert_eq!(outcome.comparison.row_count(), 1);
    assert_eq!(outcome.new_items.row_count(), 1);
    for table in [&outcome.comparison, &outcome.new_items] {
        assert!(table
            .column_values("Eng Mgr - Last name")
            .unwrap()
            .iter()
            .all(|v| v.is_empty()));
    }
}

#[test]
fn test_same_inputs_same_report() {
    let tables = inputs(
        &[line("SO1", "C", "W", "REL", 3.0), line("SO3", "CLI3", "WBS3", "REL", 1.0)],
        &[line("SO1", "C", "W", "REL", 2.0), line("SO2", "C", "W", "REL", 1.0)],
    );
    let config = ReconcileConfig::default();

    let first = reconcile(&tables, &config, date()).unwrap();
    let second = reconcile(&tables, &config, date()).unwrap();

    assert_eq!(first.file_name, second.file_name);
    assert_eq!(first.comparison, second.comparison);
    assert_eq!(first.new_items, second.new_items);
    assert_eq!(first.solved_items, second.solved_items);
    for sheet in ["Comparison", "New Items", "Solved Items"] {
        assert_eq!(read_sheet(&first.artifact, sheet), read_sheet(&second.artifact, sheet));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REPORT WORKBOOK
// ═══════════════════════════════════════════════════════════════════════════

fn read_sheet(bytes: &[u8], sheet: &str) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range.rows().map(|r| r.to_vec()).collect()
}

#[test]
fn test_report_workbook_contents() {
    let tables = inputs(
        &[line("SO1", "CLI1", "WBS1", "REL", 100.0)],
        &[
            line("SO1", "CLI1", "WBS1", "REL", 80.0),
            line("SO2", "CLI2", "WBS2", "REL", 50.0),
        ],
    );
    let outcome = reconcile(&tables, &ReconcileConfig::default(), date()).unwrap();

    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(outcome.artifact.clone())).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["Comparison", "New Items", "Solved Items"]
    );

    let comparison = read_sheet(&outcome.artifact, "Comparison");
    let delta_col = outcome
        .comparison
        .column_index("Remaining Backlog Delta")
        .unwrap();
    assert_eq!(
        comparison[0][delta_col],
        Data::String("Remaining Backlog Delta".to_string())
    );
    assert_eq!(comparison[1][delta_col], Data::Float(20.0));
    assert_eq!(comparison[1][0], Data::String("SO1".to_string()));

    let new_items = read_sheet(&outcome.artifact, "New Items");
    assert_eq!(new_items.len(), 2);
    assert_eq!(new_items[1][0], Data::String("SO2".to_string()));

    // Header only
    let solved = read_sheet(&outcome.artifact, "Solved Items");
    assert_eq!(solved.len(), 1);
}

#[test]
fn test_custom_sheet_names_and_prefix() {
    let config = ReconcileConfig::from_yaml(
        "file_prefix: Weekly\nsheets:\n  comparison: Matched\n  new_items: Added\n  solved_items: Closed\n",
    )
    .unwrap();
    let tables = inputs(&[line("SO1", "C", "W", "REL", 1.0)], &[]);

    let outcome = reconcile(&tables, &config, date()).unwrap();

    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(outcome.artifact)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Matched", "Added", "Closed"]);
    assert_eq!(outcome.file_name, "Weekly_19102026.xlsx");
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_key_column_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let write = |name: &str, bytes: Vec<u8>| {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    };
    let paths = InputPaths {
        previous: write(
            "prev.xlsx",
            workbook(&["Sales Order", "CLI"], &[vec!["SO1".into(), "C".into()]]),
        ),
        current: write(
            "curr.xlsx",
            workbook(&BACKLOG_COLUMNS, &[line("SO1", "C", "W", "REL", 1.0)]),
        ),
        roster: write("eng_mgr.xlsx", roster_bytes(&[])),
        teco: write("teco.xlsx", teco_bytes(&[])),
    };

    let err = reconcile_files(&paths, &ReconcileConfig::default(), date()).unwrap_err();

    match err {
        BacklogError::Schema { input, column, .. } => {
            assert_eq!(input, "Previous Backlog");
            assert_eq!(column, "WBS Element");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let reports: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("Backlog_analysis"))
        .collect();
    assert!(reports.is_empty());
}

#[test]
fn test_roster_without_key_column_is_schema_error() {
    let result = InputTables::from_bytes(
        &workbook(&BACKLOG_COLUMNS, &[line("SO1", "C", "W", "REL", 1.0)]),
        &workbook(&BACKLOG_COLUMNS, &[line("SO2", "C", "W", "REL", 1.0)]),
        &workbook(&["Document", "Eng Mgr - First name", "Eng Mgr - Last name"], &[]),
        &teco_bytes(&[]),
    )
    .and_then(|tables| reconcile(&tables, &ReconcileConfig::default(), date()));

    let err = result.unwrap_err();
    assert!(err.to_string().contains("Engagement Manager Roster"));
    assert!(err.to_string().contains("Sales Document"));
}

#[test]
fn test_garbage_input_is_parse_error() {
    let result = InputTables::from_bytes(
        b"not a workbook",
        &workbook(&BACKLOG_COLUMNS, &[]),
        &roster_bytes(&[]),
        &teco_bytes(&[]),
    );
    match result {
        Err(BacklogError::Parse { input, .. }) => assert_eq!(input, "Previous Backlog"),
        other => panic!("unexpected result: {other:?}"),
    }
}
