//! Left join between a base table and a lookup table
//!
//! Column naming follows dataframe merge rules: the result keeps every base
//! column, then the lookup's key columns whose name differs from the base key
//! they match, then the requested lookup columns. A lookup column whose name
//! already exists in the base gets `_y`, and the base column gets `_x`.

use crate::error::BacklogResult;
use crate::types::{CellValue, RowKey, Table};
use std::collections::HashMap;

pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

/// Row indices grouped by key, in table order
pub(crate) fn index_rows(table: &Table, key_indices: &[usize]) -> HashMap<RowKey, Vec<usize>> {
    let mut index: HashMap<RowKey, Vec<usize>> = HashMap::new();
    for row in 0..table.row_count() {
        index
            .entry(table.key_of(row, key_indices))
            .or_default()
            .push(row);
    }
    index
}

/// Left join `side` onto `base`.
///
/// `on` pairs a base column with a lookup column. Every base row appears at
/// least once: unmatched rows get empty lookup cells, a key matching several
/// lookup rows yields one output row per match.
pub fn left_join(
    base: &Table,
    side: &Table,
    on: &[(&str, &str)],
    take: &[&str],
    stage: &str,
) -> BacklogResult<Table> {
    let mut base_keys = Vec::with_capacity(on.len());
    let mut side_keys = Vec::with_capacity(on.len());
    for (left, right) in on {
        base_keys.push(base.require_column(left, stage)?);
        side_keys.push(side.require_column(right, stage)?);
    }

    // Lookup columns carried into the result: distinct-named keys, then `take`
    let mut carried: Vec<(String, usize)> = Vec::new();
    for ((left, right), &idx) in on.iter().zip(&side_keys) {
        if left != right {
            carried.push((right.to_string(), idx));
        }
    }
    for name in take {
        carried.push((name.to_string(), side.require_column(name, stage)?));
    }

    let shared_keys: Vec<&str> = on
        .iter()
        .filter(|(l, r)| l == r)
        .map(|(l, _)| *l)
        .collect();
    let collides =
        |name: &str| !shared_keys.contains(&name) && carried.iter().any(|(c, _)| c == name);

    let mut columns: Vec<String> = base
        .columns
        .iter()
        .map(|c| {
            if collides(c) {
                format!("{}{}", c, LEFT_SUFFIX)
            } else {
                c.clone()
            }
        })
        .collect();
    for (name, _) in &carried {
        if base.has_column(name) && !shared_keys.contains(&name.as_str()) {
            columns.push(format!("{}{}", name, RIGHT_SUFFIX));
        } else {
            columns.push(name.clone());
        }
    }

    let lookup = index_rows(side, &side_keys);
    let mut joined = Table::with_columns(base.name.clone(), columns);

    for (i, row) in base.rows.iter().enumerate() {
        match lookup.get(&base.key_of(i, &base_keys)) {
            Some(matches) => {
                for &j in matches {
                    let mut out = row.clone();
                    out.extend(carried.iter().map(|(_, idx)| side.rows[j][*idx].clone()));
                    joined.push_row(out);
                }
            }
            None => {
                let mut out = row.clone();
                out.resize(row.len() + carried.len(), CellValue::Empty);
                joined.push_row(out);
            }
        }
    }

    Ok(joined)
}
