use crate::error::{BacklogError, BacklogResult};
use std::fmt;

//==============================================================================
// Inputs
//==============================================================================

/// The four tabular inputs of a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    PreviousBacklog,
    CurrentBacklog,
    ManagerRoster,
    TecoStatus,
}

impl InputKind {
    /// Human readable name used in error messages and logs
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::PreviousBacklog => "Previous Backlog",
            InputKind::CurrentBacklog => "Current Backlog",
            InputKind::ManagerRoster => "Engagement Manager Roster",
            InputKind::TecoStatus => "TECO Status",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//==============================================================================
// Cell values
//==============================================================================

/// A single scalar read from (or written to) a worksheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date-time (days since 1899-12-30)
    Date(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view used by delta computation. Dates are not numeric here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "Empty",
            CellValue::Text(_) => "Text",
            CellValue::Number(_) => "Number",
            CellValue::Bool(_) => "Boolean",
            CellValue::Date(_) => "Date",
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(serial) => write!(f, "date({})", serial),
        }
    }
}

//==============================================================================
// Row keys
//==============================================================================

/// Hashable form of one key cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Empty,
    Text(String),
    Number(u64),
    Bool(bool),
    Date(u64),
}

impl From<&CellValue> for KeyPart {
    fn from(value: &CellValue) -> Self {
        // -0.0 and 0.0 compare equal, so they must hash equal too
        let bits = |n: f64| if n == 0.0 { 0u64 } else { n.to_bits() };
        match value {
            CellValue::Empty => KeyPart::Empty,
            CellValue::Text(s) => KeyPart::Text(s.clone()),
            CellValue::Number(n) => KeyPart::Number(bits(*n)),
            CellValue::Bool(b) => KeyPart::Bool(*b),
            CellValue::Date(d) => KeyPart::Date(bits(*d)),
        }
    }
}

/// Projection of a row onto its join/identity columns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(Vec<KeyPart>);

impl RowKey {
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> Self {
        RowKey(cells.into_iter().map(KeyPart::from).collect())
    }
}

//==============================================================================
// Tables
//==============================================================================

/// An ordered sequence of rows sharing one column schema
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    /// Rows are positional against `columns`
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn with_columns<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding with empty cells up to the column count
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        if row.len() < self.columns.len() {
            row.resize(self.columns.len(), CellValue::Empty);
        }
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with this exact header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Column index, or a `Schema` error naming the input and pipeline stage
    pub fn require_column(&self, name: &str, stage: &str) -> BacklogResult<usize> {
        self.column_index(name)
            .ok_or_else(|| BacklogError::schema(self.name.clone(), stage, name))
    }

    pub fn require_columns<S: AsRef<str>>(
        &self,
        names: &[S],
        stage: &str,
    ) -> BacklogResult<Vec<usize>> {
        names
            .iter()
            .map(|n| self.require_column(n.as_ref(), stage))
            .collect()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of one column, top to bottom
    pub fn column_values(&self, column: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.get(idx).unwrap_or(&CellValue::Empty))
                .collect(),
        )
    }

    pub fn key_of(&self, row: usize, key_indices: &[usize]) -> RowKey {
        let cells = &self.rows[row];
        RowKey::from_cells(key_indices.iter().map(|&i| &cells[i]))
    }

    /// Drop every column whose header is listed; absent names are ignored.
    /// Returns the headers actually removed.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.iter().any(|n| n.as_ref() == c))
            .collect();
        let dropped: Vec<String> = self
            .columns
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(c, _)| c.clone())
            .collect();
        if dropped.is_empty() {
            return dropped;
        }

        let retain = |values: Vec<CellValue>| -> Vec<CellValue> {
            values
                .into_iter()
                .zip(&keep)
                .filter_map(|(v, k)| k.then_some(v))
                .collect()
        };
        self.columns = retain_names(std::mem::take(&mut self.columns), &keep);
        self.rows = std::mem::take(&mut self.rows)
            .into_iter()
            .map(retain)
            .collect();
        dropped
    }
}

fn retain_names(names: Vec<String>, keep: &[bool]) -> Vec<String> {
    names
        .into_iter()
        .zip(keep)
        .filter_map(|(n, k)| k.then_some(n))
        .collect()
}
