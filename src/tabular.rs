//! # Tabular Input
//!
//! Row records as handed over by an external spreadsheet parser.
//!
//! The crate never reads spreadsheet files itself: callers submit an
//! already-parsed cell grid (JSON array of rows), pick the header row, and
//! this module turns the remainder into [`RawRecord`]s keyed by the header
//! names. Cell values arrive as JSON scalars and are flattened to strings.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::EtiquetaError;

/// One input row: a mapping from column name to cell text.
///
/// A lookup for a column the row does not carry yields the empty string —
/// missing data is never an error at this level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRecord(HashMap<String, String>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell text for `column`, or `""` when absent.
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Flatten a JSON cell to its text form.
///
/// Integral numbers drop the trailing `.0` a float round-trip would add;
/// null becomes the empty string.
pub fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(0.0);
                if f.fract() == 0.0 && f.abs() < 9e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Split an uploaded grid at `header_row` (0-based) into column names and
/// records.
///
/// Header cells stringify like data cells; empty header cells get a
/// positional `column {n}` name so the row stays addressable. Data rows
/// shorter than the header are padded with empty strings by omission.
pub fn grid_to_records(
    grid: &[Vec<Value>],
    header_row: usize,
) -> Result<(Vec<String>, Vec<RawRecord>), EtiquetaError> {
    let header = grid.get(header_row).ok_or_else(|| {
        EtiquetaError::Validation(format!(
            "header row {} is out of range (grid has {} rows)",
            header_row + 1,
            grid.len()
        ))
    })?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell_to_string(cell);
            let name = name.trim();
            if name.is_empty() {
                format!("column {}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect();

    let records = grid[header_row + 1..]
        .iter()
        .map(|row| {
            columns
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.clone(), cell_to_string(cell)))
                .collect()
        })
        .collect();

    Ok((columns, records))
}
