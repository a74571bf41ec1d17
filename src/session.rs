//! # Wizard Sessions
//!
//! Sequential state holder for the label wizard: upload a cell grid, pick
//! the header row, pick the columns to keep, map columns to label roles.
//!
//! Each step validates that the previous ones happened; skipping ahead
//! answers with [`EtiquetaError::MissingPrerequisite`], which the server
//! maps to a "restart the wizard" response. Uploading a new grid resets
//! everything downstream.

use std::time::Instant;

use serde_json::Value;

use crate::aggregate::{PrintMode, RoleMapping};
use crate::error::EtiquetaError;
use crate::tabular::{grid_to_records, RawRecord};

/// How long an idle session survives, in seconds.
pub const SESSION_EXPIRATION_SECS: u64 = 3600;

fn missing(what: &str) -> EtiquetaError {
    EtiquetaError::MissingPrerequisite(what.to_string())
}

/// One user's progress through the wizard.
pub struct WizardSession {
    pub mode: PrintMode,
    grid: Option<Vec<Vec<Value>>>,
    table: Option<(Vec<String>, Vec<RawRecord>)>,
    selected: Option<Vec<String>>,
    roles: Option<RoleMapping>,
    pub last_accessed: Instant,
}

impl WizardSession {
    pub fn new(mode: PrintMode) -> Self {
        Self {
            mode,
            grid: None,
            table: None,
            selected: None,
            roles: None,
            last_accessed: Instant::now(),
        }
    }

    /// Keep the session alive past the expiry sweep.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    /// Store a freshly uploaded grid and reset all downstream steps.
    /// Returns the number of rows.
    pub fn set_grid(&mut self, grid: Vec<Vec<Value>>) -> Result<usize, EtiquetaError> {
        if grid.is_empty() {
            return Err(EtiquetaError::Validation(
                "the uploaded table is empty".to_string(),
            ));
        }
        let rows = grid.len();
        self.grid = Some(grid);
        self.table = None;
        self.selected = None;
        self.roles = None;
        Ok(rows)
    }

    /// Pick the 1-based header row; the rows below become records.
    pub fn select_header(
        &mut self,
        header_row: usize,
    ) -> Result<(&[String], &[RawRecord]), EtiquetaError> {
        let grid = self.grid.as_ref().ok_or_else(|| missing("no uploaded table"))?;
        if header_row == 0 {
            return Err(EtiquetaError::Validation(
                "header row numbering starts at 1".to_string(),
            ));
        }

        let parsed = grid_to_records(grid, header_row - 1)?;
        self.selected = None;
        self.roles = None;
        let (columns, records) = self.table.insert(parsed);
        Ok((columns.as_slice(), records.as_slice()))
    }

    /// Keep a subset of the parsed columns for the mapping step.
    pub fn select_columns(&mut self, columns: Vec<String>) -> Result<(), EtiquetaError> {
        let (available, _) = self
            .table
            .as_ref()
            .ok_or_else(|| missing("no header row selected"))?;

        if columns.is_empty() {
            return Err(EtiquetaError::Validation(
                "select at least one column".to_string(),
            ));
        }
        for column in &columns {
            if !available.contains(column) {
                return Err(EtiquetaError::Validation(format!(
                    "unknown column {:?}",
                    column
                )));
            }
        }

        self.selected = Some(columns);
        self.roles = None;
        Ok(())
    }

    /// Map the selected columns onto label roles.
    pub fn set_roles(&mut self, roles: RoleMapping) -> Result<(), EtiquetaError> {
        let selected = self
            .selected
            .as_ref()
            .ok_or_else(|| missing("no columns selected"))?;

        let mut named = vec![
            ("barcode", &roles.barcode),
            ("product name", &roles.product_name),
            ("article", &roles.article),
        ];
        if let Some(size) = &roles.size {
            named.push(("size", size));
        }
        if let Some(color) = &roles.color {
            named.push(("color", color));
        }
        for (role, column) in named {
            if !selected.contains(column) {
                return Err(EtiquetaError::Validation(format!(
                    "{} column {:?} is not among the selected columns",
                    role, column
                )));
            }
        }

        self.roles = Some(roles);
        Ok(())
    }

    pub fn columns(&self) -> Result<&[String], EtiquetaError> {
        self.table
            .as_ref()
            .map(|(columns, _)| columns.as_slice())
            .ok_or_else(|| missing("no header row selected"))
    }

    pub fn records(&self) -> Result<&[RawRecord], EtiquetaError> {
        self.table
            .as_ref()
            .map(|(_, records)| records.as_slice())
            .ok_or_else(|| missing("no header row selected"))
    }

    pub fn roles(&self) -> Result<&RoleMapping, EtiquetaError> {
        self.roles.as_ref().ok_or_else(|| missing("no role mapping"))
    }
}
