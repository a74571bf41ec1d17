//! # Issuer Store
//!
//! The legal entity printed as the company line on every label, persisted
//! together with the known alternatives in one JSON file under the data
//! directory.
//!
//! The whole file is rewritten on every change. The store itself is not
//! locked; concurrent users (the HTTP server) must wrap load-modify-save
//! in their own critical section.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EtiquetaError;

/// Entity used when the store file is absent or unreadable.
pub const DEFAULT_ISSUER: &str = "MEDICAL SUPPLIES LLC";

const STORE_FILE: &str = "issuers.json";

/// The current issuer and the list of known entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerStore {
    pub current: String,
    pub entities: Vec<String>,
}

impl Default for IssuerStore {
    fn default() -> Self {
        Self {
            current: DEFAULT_ISSUER.to_string(),
            entities: vec![DEFAULT_ISSUER.to_string()],
        }
    }
}

impl IssuerStore {
    fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(STORE_FILE)
    }

    /// Load the store from `data_dir`, falling back to the default entity
    /// when the file is missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        match fs::read_to_string(Self::path(data_dir)) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("[issuers] unreadable store, using default: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Rewrite the store file.
    pub fn save(&self, data_dir: &Path) -> Result<(), EtiquetaError> {
        fs::create_dir_all(data_dir)?;
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| EtiquetaError::Validation(format!("cannot serialize issuers: {}", e)))?;
        fs::write(Self::path(data_dir), text)?;
        Ok(())
    }

    /// Make `name` current, optionally remembering it in the list.
    pub fn set_current(&mut self, name: &str, add_to_list: bool) {
        self.current = name.to_string();
        if add_to_list && !self.entities.iter().any(|e| e == name) {
            self.entities.push(name.to_string());
        }
    }

    /// Drop `name` from the list. The current entity resets to the
    /// default if it was the one removed.
    pub fn remove(&mut self, name: &str) {
        self.entities.retain(|e| e != name);
        if self.current == name {
            self.current = DEFAULT_ISSUER.to_string();
        }
    }
}
