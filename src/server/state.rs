//! Server state and configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::EtiquetaError;
use crate::issuer::IssuerStore;
use crate::render::FontMetrics;
use crate::session::WizardSession;

pub use crate::session::SESSION_EXPIRATION_SECS;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// TTF font used for text measurement and PDF embedding.
    pub font_path: PathBuf,
    /// Directory holding the issuer store and template output.
    pub data_dir: PathBuf,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub font: FontMetrics,
    /// Active wizard sessions, swept by the cleanup task.
    pub sessions: RwLock<HashMap<Uuid, WizardSession>>,
    /// The issuer file is load-modify-save; the lock makes that a
    /// critical section.
    pub issuers: Mutex<IssuerStore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, EtiquetaError> {
        let font = FontMetrics::from_file(&config.font_path)?;
        let issuers = IssuerStore::load(&config.data_dir);
        Ok(Self {
            config,
            font,
            sessions: RwLock::new(HashMap::new()),
            issuers: Mutex::new(issuers),
        })
    }

    /// Where template mode writes its per-variant files.
    pub fn patterns_dir(&self) -> PathBuf {
        self.config.data_dir.join("patterns")
    }
}
