//! # Error Types
//!
//! This module defines error types used throughout the etiqueta library.

use thiserror::Error;

/// Main error type for etiqueta operations
#[derive(Debug, Error)]
pub enum EtiquetaError {
    /// Malformed user input (bad override quantity, bad header row, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A wizard step was reached before its prerequisites exist.
    /// Callers should restart the flow from the beginning.
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Barcode symbol generation error
    #[error("Barcode error: {0}")]
    Barcode(String),

    /// Font loading or measurement error
    #[error("Font error: {0}")]
    Font(String),

    /// PDF document assembly error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
