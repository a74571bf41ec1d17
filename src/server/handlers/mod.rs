//! HTTP API handlers.

pub mod issuers;
pub mod wizard;

use axum::http::StatusCode;

use crate::error::EtiquetaError;

/// Map a core error onto the HTTP status the wizard client expects.
///
/// Missing prerequisites are 409: the client should restart the wizard
/// from the upload step.
pub(crate) fn reject(e: EtiquetaError) -> (StatusCode, String) {
    let status = match e {
        EtiquetaError::Validation(_) => StatusCode::BAD_REQUEST,
        EtiquetaError::MissingPrerequisite(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
