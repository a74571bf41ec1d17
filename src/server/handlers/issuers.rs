//! Issuer management API handlers.
//!
//! All four operations hold the issuer lock across load-modify-save, so
//! concurrent requests cannot interleave partial updates of the store
//! file.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::issuer::IssuerStore;

use super::super::state::AppState;
use super::reject;

fn validated(name: &str) -> Result<&str, (StatusCode, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "issuer name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

/// GET /api/issuers - The current issuer and the list of known entities.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<IssuerStore> {
    Json(state.issuers.lock().await.clone())
}

#[derive(Debug, Deserialize)]
pub struct SetCurrentRequest {
    pub name: String,
    /// Also remember the name in the entity list.
    #[serde(default)]
    pub add_to_list: bool,
}

/// PUT /api/issuers/current - Switch the issuer printed on labels.
pub async fn set_current(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetCurrentRequest>,
) -> Result<Json<IssuerStore>, (StatusCode, String)> {
    let name = validated(&req.name)?;

    let mut issuers = state.issuers.lock().await;
    issuers.set_current(name, req.add_to_list);
    issuers.save(&state.config.data_dir).map_err(reject)?;
    println!("[issuers] Current issuer set to {:?}", name);

    Ok(Json(issuers.clone()))
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// POST /api/issuers - Add an entity and make it current.
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> Result<Json<IssuerStore>, (StatusCode, String)> {
    let name = validated(&req.name)?;

    let mut issuers = state.issuers.lock().await;
    issuers.set_current(name, true);
    issuers.save(&state.config.data_dir).map_err(reject)?;

    Ok(Json(issuers.clone()))
}

/// DELETE /api/issuers - Remove an entity from the list.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> Result<Json<IssuerStore>, (StatusCode, String)> {
    let name = validated(&req.name)?;

    let mut issuers = state.issuers.lock().await;
    issuers.remove(name);
    issuers.save(&state.config.data_dir).map_err(reject)?;

    Ok(Json(issuers.clone()))
}
