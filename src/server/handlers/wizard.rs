//! Wizard session API handlers.
//!
//! Mirrors the wizard flow: create a session with a print mode, upload
//! the parsed cell grid, pick the header row, pick columns, map roles,
//! preview the aggregated groups, then generate.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::aggregate::{aggregate, apply_edits, finalize, GroupEdit, LabelGroup, PrintMode, RoleMapping};
use crate::output::{render_bulk, render_templates};
use crate::render::PdfWriter;
use crate::session::WizardSession;
use crate::style::StyleConfig;
use crate::tabular::RawRecord;

use super::super::state::{AppState, SESSION_EXPIRATION_SECS};
use super::reject;

/// How many records the header-selection response shows as a preview.
const SAMPLE_ROWS: usize = 5;

fn parse_id(id: &str) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(id).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid session ID".to_string()))
}

fn not_found() -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        "Session not found or expired".to_string(),
    )
}

/// Clean up expired wizard sessions.
async fn cleanup_expired_sessions(state: &AppState) {
    let now = Instant::now();
    let mut sessions = state.sessions.write().await;
    sessions.retain(|_, session| {
        now.duration_since(session.last_accessed).as_secs() < SESSION_EXPIRATION_SECS
    });
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub mode: PrintMode,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub session_id: String,
}

/// POST /api/session - Start a wizard session.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRequest>,
) -> Json<CreateResponse> {
    cleanup_expired_sessions(&state).await;

    let session_id = Uuid::new_v4();
    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id, WizardSession::new(req.mode));
    }
    println!("[session] Created {:?} session {}", req.mode, session_id);

    Json(CreateResponse {
        session_id: session_id.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TableRequest {
    pub grid: Vec<Vec<Value>>,
}

/// POST /api/session/:id/table - Upload the parsed cell grid.
pub async fn upload_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TableRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session_id = parse_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    session.touch();

    let rows = session.set_grid(req.grid).map_err(reject)?;
    Ok(Json(json!({ "rows": rows })))
}

#[derive(Debug, Deserialize)]
pub struct HeaderRequest {
    /// 1-based row number holding the column names.
    pub row: usize,
}

#[derive(Debug, Serialize)]
pub struct HeaderResponse {
    pub columns: Vec<String>,
    pub sample: Vec<RawRecord>,
}

/// POST /api/session/:id/header - Pick the header row.
pub async fn select_header(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<HeaderRequest>,
) -> Result<Json<HeaderResponse>, (StatusCode, String)> {
    let session_id = parse_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    session.touch();

    let (columns, records) = session.select_header(req.row).map_err(reject)?;
    Ok(Json(HeaderResponse {
        columns: columns.to_vec(),
        sample: records.iter().take(SAMPLE_ROWS).cloned().collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ColumnsRequest {
    pub columns: Vec<String>,
}

/// POST /api/session/:id/columns - Keep a subset of the columns.
pub async fn select_columns(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ColumnsRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session_id = parse_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    session.touch();

    session.select_columns(req.columns).map_err(reject)?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/session/:id/roles - Map columns onto label roles.
pub async fn set_roles(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(roles): Json<RoleMapping>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session_id = parse_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    session.touch();

    session.set_roles(roles).map_err(reject)?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: PrintMode,
}

/// POST /api/session/:id/mode - Switch print mode from the edit screen.
pub async fn set_mode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session_id = parse_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    session.touch();

    session.mode = req.mode;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/session/:id/groups - Preview the aggregated groups.
pub async fn groups(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LabelGroup>>, (StatusCode, String)> {
    let session_id = parse_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id).ok_or_else(not_found)?;
    session.touch();

    let records = session.records().map_err(reject)?;
    let roles = session.roles().map_err(reject)?;
    let grouped = aggregate(records, roles, session.mode);
    Ok(Json(grouped.into_values().collect()))
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Positional per-group overrides from the edit screen.
    #[serde(default)]
    pub edits: Vec<GroupEdit>,
}

/// POST /api/session/:id/generate - Produce the labels.
///
/// Bulk mode answers with the PDF itself as an attachment; template mode
/// answers with the created/skipped report.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GenerateRequest>,
) -> Result<Response, (StatusCode, String)> {
    let session_id = parse_id(&id)?;

    let (groups, mode) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&session_id).ok_or_else(not_found)?;
        session.touch();

        let records = session.records().map_err(reject)?;
        let roles = session.roles().map_err(reject)?;
        let mut grouped = aggregate(records, roles, session.mode);
        apply_edits(&mut grouped, &req.edits);
        (finalize(grouped, session.mode), session.mode)
    };

    let issuer = state.issuers.lock().await.current.clone();

    match mode {
        PrintMode::Bulk => {
            let total: u32 = groups.iter().map(|g| g.quantity).sum();
            println!(
                "[bulk] {} labels across {} unique products ({} orders)",
                total,
                groups.len(),
                total / 2
            );

            let worker_state = state.clone();
            let bytes = tokio::task::spawn_blocking(move || {
                let style = StyleConfig::default();
                let writer = PdfWriter::new(&worker_state.font, &style);
                render_bulk(&groups, &issuer, &style, &worker_state.font, &writer)
            })
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?
            .map_err(reject)?;

            Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"labels.pdf\"",
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        PrintMode::Template => {
            let out_dir = state.patterns_dir();
            let worker_state = state.clone();
            let report = tokio::task::spawn_blocking(move || {
                let style = StyleConfig::default();
                let writer = PdfWriter::new(&worker_state.font, &style);
                render_templates(
                    &groups,
                    &issuer,
                    &style,
                    &worker_state.font,
                    &writer,
                    &out_dir,
                )
            })
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?
            .map_err(reject)?;

            println!(
                "[templates] created {}, skipped {} ({})",
                report.created,
                report.skipped,
                report.output_dir.display()
            );
            Ok(Json(report).into_response())
        }
    }
}
