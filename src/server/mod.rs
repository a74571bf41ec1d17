//! # HTTP Server for the Label Wizard
//!
//! Exposes the wizard flow and issuer management as a JSON API.
//!
//! ## Usage
//!
//! ```bash
//! etiqueta serve --listen 0.0.0.0:8080 --font arial.ttf --data-dir data
//! ```

mod handlers;
mod state;

pub use state::ServerConfig;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::EtiquetaError;
use state::{AppState, SESSION_EXPIRATION_SECS};

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use etiqueta::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), etiqueta::EtiquetaError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     font_path: "arial.ttf".into(),
///     data_dir: "data".into(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), EtiquetaError> {
    let app_state = Arc::new(AppState::new(config.clone())?);

    // Spawn background session cleanup task
    tokio::spawn(cleanup_sessions(app_state.clone()));

    let app = Router::new()
        // Wizard API
        .route("/api/session", post(handlers::wizard::create))
        .route(
            "/api/session/:id/table",
            // Parsed spreadsheets can be large (20MB limit for grids)
            post(handlers::wizard::upload_table)
                .layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        )
        .route(
            "/api/session/:id/header",
            post(handlers::wizard::select_header),
        )
        .route(
            "/api/session/:id/columns",
            post(handlers::wizard::select_columns),
        )
        .route("/api/session/:id/roles", post(handlers::wizard::set_roles))
        .route("/api/session/:id/mode", post(handlers::wizard::set_mode))
        .route("/api/session/:id/groups", get(handlers::wizard::groups))
        .route(
            "/api/session/:id/generate",
            post(handlers::wizard::generate),
        )
        // Issuer API
        .route(
            "/api/issuers",
            get(handlers::issuers::list)
                .post(handlers::issuers::add)
                .delete(handlers::issuers::remove),
        )
        .route("/api/issuers/current", put(handlers::issuers::set_current))
        .with_state(app_state);

    println!("Etiqueta HTTP server starting...");
    println!("Listening on: {}", config.listen_addr);
    println!("Data directory: {}", config.data_dir.display());
    println!();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task to clean up expired wizard sessions.
async fn cleanup_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    let expiration = Duration::from_secs(SESSION_EXPIRATION_SECS);

    loop {
        interval.tick().await;
        let now = Instant::now();

        let mut sessions = state.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_accessed) < expiration);
        let after = sessions.len();
        if before != after {
            println!(
                "[session] Cleaned up {} expired sessions ({} remaining)",
                before - after,
                after
            );
        }
    }
}
