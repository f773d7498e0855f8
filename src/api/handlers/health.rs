use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub staging: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // Probe the staging area the same way the stager allocates directories;
    // the probe directory is removed when the guard drops.
    let staging_root = state.config.staging_dir.clone();
    let probe = tokio::task::spawn_blocking(move || match staging_root {
        Some(root) => tempfile::tempdir_in(root),
        None => tempfile::tempdir(),
    })
    .await;

    let staging = match probe {
        Ok(Ok(_dir)) => "writable",
        _ => "unavailable",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        staging: staging.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
