use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

use crate::{api::state::AppState, error::Result};

/// Liveness probe: confirms the process is up and the database answers.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse> {
    sqlx::query("SELECT 1")
        .execute(&state.service_context.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(json!({
        "status": "healthy",
        "database": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))))
}
