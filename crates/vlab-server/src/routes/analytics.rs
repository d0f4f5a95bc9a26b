use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vlab_core::error::ProviderError;

use crate::error::AppError;
use crate::state::AppState;

/// POST /analytics_url — run a submission through the gate pipeline.
///
/// The pipeline decides the status: 200 with analytics, 400 for a missing
/// field, 401 for a bad student id, 500 if no stage answered. A body that
/// is not JSON at all is rejected with 400 before reaching the pipeline.
pub async fn submit_analytics(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request: serde_json::Value =
        serde_json::from_slice(&body).map_err(ProviderError::from)?;

    let pipeline = app.pipeline.clone();
    let response = tokio::task::spawn_blocking(move || pipeline.handle(&request))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok((status, Json(response.body)))
}
