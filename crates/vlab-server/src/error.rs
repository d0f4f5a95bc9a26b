use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vlab_core::error::ProviderError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Every error body has the
/// `{"status": "error", "message": ...}` shape the LMS expects.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0.downcast_ref::<ProviderError>() {
            Some(e) => (
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.to_body(),
            ),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "status": "error", "message": self.0.to_string() }),
            ),
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
