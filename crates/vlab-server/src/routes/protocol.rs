use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use vlab_core::engine::LoadReport;
use vlab_core::error::ProviderError;
use vlab_core::protocol::ProtocolConfig;

use crate::error::AppError;
use crate::html::render_config;
use crate::state::AppState;

/// True when the client asks for HTML ahead of JSON (a browser).
fn wants_html(headers: &HeaderMap) -> bool {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    match (accept.find("text/html"), accept.find("application/json")) {
        (Some(html), Some(json)) => html < json,
        (Some(_), None) => true,
        _ => false,
    }
}

/// GET /configuracao — the active protocol, as JSON or as the authoring page.
pub async fn get_protocol(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let protocol = app.service.get_config();
    if wants_html(&headers) {
        Html(render_config(&protocol)).into_response()
    } else {
        Json(protocol.as_ref().clone()).into_response()
    }
}

/// PUT /configuracao — replace the protocol and recompile the engine.
///
/// Steps with unknown rule types are skipped, not rejected; the returned
/// report lists them.
pub async fn put_protocol(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<LoadReport>, AppError> {
    let protocol: ProtocolConfig = serde_json::from_slice(&body).map_err(ProviderError::from)?;
    tracing::info!(title = %protocol.activity_title, "protocol replaced");
    Ok(Json(app.service.replace_protocol(protocol)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn browser_accept_prefers_html() {
        assert!(wants_html(&accept(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
        )));
    }

    #[test]
    fn api_clients_get_json() {
        assert!(!wants_html(&HeaderMap::new()));
        assert!(!wants_html(&accept("application/json")));
        assert!(!wants_html(&accept("application/json, text/html")));
        assert!(!wants_html(&accept("*/*")));
    }
}
