use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};

use crate::html::{render_docs, DocsView};
use crate::state::AppState;

/// GET / — send visitors to the documentation page.
pub async fn index() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/documentacao")])
}

/// GET /documentacao — human-readable status page.
pub async fn get_docs(State(app): State<AppState>) -> Html<String> {
    let deploy = app.service.get_deploy_status();
    let protocol = app.service.get_config();
    let steps = app.service.engine().step_ids();
    Html(render_docs(&DocsView {
        deploy: &deploy,
        activity_title: &protocol.activity_title,
        loaded_steps: &steps,
        started_at: app.started_at,
    }))
}
