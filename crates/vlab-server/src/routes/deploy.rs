use axum::extract::State;
use axum::Json;
use vlab_core::service::DeployStatus;

use crate::state::AppState;

/// GET /deploy_url — deployment status and the URL students are sent to.
pub async fn get_deploy_status(State(app): State<AppState>) -> Json<DeployStatus> {
    Json(app.service.get_deploy_status())
}
