use axum::extract::State;
use axum::Json;
use vlab_core::catalog::{AnalyticsCatalog, ParamDescriptor};

use crate::state::AppState;

/// GET /json_params_url — parameters the LMS may configure for this activity.
pub async fn get_json_params(State(app): State<AppState>) -> Json<Vec<ParamDescriptor>> {
    Json(app.service.get_json_params())
}

/// GET /analytics_list_url — analytics this provider reports.
pub async fn get_analytics_list(State(app): State<AppState>) -> Json<AnalyticsCatalog> {
    Json(app.service.get_analytics_list())
}
