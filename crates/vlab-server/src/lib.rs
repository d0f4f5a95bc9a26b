pub mod error;
pub mod html;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vlab_core::config::ProviderConfig;
use vlab_core::service::ActivityService;

/// Build the axum Router with the activity provider endpoints.
/// Used by `serve()` and available for integration testing.
pub fn build_router(service: Arc<ActivityService>) -> Router {
    let app_state = state::AppState::new(service);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Discovery
        .route("/json_params_url", get(routes::catalog::get_json_params))
        .route(
            "/analytics_list_url",
            get(routes::catalog::get_analytics_list),
        )
        // Configuration
        .route(
            "/configuracao",
            get(routes::protocol::get_protocol).put(routes::protocol::put_protocol),
        )
        // Analytics submission (POST only)
        .route(
            "/analytics_url",
            axum::routing::post(routes::analytics::submit_analytics),
        )
        // Deploy
        .route("/deploy_url", get(routes::deploy::get_deploy_status))
        // Documentation
        .route("/", get(routes::docs::index))
        .route("/documentacao", get(routes::docs::get_docs))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Build the activity service described by `config`: load its protocol and
/// compile the rules.
pub fn build_service(config: ProviderConfig) -> anyhow::Result<Arc<ActivityService>> {
    let protocol = config.load_protocol()?;
    let service = ActivityService::new(config, protocol);
    let report = service.initialize();
    for skipped in &report.skipped {
        tracing::warn!(step = %skipped.id, reason = %skipped.reason, "protocol step not loaded");
    }
    Ok(Arc::new(service))
}

/// Start the activity provider on `host:port` from the config.
pub async fn serve(config: ProviderConfig, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(config, listener, open_browser).await
}

/// Start the activity provider on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    config: ProviderConfig,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(build_service(config)?);

    tracing::info!("activity provider listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/documentacao");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
