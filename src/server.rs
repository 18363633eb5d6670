use crate::config::ServerConfig;
use crate::handler::{
    AppState, get_stats, get_tasks, health_check, list_projects, update_task_status,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::{get, put},
};
use std::net::SocketAddr;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const BODY_LIMIT_BYTES: usize = 1024 * 1024;
const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn create_routes(state: AppState, config: &ServerConfig) -> Router {
    let static_files = Router::new()
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static(STATIC_CACHE_CONTROL),
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{project}/tasks", get(get_tasks))
        .route(
            "/api/projects/{project}/tasks/{task_id}/status",
            put(update_task_status),
        )
        .route("/api/projects/{project}/stats", get(get_stats))
        .with_state(state)
        .merge(static_files)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_routes(state, config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, memory_bank = ?config.memory_bank_path, "board server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("board server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
