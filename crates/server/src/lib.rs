//! cohort-server library crate
//!
//! Exposes `build_app`, `config` and `state` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod config;
mod error;
mod middleware;
mod routes;
pub mod state;

use std::any::Any;
use std::sync::OnceLock;

use axum::{
    Extension, Router,
    middleware as axum_mw,
    response::{IntoResponse, Response},
    routing::get,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::AppError;
use state::AppState;

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::render_metrics))
        .layer(Extension(prometheus_handle()));

    let api_routes = routes::api_routes()
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(CorsAny)
            .allow_methods(CorsAny)
            .allow_headers(CorsAny)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(CorsAny)
            .allow_headers(CorsAny)
    };

    let app = Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state);

    with_request_layers(app, cors)
}

/// Handle to the process-wide Prometheus recorder, installed on first use.
///
/// Every router built in the process renders the same registry.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %e, "Metrics recorder already installed");
            }
            handle
        })
        .clone()
}

/// Outer middleware shared by every route: panic catching innermost, then
/// request IDs, CORS, tracing and request metrics
fn with_request_layers(router: Router, cors: CorsLayer) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}

/// Turn a handler panic into a 500 carrying the panic message
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown internal error".to_string()
    };

    tracing::error!(error = %message, "Handler panicked");
    AppError::Internal(message).into_response()
}
