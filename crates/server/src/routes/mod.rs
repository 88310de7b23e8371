mod analytics;
mod filters;
pub mod health;
mod patients;
mod query;
mod suggestions;

use axum::{
    Extension, Router,
    response::IntoResponse,
    routing::{get, post},
};
use cohort_core::FilterCriteria;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;

use crate::state::AppState;

/// Build query, analytics and search routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query))
        .route("/suggestions", get(suggestions::list))
        .route("/analytics/chart-data", get(analytics::chart_data))
        .route("/patients/search", get(patients::search))
        .route("/filters/options", get(filters::options))
}

/// Raw filter strings as received in a query string
#[derive(Debug, Deserialize, Default)]
pub struct FilterParams {
    pub age_filter: Option<String>,
    pub gender_filter: Option<String>,
    pub diagnosis_filter: Option<String>,
}

impl FilterParams {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_query(
            self.age_filter.as_deref(),
            self.gender_filter.as_deref(),
            self.diagnosis_filter.as_deref(),
        )
    }
}

/// GET /metrics - Render collected metrics in Prometheus text format
pub async fn render_metrics(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
