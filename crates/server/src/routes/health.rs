//! Health check endpoint

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    /// Whether a linguistic tagger is available; none is bundled
    nlp_available: bool,
    total_patients: usize,
}

/// GET /health - Report server status and dataset size
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        nlp_available: false,
        total_patients: state.patients.len(),
    })
}
