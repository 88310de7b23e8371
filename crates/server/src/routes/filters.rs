use axum::{Json, extract::State};
use cohort_core::FilterOptions;

use crate::state::AppState;

/// GET /filters/options - Dropdown values for the filter controls
pub async fn options(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(FilterOptions::from_patients(&state.patients))
}
