//! Aggregated chart data endpoint

use axum::{Json, extract::Query, extract::State, extract::rejection::QueryRejection};
use cohort_core::ChartData;

use super::FilterParams;
use crate::error::AppError;
use crate::state::AppState;

/// GET /analytics/chart-data - Age, gender and condition counts (no PII)
pub async fn chart_data(
    State(state): State<AppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<ChartData>, AppError> {
    let Query(params) = params?;

    let engine = state.engine.pinned();
    let outcome = state.filter(&engine, &params.criteria());

    Ok(Json(ChartData::from_patients(
        &outcome.patients,
        engine.reference_date(),
    )))
}
