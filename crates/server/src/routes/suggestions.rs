use axum::{Json, extract::Query, extract::rejection::QueryRejection};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize, Default)]
pub struct SuggestionParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
pub struct SuggestionResponse {
    suggestions: Vec<&'static str>,
}

/// GET /suggestions - Query autocomplete
pub async fn list(
    params: Result<Query<SuggestionParams>, QueryRejection>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let Query(params) = params?;
    Ok(Json(SuggestionResponse {
        suggestions: cohort_core::suggestions(&params.q),
    }))
}
