use chrono::NaiveDate;
use thiserror::Error;

/// Cohort query error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid sample dataset: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("Invalid query pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(
        "Patient {patient_id} has birthDate {birth_date} which is after reference date {reference_date}"
    )]
    BirthDateAfterReference {
        patient_id: String,
        birth_date: NaiveDate,
        reference_date: NaiveDate,
    },
}
