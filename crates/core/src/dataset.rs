//! Static sample data: the patient fixture and canned query suggestions

use crate::error::CoreError;
use crate::patient::Patient;

const SAMPLE_PATIENTS_JSON: &str = include_str!("../data/patients.json");

/// Canned natural-language queries offered for autocomplete
pub const QUERY_SUGGESTIONS: &[&str] = &[
    "Show me all diabetic patients over 50",
    "List female patients older than 60 with hypertension",
    "Patients between 40 and 70 with asthma",
    "Male patients under 35",
    "Patients aged 75+ with diabetes",
    "Women with heart failure",
    "Patients with COPD over 60",
    "Female patients with rheumatoid arthritis",
    "Patients with anxiety under 40",
    "Patients with Alzheimer's disease over 70",
    "Male patients with kidney disease",
    "Patients with GERD",
    "Female patients with thyroid disease",
];

/// Suggestions shown when the prefix is empty
const DEFAULT_SUGGESTIONS: usize = 8;

/// Maximum suggestions returned for a non-empty prefix
const MAX_SUGGESTIONS: usize = 10;

/// Load the bundled sample patients.
///
/// Fails if any record is malformed, including a birth date that is not a
/// valid ISO calendar date.
pub fn sample_patients() -> Result<Vec<Patient>, CoreError> {
    Ok(serde_json::from_str(SAMPLE_PATIENTS_JSON)?)
}

/// Autocomplete suggestions for `q` (case-insensitive substring match)
pub fn suggestions(q: &str) -> Vec<&'static str> {
    if q.is_empty() {
        return QUERY_SUGGESTIONS
            .iter()
            .copied()
            .take(DEFAULT_SUGGESTIONS)
            .collect();
    }

    let needle = q.to_lowercase();
    QUERY_SUGGESTIONS
        .iter()
        .copied()
        .filter(|s| s.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}
