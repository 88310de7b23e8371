//! Keyword tables for natural-language query parsing
//!
//! Tables are ordered slices rather than maps: for gender and age phrases
//! the first matching entry wins, so order is part of the behavior.

use crate::parser::ComparisonOp;
use crate::patient::Gender;

/// Diagnosis synonym → ICD-10 codes
pub const DIAGNOSIS_KEYWORDS: &[(&str, &[&str])] = &[
    // Diabetes
    ("type 2 diabetes", &["E11"]),
    ("type ii diabetes", &["E11"]),
    ("t2dm", &["E11"]),
    ("type 1 diabetes", &["E10"]),
    ("type i diabetes", &["E10"]),
    ("t1dm", &["E10"]),
    ("diabetes mellitus", &["E11", "E10"]),
    ("diabetic", &["E11", "E10"]),
    ("diabetes", &["E11", "E10"]),
    // Cardiovascular
    ("hypertension", &["I10"]),
    ("high blood pressure", &["I10"]),
    ("htn", &["I10"]),
    ("heart failure", &["I50"]),
    ("chf", &["I50"]),
    ("congestive heart failure", &["I50"]),
    ("hyperlipidemia", &["E78.5"]),
    ("high cholesterol", &["E78.5"]),
    ("ischemic heart disease", &["I25"]),
    ("coronary artery disease", &["I25"]),
    ("cad", &["I25"]),
    ("ihd", &["I25"]),
    // Respiratory
    ("asthma", &["J45"]),
    ("copd", &["J44"]),
    ("chronic obstructive pulmonary disease", &["J44"]),
    // Mental health
    ("anxiety", &["F41.1"]),
    ("generalized anxiety disorder", &["F41.1"]),
    ("gad", &["F41.1"]),
    ("depression", &["F33"]),
    ("major depressive disorder", &["F33"]),
    ("mdd", &["F33"]),
    // Musculoskeletal
    ("osteoporosis", &["M81"]),
    ("rheumatoid arthritis", &["M05"]),
    ("ra", &["M05"]),
    ("arthritis", &["M05"]),
    // Neurological
    ("alzheimer", &["G30"]),
    ("alzheimer's disease", &["G30"]),
    ("dementia", &["G30"]),
    // Renal
    ("kidney disease", &["N18"]),
    ("chronic kidney disease", &["N18"]),
    ("ckd", &["N18"]),
    // Gastrointestinal
    ("gerd", &["K21"]),
    ("acid reflux", &["K21"]),
    ("gastroesophageal reflux", &["K21"]),
    // Oncology
    ("cancer", &["C50"]),
    ("breast cancer", &["C50"]),
    // Endocrine
    ("hypothyroidism", &["E03"]),
    ("thyroid", &["E03"]),
    // Hematology
    ("anemia", &["D50"]),
    ("iron deficiency", &["D50"]),
];

/// Gender synonym → canonical gender, scanned in order
pub const GENDER_KEYWORDS: &[(&str, Gender)] = &[
    ("male", Gender::Male),
    ("man", Gender::Male),
    ("men", Gender::Male),
    ("m", Gender::Male),
    ("female", Gender::Female),
    ("woman", Gender::Female),
    ("women", Gender::Female),
    ("f", Gender::Female),
];

/// Age phrase → comparison, scanned in order
pub const AGE_OPERATORS: &[(&str, ComparisonOp)] = &[
    ("over", ComparisonOp::Gt),
    ("older than", ComparisonOp::Gt),
    ("greater than", ComparisonOp::Gt),
    ("above", ComparisonOp::Gt),
    ("at least", ComparisonOp::Ge),
    ("under", ComparisonOp::Lt),
    ("younger than", ComparisonOp::Lt),
    ("less than", ComparisonOp::Lt),
    ("below", ComparisonOp::Lt),
];

/// Terms that mark a query as being about diabetes (substring match)
pub const DIABETES_TERMS: &[&str] = &[
    "diabetes",
    "diabetic",
    "type 1 diabetes",
    "type i diabetes",
    "t1dm",
    "type 2 diabetes",
    "type ii diabetes",
    "t2dm",
    "diabetes mellitus",
];

/// Used when the diagnosis table yields no diabetes codes
pub const FALLBACK_DIABETES_CODES: &[&str] = &["E10", "E11"];

/// Diabetes ICD codes derived from [`DIAGNOSIS_KEYWORDS`], sorted.
///
/// Selects every entry whose key mentions "diabetes" or is a known diabetes
/// synonym.
pub fn diabetes_codes() -> Vec<String> {
    let mut codes: Vec<String> = DIAGNOSIS_KEYWORDS
        .iter()
        .filter(|(keyword, _)| keyword.contains("diabetes") || DIABETES_TERMS.contains(keyword))
        .flat_map(|(_, codes)| codes.iter().map(|c| c.to_string()))
        .collect();

    if codes.is_empty() {
        codes = FALLBACK_DIABETES_CODES.iter().map(|c| c.to_string()).collect();
    }

    codes.sort();
    codes.dedup();
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diabetes_codes() {
        assert_eq!(diabetes_codes(), vec!["E10", "E11"]);
    }

    #[test]
    fn test_gender_table_order() {
        // "male" must be scanned before "m" and "female" before "f"
        let position = |kw: &str| GENDER_KEYWORDS.iter().position(|(k, _)| *k == kw);
        assert!(position("male") < position("m"));
        assert!(position("female") < position("f"));
    }
}
