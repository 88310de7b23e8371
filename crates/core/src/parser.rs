//! Rule-based natural language to cohort filter conversion
//!
//! Turns free text such as "female patients over 60 with hypertension" into
//! an age predicate, a set of diagnosis codes and a gender, scored by how
//! many of the three were found.

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;
use crate::keywords::{AGE_OPERATORS, DIABETES_TERMS, DIAGNOSIS_KEYWORDS, GENDER_KEYWORDS};
use crate::patient::Gender;

/// Age comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
        }
    }

    /// Apply `age <op> bound`
    pub fn compare(&self, age: i32, bound: i32) -> bool {
        match self {
            ComparisonOp::Gt => age > bound,
            ComparisonOp::Ge => age >= bound,
            ComparisonOp::Lt => age < bound,
            ComparisonOp::Le => age <= bound,
        }
    }
}

/// Age constraint extracted from a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "AgePredicateRepr")]
pub enum AgePredicate {
    Compare { op: ComparisonOp, age: i32 },
    /// Inclusive; `low <= high` always holds
    Between { low: i32, high: i32 },
}

impl AgePredicate {
    /// Build a between-predicate, ordering the bounds
    pub fn between(a: i32, b: i32) -> Self {
        AgePredicate::Between {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Encode as an age filter string ("40-70", ">50", "<=30", ...)
    pub fn to_filter_string(&self) -> String {
        match self {
            AgePredicate::Compare { op, age } => format!("{}{}", op.as_str(), age),
            AgePredicate::Between { low, high } => format!("{}-{}", low, high),
        }
    }
}

/// Flat wire form: `{op, age, low, high}` with unused fields null
#[derive(Serialize)]
struct AgePredicateRepr {
    op: &'static str,
    age: Option<i32>,
    low: Option<i32>,
    high: Option<i32>,
}

impl From<AgePredicate> for AgePredicateRepr {
    fn from(predicate: AgePredicate) -> Self {
        match predicate {
            AgePredicate::Compare { op, age } => Self {
                op: op.as_str(),
                age: Some(age),
                low: None,
                high: None,
            },
            AgePredicate::Between { low, high } => Self {
                op: "between",
                age: None,
                low: Some(low),
                high: Some(high),
            },
        }
    }
}

/// Structured filters extracted from a natural language query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedFilters {
    pub raw_text: String,
    pub age: Option<AgePredicate>,
    /// Deduplicated, sorted ascending
    pub diagnoses: Vec<String>,
    pub gender: Option<Gender>,
    pub confidence: f64,
}

/// Keyword and pattern based query parser.
///
/// All patterns are compiled once in [`QueryParser::new`]; parsing itself
/// never fails.
pub struct QueryParser {
    gender_patterns: Vec<(Regex, Gender)>,
    age_phrase_patterns: Vec<(Regex, ComparisonOp)>,
    between: Regex,
    plus: Regex,
    aged: Regex,
}

impl QueryParser {
    pub fn new() -> Result<Self, CoreError> {
        let gender_patterns = GENDER_KEYWORDS
            .iter()
            .map(|(keyword, gender)| -> Result<_, CoreError> {
                Ok((Regex::new(&format!(r"\b{}\b", regex::escape(keyword)))?, *gender))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let age_phrase_patterns = AGE_OPERATORS
            .iter()
            .map(|(phrase, op)| -> Result<_, CoreError> {
                let pattern = format!(r"\b{}\s+([0-9]{{1,3}})(?:[^0-9]|$)", regex::escape(phrase));
                Ok((Regex::new(&pattern)?, *op))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            gender_patterns,
            age_phrase_patterns,
            between: Regex::new(
                r"\bbetween\s+([0-9]{1,3})\s+(?:and|to)\s+([0-9]{1,3})(?:[^0-9]|$)",
            )?,
            plus: Regex::new(r"(?:^|[^0-9])([0-9]{1,3})\+")?,
            aged: Regex::new(r"\baged?\s+([0-9]{1,3})(?:[^0-9]|$)")?,
        })
    }

    /// Parse a free-text query into structured filters
    pub fn parse(&self, text: &str) -> ParsedFilters {
        let lowered = text.to_lowercase();

        let gender = self.extract_gender(&lowered);
        let diagnoses = extract_diagnoses(&lowered);
        let age = self.extract_age(&lowered);

        let found = [age.is_some(), !diagnoses.is_empty(), gender.is_some()]
            .into_iter()
            .filter(|hit| *hit)
            .count();

        let parsed = ParsedFilters {
            raw_text: text.to_string(),
            age,
            diagnoses,
            gender,
            confidence: confidence(found),
        };

        tracing::info!(
            query = text,
            age = ?parsed.age,
            diagnoses = ?parsed.diagnoses,
            gender = ?parsed.gender,
            confidence = parsed.confidence,
            "Parsed query"
        );

        parsed
    }

    /// First gender keyword (in table order) found as a whole word
    fn extract_gender(&self, text: &str) -> Option<Gender> {
        self.gender_patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(text))
            .map(|(_, gender)| *gender)
    }

    /// between X and Y, then operator phrases in table order, then "N+" / "aged N"
    fn extract_age(&self, text: &str) -> Option<AgePredicate> {
        if let Some(caps) = self.between.captures(text) {
            if let (Some(a), Some(b)) = (capture_number(&caps, 1), capture_number(&caps, 2)) {
                return Some(AgePredicate::between(a, b));
            }
        }

        for (pattern, op) in &self.age_phrase_patterns {
            if let Some(age) = pattern.captures(text).and_then(|c| capture_number(&c, 1)) {
                return Some(AgePredicate::Compare { op: *op, age });
            }
        }

        [&self.plus, &self.aged]
            .into_iter()
            .find_map(|pattern| pattern.captures(text).and_then(|c| capture_number(&c, 1)))
            .map(|age| AgePredicate::Compare {
                op: ComparisonOp::Ge,
                age,
            })
    }
}

/// Diagnosis codes mentioned in `text`.
///
/// Diabetes queries resolve to the diabetes codes only. Everything else
/// accumulates codes from every keyword contained anywhere in the text.
fn extract_diagnoses(text: &str) -> Vec<String> {
    if is_diabetes_query(text) {
        return crate::keywords::diabetes_codes();
    }

    let mut codes: Vec<String> = DIAGNOSIS_KEYWORDS
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .flat_map(|(_, codes)| codes.iter().map(|c| c.to_string()))
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

fn is_diabetes_query(text: &str) -> bool {
    DIABETES_TERMS.iter().any(|term| text.contains(term))
}

/// 0.4 plus 0.2 per extracted dimension, capped at 1.0
fn confidence(found: usize) -> f64 {
    ((2 + found) as f64 / 5.0).min(1.0)
}

fn capture_number(caps: &regex::Captures<'_>, group: usize) -> Option<i32> {
    caps.get(group)?.as_str().parse().ok()
}
