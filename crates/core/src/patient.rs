//! Sample patient records and age computation

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Administrative gender of a sample patient
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Canonical lowercase form, as used by gender filter strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Capitalized form used in tables and charts
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Patient name (given names + family name)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientName {
    pub given: Vec<String>,
    pub family: String,
}

impl PatientName {
    /// "<first given> <family>", or just the family name when no given name is recorded
    pub fn display(&self) -> String {
        match self.given.first() {
            Some(given) => format!("{} {}", given, self.family),
            None => self.family.clone(),
        }
    }
}

/// A coded diagnosis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Condition {
    pub code: String,
    pub display: String,
}

/// Immutable sample patient record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: PatientName,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub medications: Vec<String>,
}

impl Patient {
    /// Age in whole years on the given reference date
    pub fn age_on(&self, reference: NaiveDate) -> i32 {
        age_on(self.birth_date, reference)
    }

    /// True if any recorded condition carries one of `codes`
    pub fn has_any_condition<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.conditions
            .iter()
            .any(|c| codes.iter().any(|code| code.as_ref() == c.code))
    }
}

/// Completed years between `birth_date` and `reference`.
///
/// One year is subtracted when the birthday has not yet come round in the
/// reference year.
pub fn age_on(birth_date: NaiveDate, reference: NaiveDate) -> i32 {
    let had_birthday =
        (reference.month(), reference.day()) >= (birth_date.month(), birth_date.day());
    reference.year() - birth_date.year() - if had_birthday { 0 } else { 1 }
}
