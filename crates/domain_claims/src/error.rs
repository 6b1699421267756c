//! Claim evaluation errors

use chrono::NaiveDate;
use thiserror::Error;

use crate::derived::DerivedField;
use crate::facts::ClaimField;

/// A claim record that cannot be turned into valid facts
///
/// Raised at the fact-model boundary, one per offending record; never
/// reaches the inference engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedInputError {
    #[error("{field} is required")]
    Missing { field: ClaimField },

    #[error("{field}: unrecognised date '{value}' (expected YYYY-MM-DD, DD/MM/YYYY or DD-MM-YYYY)")]
    InvalidDate { field: ClaimField, value: String },

    #[error("{field}: '{value}' is not a recognised boolean (yes/no, true/false, 1/0, y/n)")]
    InvalidBoolean { field: ClaimField, value: String },

    #[error("{field}: '{value}' is not numeric")]
    NotNumeric { field: ClaimField, value: String },

    #[error("{field}: {value} must not be negative")]
    Negative { field: ClaimField, value: String },

    #[error("{field}: '{value}' must be a whole number")]
    NotWholeNumber { field: ClaimField, value: String },

    #[error("{field}: '{value}' is not one of {expected}")]
    UnknownVariant {
        field: ClaimField,
        value: String,
        expected: &'static str,
    },

    #[error("policy_end_date {end} is before policy_start_date {start}")]
    PolicyPeriodReversed { start: NaiveDate, end: NaiveDate },
}

impl MalformedInputError {
    /// The offending input column
    pub fn field(&self) -> ClaimField {
        match self {
            MalformedInputError::Missing { field }
            | MalformedInputError::InvalidDate { field, .. }
            | MalformedInputError::InvalidBoolean { field, .. }
            | MalformedInputError::NotNumeric { field, .. }
            | MalformedInputError::Negative { field, .. }
            | MalformedInputError::NotWholeNumber { field, .. }
            | MalformedInputError::UnknownVariant { field, .. } => *field,
            MalformedInputError::PolicyPeriodReversed { .. } => ClaimField::PolicyEndDate,
        }
    }
}

/// The pass cap was reached while rules were still changing facts
///
/// Signals a rule-base defect. Fatal to the affected session only and
/// never retried: the computation is deterministic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("inference did not converge after {passes} passes (still changing: {})", join_fields(.still_changing))]
pub struct NonConvergenceError {
    pub passes: u32,
    pub still_changing: Vec<DerivedField>,
}

fn join_fields(fields: &[DerivedField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while assembling a rule base
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleBaseError {
    #[error("Rule base has no rules")]
    Empty,

    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),
}

/// Errors that can occur while evaluating a claim record
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Malformed claim record: {0}")]
    MalformedInput(#[from] MalformedInputError),

    #[error("Evaluation aborted: {0}")]
    NonConvergence(#[from] NonConvergenceError),
}
