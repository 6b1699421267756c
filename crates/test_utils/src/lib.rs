//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim evaluator test suite.
//!
//! # Modules
//!
//! - `fixtures`: Reference claims and the outcomes they must produce
//! - `builders`: Builder patterns for test claim construction
//! - `assertions`: Custom assertion helpers for evaluation results
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
