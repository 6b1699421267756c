//! Claim Evaluation Domain
//!
//! A forward-chaining rule engine that decides motor insurance claims. A raw
//! claim record is validated into [`ClaimFacts`], the [`InferenceEngine`]
//! fires the phased [`RuleBase`] against it until no rule changes anything,
//! and the result carries the decision, the payable amount, the full
//! inference trace and a plain-language explanation.
//!
//! # Evaluation Pipeline
//!
//! ```text
//! RawClaim -> ClaimFacts -> InferenceSession (passes) -> DerivedFacts -> EvaluationResult
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_claims::{InferenceEngine, RawClaim};
//!
//! let engine = InferenceEngine::default();
//! let record: RawClaim = serde_json::from_str(json)?;
//! let result = engine.evaluate_raw(&record)?;
//! println!("{}", result.explanation_text);
//! ```

pub mod batch;
pub mod derived;
pub mod engine;
pub mod error;
pub mod explanation;
pub mod facts;
pub mod memory;
pub mod rules;
pub mod trace;

pub use batch::{BatchOutcome, BatchReport, BatchSummary};
pub use derived::{
    ClaimDecision, ClaimValidity, CoverageStatus, DerivedFacts, DerivedField, Derivation,
    FraudRisk, RejectionReason,
};
pub use engine::{
    EngineConfig, EngineState, EvaluationResult, InferenceEngine, InferenceSession,
    DEFAULT_MAX_PASSES,
};
pub use error::{ClaimError, MalformedInputError, NonConvergenceError, RuleBaseError};
pub use explanation::{explain, render_trace, Explanation, TraceLine};
pub use facts::{ClaimFacts, ClaimFactsBuilder, ClaimField, LossType, PolicyType, RawClaim, RawField};
pub use memory::{WorkingMemory, WriteOutcome};
pub use rules::{Phase, Rule, RuleBase, HIGH_RISK_PREVIOUS_CLAIMS};
pub use trace::{FactWrite, InferenceTrace, RuleConflictEvent, TraceEntry};
