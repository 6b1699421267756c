//! Forward-chaining inference engine
//!
//! A session runs the rule base over one claim in passes. Each pass
//! evaluates every rule once in rule-base order, applies the writes of the
//! rules that match and records a trace entry per rule. The session is
//! quiescent after a pass that changes nothing, and aborts with
//! [`NonConvergenceError`] when the pass cap is reached while facts are
//! still changing.
//!
//! ```text
//! Idle -> Running -> Quiescent
//!                 \-> Aborted
//! ```
//!
//! Sessions share nothing but the read-only rule base, so one engine can
//! evaluate claims on any number of threads.

use std::fmt;
use std::sync::Arc;

use core_kernel::{Currency, Money};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::derived::{
    ClaimDecision, ClaimValidity, CoverageStatus, DerivedFacts, DerivedField, FraudRisk,
    RejectionReason,
};
use crate::error::{ClaimError, NonConvergenceError};
use crate::explanation::{explain, TraceLine};
use crate::facts::{ClaimFacts, RawClaim};
use crate::memory::{WorkingMemory, WriteOutcome};
use crate::rules::RuleBase;
use crate::trace::{FactWrite, InferenceTrace, RuleConflictEvent, TraceEntry};

/// Default cap on inference passes
pub const DEFAULT_MAX_PASSES: u32 = 5;

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Passes allowed before a still-changing session aborts
    pub max_passes: u32,
    /// Currency of every amount in evaluated claims
    pub currency: Currency,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            currency: Currency::default(),
        }
    }
}

/// Lifecycle of an inference session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Running,
    Quiescent,
    Aborted,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Quiescent => "quiescent",
            EngineState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Evaluates claims against a shared rule base
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    rule_base: Arc<RuleBase>,
    config: EngineConfig,
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InferenceEngine {
    /// Creates an engine over the standard rule base
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rule_base(RuleBase::standard(), config)
    }

    /// Creates an engine over a custom rule base
    pub fn with_rule_base(rule_base: Arc<RuleBase>, config: EngineConfig) -> Self {
        Self { rule_base, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rule_base(&self) -> &Arc<RuleBase> {
        &self.rule_base
    }

    /// Opens an idle session over one claim
    pub fn session<'e, 'f>(&'e self, facts: &'f ClaimFacts) -> InferenceSession<'e, 'f> {
        InferenceSession::new(&self.rule_base, self.config.max_passes, facts)
    }

    /// Evaluates validated facts
    ///
    /// # Errors
    ///
    /// Returns [`NonConvergenceError`] if the session is still changing
    /// facts when the pass cap is reached.
    #[instrument(
        skip_all,
        fields(
            policy_type = %facts.policy_type(),
            loss_type = %facts.loss_type(),
            max_passes = self.config.max_passes,
        )
    )]
    pub fn evaluate(&self, facts: &ClaimFacts) -> Result<EvaluationResult, NonConvergenceError> {
        let mut session = self.session(facts);
        session.run()?;
        let passes = session.passes();
        let (derived, trace) = session.into_parts();
        let result = EvaluationResult::assemble(facts, derived, &trace, passes);

        info!(
            decision = %result.claim_decision,
            payable = %result.payable_amount,
            passes,
            "Claim evaluated"
        );

        Ok(result)
    }

    /// Parses a raw record and evaluates it
    pub fn evaluate_raw(&self, raw: &RawClaim) -> Result<EvaluationResult, ClaimError> {
        let facts = raw.parse(self.config.currency).map_err(|e| {
            warn!(field = %e.field(), error = %e, "Malformed claim record");
            e
        })?;
        Ok(self.evaluate(&facts)?)
    }
}

/// One run of the rule base over one claim
#[derive(Debug)]
pub struct InferenceSession<'e, 'f> {
    rule_base: &'e RuleBase,
    max_passes: u32,
    memory: WorkingMemory<'f>,
    trace: InferenceTrace,
    state: EngineState,
    passes: u32,
    failure: Option<NonConvergenceError>,
}

impl<'e, 'f> InferenceSession<'e, 'f> {
    pub fn new(rule_base: &'e RuleBase, max_passes: u32, facts: &'f ClaimFacts) -> Self {
        Self {
            rule_base,
            max_passes,
            memory: WorkingMemory::new(facts),
            trace: InferenceTrace::new(),
            state: EngineState::Idle,
            passes: 0,
            failure: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Passes run so far
    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn derived(&self) -> &DerivedFacts {
        self.memory.derived()
    }

    pub fn trace(&self) -> &InferenceTrace {
        &self.trace
    }

    /// Runs passes until quiescence or the pass cap
    ///
    /// Running a finished session returns its original outcome without
    /// evaluating anything again.
    pub fn run(&mut self) -> Result<(), NonConvergenceError> {
        match self.state {
            EngineState::Quiescent => return Ok(()),
            EngineState::Aborted | EngineState::Running => {
                return match &self.failure {
                    Some(failure) => Err(failure.clone()),
                    None => Ok(()),
                };
            }
            EngineState::Idle => {}
        }

        self.state = EngineState::Running;

        loop {
            let changed = self.run_pass();

            if changed.is_empty() {
                self.state = EngineState::Quiescent;
                debug!(passes = self.passes, "Session quiescent");
                return Ok(());
            }

            if self.passes >= self.max_passes {
                let failure = NonConvergenceError {
                    passes: self.passes,
                    still_changing: changed,
                };
                warn!(error = %failure, "Session aborted");
                self.state = EngineState::Aborted;
                self.failure = Some(failure.clone());
                return Err(failure);
            }
        }
    }

    /// Evaluates every rule once; returns the fields set during the pass
    fn run_pass(&mut self) -> Vec<DerivedField> {
        self.passes += 1;
        let iteration = self.passes;
        let rule_base = self.rule_base;
        let mut changed = Vec::new();

        for rule in rule_base.rules() {
            let facts = self.memory.facts();

            if !rule.matches(facts, self.memory.derived()) {
                self.trace.push(TraceEntry::not_matched(rule, iteration));
                continue;
            }

            let proposed = rule.consequences(facts, self.memory.derived());
            let mut writes = Vec::with_capacity(proposed.len());

            for value in proposed {
                let outcome = self.memory.set_if_unset(rule.phase, value);
                match outcome {
                    WriteOutcome::Set => {
                        debug!(rule = rule.id, iteration, %value, "Rule fired");
                        if !changed.contains(&value.field()) {
                            changed.push(value.field());
                        }
                    }
                    WriteOutcome::Refused { existing } => {
                        warn!(
                            rule = rule.id,
                            iteration,
                            %existing,
                            attempted = %value,
                            "Rule conflict: write refused"
                        );
                    }
                    WriteOutcome::Unchanged | WriteOutcome::Forbidden { .. } => {}
                }
                writes.push(FactWrite { value, outcome });
            }

            self.trace.push(TraceEntry::matched(rule, iteration, writes));
        }

        changed
    }

    /// Final conclusions and the full trace
    pub fn into_parts(self) -> (DerivedFacts, InferenceTrace) {
        (self.memory.into_derived(), self.trace)
    }
}

/// Everything produced by evaluating one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub claim_validity: ClaimValidity,
    pub coverage_status: CoverageStatus,
    pub claim_decision: ClaimDecision,
    pub rejection_reason: Option<RejectionReason>,
    /// Zero unless the claim is approved
    pub payable_amount: Money,
    pub fraud_risk: FraudRisk,
    pub explanation_text: String,
    pub trace: Vec<TraceLine>,
    pub conflicts: Vec<RuleConflictEvent>,
    pub passes: u32,
}

impl EvaluationResult {
    fn assemble(
        facts: &ClaimFacts,
        derived: DerivedFacts,
        trace: &InferenceTrace,
        passes: u32,
    ) -> Self {
        let explanation = explain(facts, &derived, trace);
        let payable_amount = match (derived.claim_decision, derived.payable_amount) {
            (ClaimDecision::Approved, Some(amount)) => amount,
            _ => Money::zero(facts.currency()),
        };

        Self {
            claim_validity: derived.claim_validity,
            coverage_status: derived.coverage_status,
            claim_decision: derived.claim_decision,
            rejection_reason: derived.rejection_reason,
            payable_amount,
            fraud_risk: derived.fraud_risk,
            explanation_text: explanation.paragraph,
            trace: explanation.trace,
            conflicts: trace.conflicts(),
            passes,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.claim_decision == ClaimDecision::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{LossType, PolicyType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn facts() -> ClaimFacts {
        ClaimFacts::builder(Currency::INR)
            .policy_type(PolicyType::Comprehensive)
            .policy_period(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            )
            .loss_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .loss_type(LossType::Accident)
            .claim_amount(dec!(150000))
            .sum_insured(dec!(500000))
            .deductible(dec!(5000))
            .fir_submitted(true)
            .documents_complete(true)
            .previous_claims(1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_passes, 5);
        assert_eq!(config.currency, Currency::INR);
    }

    #[test]
    fn test_session_state_transitions() {
        let engine = InferenceEngine::default();
        let facts = facts();
        let mut session = engine.session(&facts);
        assert_eq!(session.state(), EngineState::Idle);

        session.run().unwrap();
        assert_eq!(session.state(), EngineState::Quiescent);
        assert_eq!(session.passes(), 2);

        // a finished session does not run again
        session.run().unwrap();
        assert_eq!(session.passes(), 2);
    }

    #[test]
    fn test_every_rule_is_traced_each_pass() {
        let engine = InferenceEngine::default();
        let facts = facts();
        let mut session = engine.session(&facts);
        session.run().unwrap();

        let rules = engine.rule_base().len();
        assert_eq!(session.trace().len(), rules * 2);
        assert!(session
            .trace()
            .entries()
            .iter()
            .filter(|e| e.evaluated_at_iteration == 2)
            .all(|e| !e.fired));
    }

    #[test]
    fn test_single_pass_cap_aborts() {
        let engine = InferenceEngine::new(EngineConfig {
            max_passes: 1,
            ..EngineConfig::default()
        });
        let facts = facts();
        let mut session = engine.session(&facts);

        let err = session.run().unwrap_err();
        assert_eq!(session.state(), EngineState::Aborted);
        assert_eq!(err.passes, 1);
        assert!(err.still_changing.contains(&DerivedField::ClaimDecision));
        assert_eq!(session.run().unwrap_err(), err);
    }

    #[test]
    fn test_payable_is_zero_unless_approved() {
        let engine = InferenceEngine::default();
        let rejected = ClaimFacts::builder(Currency::INR)
            .policy_type(PolicyType::Comprehensive)
            .policy_period(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            )
            .loss_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .loss_type(LossType::Accident)
            .claim_amount(dec!(150000))
            .sum_insured(dec!(500000))
            .deductible(dec!(5000))
            .fir_submitted(true)
            .documents_complete(false)
            .previous_claims(0)
            .build()
            .unwrap();

        let result = engine.evaluate(&rejected).unwrap();
        assert_eq!(result.claim_decision, ClaimDecision::Rejected);
        assert!(result.payable_amount.is_zero());
    }
}
