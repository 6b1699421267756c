//! Rule base
//!
//! Production rules are plain tagged structures: an id, the phase that owns
//! them, a description used in explanations, and two function pointers for
//! the condition and the consequent writes. Conditions and actions are pure
//! functions of the current facts.
//!
//! # Phases
//!
//! ```text
//! validity -> coverage -> documentation -> fraud -> investigation -> approval -> payout
//! ```
//!
//! Later phases read conclusions drawn by earlier ones, so the rule base
//! keeps rules ordered by phase and, within a phase, in declared order.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use core_kernel::Money;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::derived::{
    ClaimDecision, ClaimValidity, CoverageStatus, DerivedFacts, DerivedField, Derivation,
    FraudRisk, RejectionReason,
};
use crate::error::RuleBaseError;
use crate::facts::{ClaimFacts, LossType, PolicyType};

/// Previous-claim count at which fraud risk becomes high
pub const HIGH_RISK_PREVIOUS_CLAIMS: u32 = 3;

/// Firing phase, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Validity,
    Coverage,
    Documentation,
    Fraud,
    Investigation,
    Approval,
    Payout,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Validity,
        Phase::Coverage,
        Phase::Documentation,
        Phase::Fraud,
        Phase::Investigation,
        Phase::Approval,
        Phase::Payout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Validity => "validity",
            Phase::Coverage => "coverage",
            Phase::Documentation => "documentation",
            Phase::Fraud => "fraud",
            Phase::Investigation => "investigation",
            Phase::Approval => "approval",
            Phase::Payout => "payout",
        }
    }

    /// Whether rules of this phase may write the field
    pub fn owns(&self, field: DerivedField) -> bool {
        match self {
            Phase::Validity => field == DerivedField::ClaimValidity,
            Phase::Coverage => field == DerivedField::CoverageStatus,
            Phase::Fraud => field == DerivedField::FraudRisk,
            Phase::Investigation => field == DerivedField::ClaimDecision,
            Phase::Documentation | Phase::Approval => matches!(
                field,
                DerivedField::ClaimDecision | DerivedField::RejectionReason
            ),
            Phase::Payout => field == DerivedField::PayableAmount,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule condition over the input facts and the conclusions so far
pub type Condition = fn(&ClaimFacts, &DerivedFacts) -> bool;

/// Rule consequent: the values the rule proposes to write
pub type Action = fn(&ClaimFacts, &DerivedFacts) -> Vec<Derivation>;

/// A single production rule
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub phase: Phase,
    pub description: &'static str,
    pub condition: Condition,
    pub action: Action,
}

impl Rule {
    pub const fn new(
        id: &'static str,
        phase: Phase,
        description: &'static str,
        condition: Condition,
        action: Action,
    ) -> Self {
        Self {
            id,
            phase,
            description,
            condition,
            action,
        }
    }

    /// Evaluates the condition
    pub fn matches(&self, facts: &ClaimFacts, derived: &DerivedFacts) -> bool {
        (self.condition)(facts, derived)
    }

    /// Computes the proposed writes
    pub fn consequences(&self, facts: &ClaimFacts, derived: &DerivedFacts) -> Vec<Derivation> {
        (self.action)(facts, derived)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable catalog of rules
///
/// Shared read-only between concurrent sessions.
#[derive(Debug, Clone)]
pub struct RuleBase {
    rules: Vec<Rule>,
}

static STANDARD: Lazy<Arc<RuleBase>> = Lazy::new(|| Arc::new(RuleBase::ordered(standard_rules())));

impl RuleBase {
    /// Builds a rule base from rules in declared order
    ///
    /// Rule ids must be unique. Rules are stably ordered by phase, so the
    /// declared order within each phase is preserved.
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleBaseError> {
        if rules.is_empty() {
            return Err(RuleBaseError::Empty);
        }

        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.id) {
                return Err(RuleBaseError::DuplicateRuleId(rule.id.to_string()));
            }
        }

        Ok(Self::ordered(rules))
    }

    fn ordered(mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(|rule| rule.phase);
        Self { rules }
    }

    /// The claim evaluation catalog, built once per process
    pub fn standard() -> Arc<RuleBase> {
        Arc::clone(&STANDARD)
    }

    /// All rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules of a single phase, in declared order
    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |rule| rule.phase == phase)
    }

    /// Looks up a rule by id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn reject(reason: RejectionReason) -> Vec<Derivation> {
    vec![
        Derivation::Decision(ClaimDecision::Rejected),
        Derivation::Rejection(reason),
    ]
}

/// The standard claim evaluation rules, in declared order
pub fn standard_rules() -> Vec<Rule> {
    vec![
        // Policy validity
        Rule::new(
            "VAL-001",
            Phase::Validity,
            "Loss date outside the policy period makes the claim invalid",
            |f, _| !f.loss_in_period(),
            |_, _| vec![Derivation::Validity(ClaimValidity::Invalid)],
        ),
        Rule::new(
            "VAL-002",
            Phase::Validity,
            "Loss date within the policy period makes the claim valid",
            |f, _| f.loss_in_period(),
            |_, _| vec![Derivation::Validity(ClaimValidity::Valid)],
        ),
        // Coverage
        Rule::new(
            "COV-001",
            Phase::Coverage,
            "Third-party policies do not cover own damage",
            |f, _| f.policy_type() == PolicyType::ThirdParty && f.loss_type() == LossType::OwnDamage,
            |_, _| vec![Derivation::Coverage(CoverageStatus::NotCovered)],
        ),
        Rule::new(
            "COV-002",
            Phase::Coverage,
            "Comprehensive policies cover accident, theft and fire",
            |f, _| {
                f.policy_type() == PolicyType::Comprehensive
                    && matches!(f.loss_type(), LossType::Accident | LossType::Theft | LossType::Fire)
            },
            |_, _| vec![Derivation::Coverage(CoverageStatus::Covered)],
        ),
        Rule::new(
            "COV-003",
            Phase::Coverage,
            "Comprehensive policies cover own damage",
            |f, _| f.policy_type() == PolicyType::Comprehensive && f.loss_type() == LossType::OwnDamage,
            |_, _| vec![Derivation::Coverage(CoverageStatus::Covered)],
        ),
        Rule::new(
            "COV-004",
            Phase::Coverage,
            "Third-party damage is covered under every policy type",
            |f, _| f.loss_type() == LossType::ThirdPartyDamage,
            |_, _| vec![Derivation::Coverage(CoverageStatus::Covered)],
        ),
        Rule::new(
            "COV-005",
            Phase::Coverage,
            "Any other loss is not covered by the policy",
            |_, d| d.coverage_status == CoverageStatus::Unknown,
            |_, _| vec![Derivation::Coverage(CoverageStatus::NotCovered)],
        ),
        // Mandatory documents
        Rule::new(
            "DOC-001",
            Phase::Documentation,
            "Theft and fire losses require an FIR",
            |f, _| f.loss_type().requires_fir() && !f.fir_submitted(),
            |_, _| reject(RejectionReason::FirNotSubmitted),
        ),
        Rule::new(
            "DOC-002",
            Phase::Documentation,
            "All mandatory documents must be complete",
            |f, _| !f.documents_complete(),
            |_, _| reject(RejectionReason::IncompleteDocumentation),
        ),
        // Fraud risk
        Rule::new(
            "FRD-001",
            Phase::Fraud,
            "Three or more previous claims indicate high fraud risk",
            |f, _| f.previous_claims() >= HIGH_RISK_PREVIOUS_CLAIMS,
            |_, _| vec![Derivation::Fraud(FraudRisk::High)],
        ),
        Rule::new(
            "FRD-002",
            Phase::Fraud,
            "Exactly two previous claims indicate medium fraud risk",
            |f, _| f.previous_claims() == 2,
            |_, _| vec![Derivation::Fraud(FraudRisk::Medium)],
        ),
        Rule::new(
            "FRD-003",
            Phase::Fraud,
            "At most one previous claim indicates low fraud risk",
            |f, _| f.previous_claims() <= 1,
            |_, _| vec![Derivation::Fraud(FraudRisk::Low)],
        ),
        // Investigation
        Rule::new(
            "INV-001",
            Phase::Investigation,
            "High fraud risk sends a claim that was not rejected for investigation",
            |_, d| d.fraud_risk == FraudRisk::High && d.claim_decision != ClaimDecision::Rejected,
            |_, _| vec![Derivation::Decision(ClaimDecision::UnderInvestigation)],
        ),
        // Final decision
        Rule::new(
            "APR-001",
            Phase::Approval,
            "A claim outside the policy period is rejected",
            |_, d| {
                d.claim_validity == ClaimValidity::Invalid
                    && d.claim_decision == ClaimDecision::Unknown
            },
            |_, _| reject(RejectionReason::OutsidePolicyPeriod),
        ),
        Rule::new(
            "APR-002",
            Phase::Approval,
            "A loss not covered by the policy is rejected",
            |_, d| {
                d.coverage_status == CoverageStatus::NotCovered
                    && d.claim_decision == ClaimDecision::Unknown
            },
            |_, _| reject(RejectionReason::LossNotCovered),
        ),
        Rule::new(
            "APR-003",
            Phase::Approval,
            "A valid, covered and fully documented claim is approved",
            |f, d| {
                d.claim_validity == ClaimValidity::Valid
                    && d.coverage_status == CoverageStatus::Covered
                    && f.documents_complete()
                    && d.claim_decision == ClaimDecision::Unknown
            },
            |_, _| vec![Derivation::Decision(ClaimDecision::Approved)],
        ),
        Rule::new(
            "APR-004",
            Phase::Approval,
            "A claim meeting no approval criteria is rejected",
            |_, d| d.claim_decision == ClaimDecision::Unknown,
            |_, _| reject(RejectionReason::ApprovalCriteriaNotMet),
        ),
        // Payout
        Rule::new(
            "PAY-001",
            Phase::Payout,
            "Approved claims pay the admissible loss less the deductible",
            |_, d| d.claim_decision == ClaimDecision::Approved,
            |f, _| vec![Derivation::Payable(f.net_payable())],
        ),
        Rule::new(
            "PAY-002",
            Phase::Payout,
            "Claims that are not approved pay nothing",
            |_, d| {
                !matches!(
                    d.claim_decision,
                    ClaimDecision::Approved | ClaimDecision::Unknown
                )
            },
            |f, _| vec![Derivation::Payable(Money::zero(f.currency()))],
        ),
    ]
}
