//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for evaluation results that give
//! more meaningful error messages than standard assertions.

use domain_claims::{ClaimDecision, ClaimFacts, EvaluationResult, Phase};
use rust_decimal::Decimal;

use crate::fixtures::Scenario;

/// Asserts that a claim was approved with the expected payout
///
/// # Panics
///
/// Panics if the decision is not approved or the payout differs
pub fn assert_approved(result: &EvaluationResult, payable: Decimal) {
    assert_eq!(
        result.claim_decision,
        ClaimDecision::Approved,
        "Expected approval, got {} ({})",
        result.claim_decision,
        result.explanation_text
    );
    assert_eq!(
        result.payable_amount.amount(),
        payable,
        "Payable amount mismatch: actual={}, expected={}",
        result.payable_amount.amount(),
        payable
    );
}

/// Asserts that nothing is payable
pub fn assert_no_payout(result: &EvaluationResult) {
    assert!(
        result.payable_amount.is_zero(),
        "Expected no payout for a {} claim, got {}",
        result.claim_decision,
        result.payable_amount
    );
}

/// Asserts that the payout lies between zero and the sum insured, and is
/// zero unless the claim was approved
pub fn assert_payout_bounded(facts: &ClaimFacts, result: &EvaluationResult) {
    let payable = result.payable_amount.amount();
    assert!(
        payable >= Decimal::ZERO,
        "Payable amount is negative: {}",
        payable
    );
    assert!(
        payable <= facts.sum_insured().amount(),
        "Payable amount {} exceeds sum insured {}",
        payable,
        facts.sum_insured().amount()
    );
    if result.claim_decision != ClaimDecision::Approved {
        assert_no_payout(result);
    }
}

/// Asserts that no rule of the phase changed a fact after the first pass
pub fn assert_quiet_after_first_pass(result: &EvaluationResult, phase: Phase) {
    let late: Vec<_> = result
        .trace
        .iter()
        .filter(|line| line.phase == phase && line.iteration > 1 && line.fired)
        .map(|line| line.rule_id.as_str())
        .collect();
    assert!(late.is_empty(), "Rules fired after pass 1: {:?}", late);
}

/// Asserts that a result matches a reference scenario
pub fn assert_scenario(scenario: &Scenario, result: &EvaluationResult) {
    assert_eq!(
        result.claim_decision, scenario.decision,
        "Scenario {}: decision mismatch",
        scenario.name
    );
    assert_eq!(
        result.rejection_reason, scenario.rejection_reason,
        "Scenario {}: rejection reason mismatch",
        scenario.name
    );
    assert_eq!(
        result.payable_amount.amount(),
        scenario.payable,
        "Scenario {}: payable mismatch",
        scenario.name
    );
}
