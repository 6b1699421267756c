//! Property tests for claim evaluation over generated claims

use proptest::prelude::*;

use domain_claims::{
    ClaimDecision, CoverageStatus, FraudRisk, InferenceEngine, LossType, Phase, PolicyType,
    RejectionReason,
};
use test_utils::{
    assert_payout_bounded, assert_quiet_after_first_pass, assert_scenario, claim_facts_strategy,
    ScenarioFixtures,
};

#[test]
fn test_reference_scenarios() {
    let engine = InferenceEngine::default();
    for scenario in ScenarioFixtures::all() {
        let result = engine.evaluate_raw(&scenario.raw).unwrap();
        assert_scenario(&scenario, &result);
    }
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(facts in claim_facts_strategy()) {
        let engine = InferenceEngine::default();
        let first = engine.evaluate(&facts).unwrap();
        let second = engine.evaluate(&facts).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn standard_rules_always_converge_in_two_passes(facts in claim_facts_strategy()) {
        let result = InferenceEngine::default().evaluate(&facts).unwrap();
        prop_assert_eq!(result.passes, 2);
        prop_assert_ne!(result.claim_decision, ClaimDecision::Unknown);
        for phase in Phase::ALL {
            assert_quiet_after_first_pass(&result, phase);
        }
    }

    #[test]
    fn payout_is_bounded(facts in claim_facts_strategy()) {
        let result = InferenceEngine::default().evaluate(&facts).unwrap();
        assert_payout_bounded(&facts, &result);
    }

    #[test]
    fn third_party_never_covers_own_damage(facts in claim_facts_strategy()) {
        let result = InferenceEngine::default().evaluate(&facts).unwrap();
        if facts.policy_type() == PolicyType::ThirdParty && facts.loss_type() == LossType::OwnDamage {
            prop_assert_eq!(result.coverage_status, CoverageStatus::NotCovered);
            prop_assert!(matches!(
                result.claim_decision,
                ClaimDecision::Rejected | ClaimDecision::UnderInvestigation
            ));
        }
    }

    #[test]
    fn fraud_tier_follows_claim_history(facts in claim_facts_strategy()) {
        let result = InferenceEngine::default().evaluate(&facts).unwrap();
        let expected = match facts.previous_claims() {
            0 | 1 => FraudRisk::Low,
            2 => FraudRisk::Medium,
            _ => FraudRisk::High,
        };
        prop_assert_eq!(result.fraud_risk, expected);

        let tier_rules_fired = result
            .trace
            .iter()
            .filter(|line| line.phase == Phase::Fraud && line.fired)
            .count();
        prop_assert_eq!(tier_rules_fired, 1);
    }

    #[test]
    fn documentation_rejection_is_final(facts in claim_facts_strategy()) {
        let result = InferenceEngine::default().evaluate(&facts).unwrap();
        let fir_missing = facts.loss_type().requires_fir() && !facts.fir_submitted();

        if fir_missing {
            prop_assert_eq!(result.claim_decision, ClaimDecision::Rejected);
            prop_assert_eq!(result.rejection_reason, Some(RejectionReason::FirNotSubmitted));
        } else if !facts.documents_complete() {
            prop_assert_eq!(result.claim_decision, ClaimDecision::Rejected);
            prop_assert_eq!(
                result.rejection_reason,
                Some(RejectionReason::IncompleteDocumentation)
            );
        }
    }

    #[test]
    fn high_risk_blocks_approval(facts in claim_facts_strategy()) {
        let result = InferenceEngine::default().evaluate(&facts).unwrap();
        if result.fraud_risk == FraudRisk::High {
            prop_assert_ne!(result.claim_decision, ClaimDecision::Approved);
        }
    }

    #[test]
    fn approved_payout_matches_formula(facts in claim_facts_strategy()) {
        let result = InferenceEngine::default().evaluate(&facts).unwrap();
        if result.claim_decision == ClaimDecision::Approved {
            prop_assert_eq!(result.payable_amount, facts.net_payable());
        }
    }
}
