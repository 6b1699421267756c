//! Pre-built Test Fixtures
//!
//! Provides ready-to-use claim data for the reference evaluation scenarios.
//! These fixtures are designed to be consistent and predictable for unit tests.

use chrono::NaiveDate;
use core_kernel::{Currency, Money};
use domain_claims::{ClaimDecision, RawClaim, RejectionReason};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::builders::TestClaimBuilder;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Claimed amount of the reference accident claim
    pub fn inr_claim() -> Money {
        Money::new(dec!(150000), Currency::INR)
    }

    /// Sum insured of the reference policy
    pub fn inr_sum_insured() -> Money {
        Money::new(dec!(500000), Currency::INR)
    }

    /// Deductible of the reference policy
    pub fn inr_deductible() -> Money {
        Money::new(dec!(5000), Currency::INR)
    }

    /// Creates a zero amount
    pub fn inr_zero() -> Money {
        Money::zero(Currency::INR)
    }
}

/// Fixture for policy dates
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// First day of the reference policy
    pub fn policy_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    /// Last day of the reference policy
    pub fn policy_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
    }

    /// A loss date well inside the policy period
    pub fn loss_in_period() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
    }

    /// A loss date after the policy expired
    pub fn loss_after_expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date")
    }
}

/// A raw claim together with the outcome it must produce
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub raw: RawClaim,
    pub decision: ClaimDecision,
    pub rejection_reason: Option<RejectionReason>,
    pub payable: Decimal,
}

/// Fixture for the reference evaluation scenarios
pub struct ScenarioFixtures;

impl ScenarioFixtures {
    /// Comprehensive accident claim, fully documented, one previous claim
    pub fn approved_accident() -> Scenario {
        Scenario {
            name: "approved_accident",
            raw: TestClaimBuilder::new().build_raw(),
            decision: ClaimDecision::Approved,
            rejection_reason: None,
            payable: dec!(145000),
        }
    }

    /// Own damage claimed on a third-party policy
    pub fn third_party_own_damage() -> Scenario {
        Scenario {
            name: "third_party_own_damage",
            raw: TestClaimBuilder::new()
                .with_policy_type("third_party")
                .with_loss_type("own_damage")
                .build_raw(),
            decision: ClaimDecision::Rejected,
            rejection_reason: Some(RejectionReason::LossNotCovered),
            payable: Decimal::ZERO,
        }
    }

    /// Otherwise approvable claim from a claimant with three previous claims
    pub fn repeat_claimant() -> Scenario {
        Scenario {
            name: "repeat_claimant",
            raw: TestClaimBuilder::new().with_previous_claims(3).build_raw(),
            decision: ClaimDecision::UnderInvestigation,
            rejection_reason: None,
            payable: Decimal::ZERO,
        }
    }

    /// Theft reported without an FIR
    pub fn theft_without_fir() -> Scenario {
        Scenario {
            name: "theft_without_fir",
            raw: TestClaimBuilder::new()
                .with_loss_type("theft")
                .with_fir_submitted(false)
                .build_raw(),
            decision: ClaimDecision::Rejected,
            rejection_reason: Some(RejectionReason::FirNotSubmitted),
            payable: Decimal::ZERO,
        }
    }

    /// Claim above the sum insured
    pub fn capped_payout() -> Scenario {
        Scenario {
            name: "capped_payout",
            raw: TestClaimBuilder::new()
                .with_claim_amount(dec!(350000))
                .with_sum_insured(dec!(300000))
                .with_deductible(dec!(10000))
                .build_raw(),
            decision: ClaimDecision::Approved,
            rejection_reason: None,
            payable: dec!(290000),
        }
    }

    /// Loss after the policy expired
    pub fn expired_policy() -> Scenario {
        Scenario {
            name: "expired_policy",
            raw: TestClaimBuilder::new()
                .with_loss_date(TemporalFixtures::loss_after_expiry())
                .build_raw(),
            decision: ClaimDecision::Rejected,
            rejection_reason: Some(RejectionReason::OutsidePolicyPeriod),
            payable: Decimal::ZERO,
        }
    }

    /// Every reference scenario
    pub fn all() -> Vec<Scenario> {
        vec![
            Self::approved_accident(),
            Self::third_party_own_damage(),
            Self::repeat_claimant(),
            Self::theft_without_fir(),
            Self::capped_payout(),
            Self::expired_policy(),
        ]
    }
}
