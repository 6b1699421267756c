//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating claim facts that satisfy the
//! fact model's invariants: non-negative amounts, a single currency and a
//! well-ordered policy period.

use chrono::{Duration, NaiveDate};
use core_kernel::Currency;
use domain_claims::{ClaimFacts, LossType, PolicyType};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating policy types
pub fn policy_type_strategy() -> impl Strategy<Value = PolicyType> {
    prop_oneof![Just(PolicyType::Comprehensive), Just(PolicyType::ThirdParty)]
}

/// Strategy for generating loss types
pub fn loss_type_strategy() -> impl Strategy<Value = LossType> {
    prop_oneof![
        Just(LossType::Accident),
        Just(LossType::Theft),
        Just(LossType::Fire),
        Just(LossType::OwnDamage),
        Just(LossType::ThirdPartyDamage),
    ]
}

/// Strategy for generating non-negative amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Strategy for generating a policy period and a loss date near it
///
/// Loss dates range from 90 days before the start to 90 days after the end,
/// so both in-period and out-of-period losses are common.
pub fn dates_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate, NaiveDate)> {
    (0i64..3650, 0i64..730, -90i64..820).prop_map(|(start_offset, length, loss_offset)| {
        let base = NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid date");
        let start = base + Duration::days(start_offset);
        let end = start + Duration::days(length);
        let loss = start + Duration::days(loss_offset.min(length + 90));
        (start, end, loss)
    })
}

/// Strategy for generating previous claim counts, weighted towards the tier
/// boundaries
pub fn previous_claims_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        3 => 0u32..5,
        1 => 5u32..50,
    ]
}

/// Strategy for generating valid claim facts in INR
pub fn claim_facts_strategy() -> impl Strategy<Value = ClaimFacts> {
    (
        policy_type_strategy(),
        dates_strategy(),
        loss_type_strategy(),
        (amount_strategy(), amount_strategy(), amount_strategy()),
        any::<bool>(),
        any::<bool>(),
        previous_claims_strategy(),
    )
        .prop_map(
            |(
                policy_type,
                (start, end, loss_date),
                loss_type,
                (claim_amount, sum_insured, deductible),
                fir_submitted,
                documents_complete,
                previous_claims,
            )| {
                ClaimFacts::builder(Currency::INR)
                    .policy_type(policy_type)
                    .policy_period(start, end)
                    .loss_date(loss_date)
                    .loss_type(loss_type)
                    .claim_amount(claim_amount)
                    .sum_insured(sum_insured)
                    .deductible(deductible)
                    .fir_submitted(fir_submitted)
                    .documents_complete(documents_complete)
                    .previous_claims(previous_claims)
                    .build()
                    .expect("generated facts satisfy the fact model")
            },
        )
}
