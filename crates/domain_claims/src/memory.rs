//! Working memory for one inference session

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::derived::{DerivedFacts, Derivation};
use crate::facts::ClaimFacts;
use crate::rules::Phase;

/// Result of a single write attempt
///
/// Only `Set` changes working memory. `Refused` and `Forbidden` are normal
/// outcomes that end up in the trace, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The field was unset and now holds the value
    Set,
    /// The field already holds this exact value
    Unchanged,
    /// The field already holds a different value
    Refused { existing: Derivation },
    /// The writing phase does not own the field
    Forbidden { writer: Phase },
}

impl WriteOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, WriteOutcome::Set)
    }
}

/// Input facts plus the conclusions drawn so far
#[derive(Debug)]
pub struct WorkingMemory<'f> {
    facts: &'f ClaimFacts,
    derived: DerivedFacts,
}

impl<'f> WorkingMemory<'f> {
    /// Seeds a fresh memory; every derived field starts unknown
    pub fn new(facts: &'f ClaimFacts) -> Self {
        Self {
            facts,
            derived: DerivedFacts::default(),
        }
    }

    pub fn facts(&self) -> &'f ClaimFacts {
        self.facts
    }

    pub fn derived(&self) -> &DerivedFacts {
        &self.derived
    }

    pub fn into_derived(self) -> DerivedFacts {
        self.derived
    }

    /// The only write primitive: sets a field that is still unset
    pub fn set_if_unset(&mut self, writer: Phase, value: Derivation) -> WriteOutcome {
        let field = value.field();
        if !writer.owns(field) {
            warn!(%writer, %field, "rule attempted to write a field its phase does not own");
            return WriteOutcome::Forbidden { writer };
        }

        match self.derived.get(field) {
            None => {
                self.derived.assign(value);
                WriteOutcome::Set
            }
            Some(existing) if existing == value => WriteOutcome::Unchanged,
            Some(existing) => WriteOutcome::Refused { existing },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::{ClaimDecision, FraudRisk};
    use crate::facts::{LossType, PolicyType};
    use chrono::NaiveDate;
    use core_kernel::Currency;
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
    fn test_first_write_sets() {
        let facts = facts();
        let mut memory = WorkingMemory::new(&facts);
        let outcome = memory.set_if_unset(Phase::Fraud, Derivation::Fraud(FraudRisk::Low));
        assert_eq!(outcome, WriteOutcome::Set);
        assert_eq!(memory.derived().fraud_risk, FraudRisk::Low);
    }

    #[test]
    fn test_same_value_is_unchanged() {
        let facts = facts();
        let mut memory = WorkingMemory::new(&facts);
        let value = Derivation::Decision(ClaimDecision::Rejected);
        memory.set_if_unset(Phase::Documentation, value);
        assert_eq!(
            memory.set_if_unset(Phase::Approval, value),
            WriteOutcome::Unchanged
        );
    }

    #[test]
    fn test_conflicting_value_is_refused() {
        let facts = facts();
        let mut memory = WorkingMemory::new(&facts);
        let rejected = Derivation::Decision(ClaimDecision::Rejected);
        memory.set_if_unset(Phase::Documentation, rejected);

        let outcome = memory.set_if_unset(
            Phase::Approval,
            Derivation::Decision(ClaimDecision::Approved),
        );
        assert_eq!(outcome, WriteOutcome::Refused { existing: rejected });
        assert_eq!(memory.derived().claim_decision, ClaimDecision::Rejected);
    }

    #[test]
    fn test_write_outside_owning_phase_is_forbidden() {
        let facts = facts();
        let mut memory = WorkingMemory::new(&facts);
        let outcome = memory.set_if_unset(
            Phase::Fraud,
            Derivation::Decision(ClaimDecision::Approved),
        );
        assert_eq!(outcome, WriteOutcome::Forbidden { writer: Phase::Fraud });
        assert_eq!(memory.derived().claim_decision, ClaimDecision::Unknown);
    }
}
