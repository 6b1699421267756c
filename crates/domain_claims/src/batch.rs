//! Batch evaluation
//!
//! Each record is parsed and evaluated on its own; a malformed or
//! non-converging record is reported in place and does not stop the batch.

use core_kernel::{Currency, Money};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::derived::ClaimDecision;
use crate::engine::{EvaluationResult, InferenceEngine};
use crate::error::ClaimError;
use crate::facts::RawClaim;

/// Result for one record, keyed by its input position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub index: usize,
    pub result: Result<EvaluationResult, ClaimError>,
}

/// Counts and totals over a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub evaluated: usize,
    pub approved: usize,
    pub rejected: usize,
    pub under_investigation: usize,
    pub malformed: usize,
    /// Sessions that aborted without converging
    pub failed: usize,
    pub total_payout: Money,
    /// Approved payouts that could not be added to `total_payout`
    pub payouts_excluded: usize,
}

impl BatchSummary {
    fn empty(currency: Currency) -> Self {
        Self {
            total: 0,
            evaluated: 0,
            approved: 0,
            rejected: 0,
            under_investigation: 0,
            malformed: 0,
            failed: 0,
            total_payout: Money::zero(currency),
            payouts_excluded: 0,
        }
    }

    fn record(&mut self, outcome: &BatchOutcome) {
        self.total += 1;
        let result = match &outcome.result {
            Ok(result) => result,
            Err(ClaimError::MalformedInput(_)) => {
                self.malformed += 1;
                return;
            }
            Err(ClaimError::NonConvergence(_)) => {
                self.failed += 1;
                return;
            }
        };

        self.evaluated += 1;
        match result.claim_decision {
            ClaimDecision::Approved => {
                self.approved += 1;
                match self.total_payout.checked_add(&result.payable_amount) {
                    Ok(sum) => self.total_payout = sum,
                    Err(e) => {
                        self.payouts_excluded += 1;
                        warn!(index = outcome.index, error = %e, "Payout left out of batch total");
                    }
                }
            }
            ClaimDecision::Rejected => self.rejected += 1,
            ClaimDecision::UnderInvestigation => self.under_investigation += 1,
            ClaimDecision::Unknown => {}
        }
    }
}

/// Outcomes in input order plus their summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Assembles a report from outcomes produced in any order
    pub fn from_outcomes(mut outcomes: Vec<BatchOutcome>, currency: Currency) -> Self {
        outcomes.sort_by_key(|o| o.index);

        let mut summary = BatchSummary::empty(currency);
        for outcome in &outcomes {
            summary.record(outcome);
        }

        info!(
            total = summary.total,
            approved = summary.approved,
            rejected = summary.rejected,
            under_investigation = summary.under_investigation,
            malformed = summary.malformed,
            failed = summary.failed,
            total_payout = %summary.total_payout,
            payouts_excluded = summary.payouts_excluded,
            "Batch evaluated"
        );

        Self { outcomes, summary }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl InferenceEngine {
    /// Evaluates records one after another
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn evaluate_batch(&self, records: &[RawClaim]) -> BatchReport {
        let outcomes = records
            .iter()
            .enumerate()
            .map(|(index, raw)| BatchOutcome {
                index,
                result: self.evaluate_raw(raw),
            })
            .collect();

        BatchReport::from_outcomes(outcomes, self.config().currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::RawField;

    fn raw(documents_complete: &str) -> RawClaim {
        RawClaim {
            policy_type: Some(RawField::from("comprehensive")),
            policy_start_date: Some(RawField::from("2024-01-01")),
            policy_end_date: Some(RawField::from("2025-01-01")),
            loss_date: Some(RawField::from("2024-06-15")),
            loss_type: Some(RawField::from("accident")),
            claim_amount: Some(RawField::from("150000")),
            sum_insured: Some(RawField::from("500000")),
            deductible: Some(RawField::from("5000")),
            fir_submitted: Some(RawField::from("yes")),
            documents_complete: Some(RawField::from(documents_complete)),
            previous_claims: Some(RawField::from("1")),
        }
    }

    #[test]
    fn test_batch_keeps_input_order_and_isolates_failures() {
        let engine = InferenceEngine::default();
        let records = vec![raw("yes"), raw("maybe"), raw("no")];

        let report = engine.evaluate_batch(&records);
        assert_eq!(report.len(), 3);
        assert_eq!(
            report.outcomes.iter().map(|o| o.index).collect::<Vec<_>>(),
            [0, 1, 2]
        );
        assert!(matches!(
            report.outcomes[1].result,
            Err(ClaimError::MalformedInput(_))
        ));

        let summary = &report.summary;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.evaluated, 2);
        assert_eq!(summary.approved, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.total_payout.amount(), rust_decimal_macros::dec!(145000));
    }

    #[test]
    fn test_from_outcomes_sorts_by_index() {
        let engine = InferenceEngine::default();
        let outcomes = vec![
            BatchOutcome {
                index: 1,
                result: engine.evaluate_raw(&raw("no")),
            },
            BatchOutcome {
                index: 0,
                result: engine.evaluate_raw(&raw("yes")),
            },
        ];

        let report = BatchReport::from_outcomes(outcomes, Currency::INR);
        assert_eq!(report.outcomes[0].index, 0);
        assert!(report.outcomes[0].result.as_ref().unwrap().is_approved());
    }

    #[test]
    fn test_total_overflow_does_not_abort_batch() {
        let huge = |amount: &str| RawClaim {
            claim_amount: Some(RawField::from(amount)),
            sum_insured: Some(RawField::from(amount)),
            deductible: Some(RawField::from("0")),
            ..raw("yes")
        };
        let engine = InferenceEngine::default();
        let records = vec![
            huge("50000000000000000000000000000"),
            huge("50000000000000000000000000000"),
            raw("yes"),
        ];

        let report = engine.evaluate_batch(&records);
        assert_eq!(report.len(), 3);
        assert!(report.outcomes.iter().all(|o| o.result.as_ref().unwrap().is_approved()));

        let summary = &report.summary;
        assert_eq!(summary.approved, 3);
        assert_eq!(summary.payouts_excluded, 1);
        assert_eq!(
            summary.total_payout.amount(),
            rust_decimal_macros::dec!(50000000000000000000000000000)
                + rust_decimal_macros::dec!(145000)
        );
    }

    #[test]
    fn test_empty_batch() {
        let report = InferenceEngine::default().evaluate_batch(&[]);
        assert!(report.is_empty());
        assert_eq!(report.summary.total, 0);
        assert!(report.summary.total_payout.is_zero());
    }
}
