//! Explanation facility
//!
//! Turns the conclusions and trace of a session into a display trace and a
//! plain-language paragraph. Output is a pure function of its inputs: the
//! same session always produces the same text.

use serde::{Deserialize, Serialize};

use crate::derived::{ClaimDecision, ClaimValidity, CoverageStatus, DerivedFacts, FraudRisk};
use crate::facts::ClaimFacts;
use crate::rules::{Phase, HIGH_RISK_PREVIOUS_CLAIMS};
use crate::trace::{InferenceTrace, TraceEntry};

const DATE_FORMAT: &str = "%d %b %Y";

/// One row of the display trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLine {
    pub rule_id: String,
    pub phase: Phase,
    pub description: String,
    pub iteration: u32,
    pub matched: bool,
    pub fired: bool,
    /// Resulting field values, or the conflict note
    pub note: String,
}

impl From<&TraceEntry> for TraceLine {
    fn from(entry: &TraceEntry) -> Self {
        Self {
            rule_id: entry.rule_id.clone(),
            phase: entry.phase,
            description: entry.description.clone(),
            iteration: entry.evaluated_at_iteration,
            matched: entry.matched,
            fired: entry.fired,
            note: entry.reason.clone(),
        }
    }
}

impl TraceLine {
    fn status(&self) -> &'static str {
        match (self.matched, self.fired) {
            (_, true) => "fired",
            (true, false) => "matched",
            (false, false) => "no match",
        }
    }
}

/// Display trace plus narrative for one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub paragraph: String,
    pub trace: Vec<TraceLine>,
}

impl Explanation {
    pub fn render_trace(&self) -> String {
        render_trace(&self.trace)
    }
}

/// Builds the explanation for a finished session
pub fn explain(facts: &ClaimFacts, derived: &DerivedFacts, trace: &InferenceTrace) -> Explanation {
    Explanation {
        paragraph: narrate(facts, derived),
        trace: trace.entries().iter().map(TraceLine::from).collect(),
    }
}

/// Plain-text rendering, one line per rule evaluation
pub fn render_trace(lines: &[TraceLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "[pass {}] {} ({}) {}: {}",
                line.iteration,
                line.rule_id,
                line.phase,
                line.status(),
                line.note
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn narrate(facts: &ClaimFacts, derived: &DerivedFacts) -> String {
    let sentences = [
        headline(facts, derived),
        validity(facts, derived.claim_validity),
        coverage(facts, derived.coverage_status),
        documentation(facts),
        fraud(facts, derived.fraud_risk),
        payout(facts, derived),
    ];
    sentences.join(" ")
}

fn headline(facts: &ClaimFacts, derived: &DerivedFacts) -> String {
    match derived.claim_decision {
        ClaimDecision::Approved => "Claim approved.".to_string(),
        ClaimDecision::Rejected => match derived.rejection_reason {
            Some(reason) => format!("Claim rejected because {}.", reason.describe()),
            None => "Claim rejected.".to_string(),
        },
        ClaimDecision::UnderInvestigation => format!(
            "Claim referred for investigation: {} meet the high-risk threshold of {}.",
            previous_claims(facts.previous_claims()),
            HIGH_RISK_PREVIOUS_CLAIMS
        ),
        ClaimDecision::Unknown => "No decision was reached.".to_string(),
    }
}

fn validity(facts: &ClaimFacts, validity: ClaimValidity) -> String {
    let position = match validity {
        ClaimValidity::Valid => "within",
        ClaimValidity::Invalid => "outside",
        ClaimValidity::Unknown => return "Policy validity was not determined.".to_string(),
    };
    format!(
        "The loss on {} falls {} the policy period {} to {}.",
        facts.loss_date().format(DATE_FORMAT),
        position,
        facts.policy_start_date().format(DATE_FORMAT),
        facts.policy_end_date().format(DATE_FORMAT)
    )
}

fn coverage(facts: &ClaimFacts, coverage: CoverageStatus) -> String {
    let is = match coverage {
        CoverageStatus::Covered => "is",
        CoverageStatus::NotCovered => "is not",
        CoverageStatus::Unknown => return "Coverage was not determined.".to_string(),
    };
    format!(
        "The {} loss {} covered under the {} policy.",
        humanize(facts.loss_type().as_str()),
        is,
        humanize(facts.policy_type().as_str())
    )
}

fn documentation(facts: &ClaimFacts) -> String {
    let requires_fir = facts.loss_type().requires_fir();
    let fir_missing = requires_fir && !facts.fir_submitted();

    match (fir_missing, facts.documents_complete()) {
        (true, true) => format!(
            "An FIR is required for a {} loss but was not submitted.",
            humanize(facts.loss_type().as_str())
        ),
        (true, false) => format!(
            "An FIR is required for a {} loss but was not submitted, and the mandatory documents are incomplete.",
            humanize(facts.loss_type().as_str())
        ),
        (false, false) => "The mandatory documents are incomplete.".to_string(),
        (false, true) if requires_fir => {
            "All mandatory documents were submitted, including the FIR.".to_string()
        }
        (false, true) => "All mandatory documents were submitted.".to_string(),
    }
}

fn fraud(facts: &ClaimFacts, risk: FraudRisk) -> String {
    let history = previous_claims(facts.previous_claims());
    match risk {
        FraudRisk::Unknown => "Fraud risk was not assessed.".to_string(),
        FraudRisk::Medium => {
            format!("Fraud risk is medium ({history}); the settlement may be reviewed before payment.")
        }
        FraudRisk::Low | FraudRisk::High => format!("Fraud risk is {risk} ({history})."),
    }
}

fn payout(facts: &ClaimFacts, derived: &DerivedFacts) -> String {
    match (derived.claim_decision, derived.payable_amount) {
        (ClaimDecision::Approved, Some(payable)) => {
            let admissible = facts.admissible_loss();
            let capped = if facts.claim_amount().amount() > facts.sum_insured().amount() {
                format!(
                    " (claim of {} capped at the sum insured)",
                    facts.claim_amount().format_grouped()
                )
            } else {
                String::new()
            };
            format!(
                "Payable amount is {}: admissible loss of {}{} less the deductible of {}.",
                payable.format_grouped(),
                admissible.format_grouped(),
                capped,
                facts.deductible().format_grouped()
            )
        }
        (ClaimDecision::Approved, None) => "The payable amount was not computed.".to_string(),
        (ClaimDecision::UnderInvestigation, _) => {
            "No amount is payable until the investigation concludes.".to_string()
        }
        _ => "No amount is payable.".to_string(),
    }
}

fn previous_claims(count: u32) -> String {
    match count {
        1 => "1 previous claim".to_string(),
        n => format!("{n} previous claims"),
    }
}

fn humanize(token: &str) -> String {
    token.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::{Derivation, RejectionReason};
    use crate::facts::{LossType, PolicyType};
    use chrono::NaiveDate;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    fn facts(loss_type: LossType, fir: bool, claim: rust_decimal::Decimal) -> ClaimFacts {
        ClaimFacts::builder(Currency::INR)
            .policy_type(PolicyType::Comprehensive)
            .policy_period(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            )
            .loss_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .loss_type(loss_type)
            .claim_amount(claim)
            .sum_insured(dec!(300000))
            .deductible(dec!(10000))
            .fir_submitted(fir)
            .documents_complete(true)
            .previous_claims(1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_approved_paragraph() {
        let facts = facts(LossType::Accident, true, dec!(350000));
        let derived = DerivedFacts {
            claim_validity: ClaimValidity::Valid,
            coverage_status: CoverageStatus::Covered,
            fraud_risk: FraudRisk::Low,
            claim_decision: ClaimDecision::Approved,
            rejection_reason: None,
            payable_amount: Some(Money::new(dec!(290000), Currency::INR)),
        };

        let explanation = explain(&facts, &derived, &InferenceTrace::new());
        assert_eq!(
            explanation.paragraph,
            "Claim approved. \
             The loss on 15 Jun 2024 falls within the policy period 01 Jan 2024 to 01 Jan 2025. \
             The accident loss is covered under the comprehensive policy. \
             All mandatory documents were submitted. \
             Fraud risk is low (1 previous claim). \
             Payable amount is ₹290,000.00: admissible loss of ₹300,000.00 \
             (claim of ₹350,000.00 capped at the sum insured) less the deductible of ₹10,000.00."
        );
    }

    #[test]
    fn test_fir_rejection_paragraph() {
        let facts = facts(LossType::Theft, false, dec!(100000));
        let derived = DerivedFacts {
            claim_validity: ClaimValidity::Valid,
            coverage_status: CoverageStatus::Covered,
            fraud_risk: FraudRisk::Low,
            claim_decision: ClaimDecision::Rejected,
            rejection_reason: Some(RejectionReason::FirNotSubmitted),
            payable_amount: Some(Money::zero(Currency::INR)),
        };

        let paragraph = explain(&facts, &derived, &InferenceTrace::new()).paragraph;
        assert!(paragraph.starts_with(
            "Claim rejected because no FIR was submitted for a theft or fire loss."
        ));
        assert!(paragraph.contains("An FIR is required for a theft loss but was not submitted."));
        assert!(paragraph.ends_with("No amount is payable."));
    }

    #[test]
    fn test_render_trace() {
        let lines = vec![
            TraceLine {
                rule_id: "VAL-002".to_string(),
                phase: Phase::Validity,
                description: "Loss date within the policy period makes the claim valid".to_string(),
                iteration: 1,
                matched: true,
                fired: true,
                note: Derivation::Validity(ClaimValidity::Valid).to_string(),
            },
            TraceLine {
                rule_id: "COV-001".to_string(),
                phase: Phase::Coverage,
                description: "x".to_string(),
                iteration: 1,
                matched: false,
                fired: false,
                note: "condition not met: x".to_string(),
            },
        ];

        assert_eq!(
            render_trace(&lines),
            "[pass 1] VAL-002 (validity) fired: claim_validity = valid\n\
             [pass 1] COV-001 (coverage) no match: condition not met: x"
        );
    }

    #[test]
    fn test_previous_claims_pluralisation() {
        assert_eq!(previous_claims(0), "0 previous claims");
        assert_eq!(previous_claims(1), "1 previous claim");
        assert_eq!(previous_claims(4), "4 previous claims");
    }
}
