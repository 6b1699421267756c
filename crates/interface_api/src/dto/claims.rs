//! Claims DTOs

use core_kernel::Currency;
use domain_claims::{
    render_trace, BatchOutcome, BatchReport, BatchSummary, ClaimDecision, ClaimError,
    ClaimValidity, CoverageStatus, EvaluationResult, FraudRisk, RawClaim, RejectionReason,
    RuleConflictEvent, TraceLine,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ErrorResponse;

#[derive(Debug, Deserialize)]
pub struct BatchEvaluationRequest {
    pub claims: Vec<RawClaim>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub claim_validity: ClaimValidity,
    pub coverage_status: CoverageStatus,
    pub claim_decision: ClaimDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    pub payable_amount: Decimal,
    pub currency: Currency,
    pub fraud_risk: FraudRisk,
    pub explanation_text: String,
    pub trace: Vec<TraceLine>,
    pub trace_text: String,
    pub conflicts: Vec<RuleConflictEvent>,
    pub passes: u32,
}

impl From<EvaluationResult> for EvaluationResponse {
    fn from(result: EvaluationResult) -> Self {
        Self {
            claim_validity: result.claim_validity,
            coverage_status: result.coverage_status,
            claim_decision: result.claim_decision,
            rejection_reason: result.rejection_reason,
            payable_amount: result.payable_amount.round_to_currency().amount(),
            currency: result.payable_amount.currency(),
            fraud_risk: result.fraud_risk,
            explanation_text: result.explanation_text,
            trace_text: render_trace(&result.trace),
            trace: result.trace,
            conflicts: result.conflicts,
            passes: result.passes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    Evaluated,
    Malformed,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct BatchItemResponse {
    pub index: usize,
    pub status: BatchItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl From<BatchOutcome> for BatchItemResponse {
    fn from(outcome: BatchOutcome) -> Self {
        match outcome.result {
            Ok(result) => Self {
                index: outcome.index,
                status: BatchItemStatus::Evaluated,
                result: Some(result.into()),
                error: None,
            },
            Err(err) => Self {
                index: outcome.index,
                status: match err {
                    ClaimError::MalformedInput(_) => BatchItemStatus::Malformed,
                    ClaimError::NonConvergence(_) => BatchItemStatus::Failed,
                },
                result: None,
                error: Some(ErrorResponse::from_claim_error(&err)),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSummaryResponse {
    pub total: usize,
    pub evaluated: usize,
    pub approved: usize,
    pub rejected: usize,
    pub under_investigation: usize,
    pub malformed: usize,
    pub failed: usize,
    pub total_payout: Decimal,
    pub currency: Currency,
    pub payouts_excluded: usize,
}

impl From<BatchSummary> for BatchSummaryResponse {
    fn from(summary: BatchSummary) -> Self {
        Self {
            total: summary.total,
            evaluated: summary.evaluated,
            approved: summary.approved,
            rejected: summary.rejected,
            under_investigation: summary.under_investigation,
            malformed: summary.malformed,
            failed: summary.failed,
            total_payout: summary.total_payout.round_to_currency().amount(),
            currency: summary.total_payout.currency(),
            payouts_excluded: summary.payouts_excluded,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchEvaluationResponse {
    pub results: Vec<BatchItemResponse>,
    pub summary: BatchSummaryResponse,
}

impl From<BatchReport> for BatchEvaluationResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            results: report.outcomes.into_iter().map(Into::into).collect(),
            summary: report.summary.into(),
        }
    }
}
