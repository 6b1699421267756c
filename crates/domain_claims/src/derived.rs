//! Derived facts
//!
//! Conclusions produced by rule firing. Every field starts unknown/unset and
//! grows monotonically during a session; nothing is ever retracted.

use std::fmt;

use serde::{Deserialize, Serialize};

use core_kernel::Money;

/// Whether the loss falls inside the policy period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimValidity {
    #[default]
    Unknown,
    Valid,
    Invalid,
}

/// Whether the policy covers this type of loss
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    #[default]
    Unknown,
    Covered,
    NotCovered,
}

/// Fraud-risk tier from the claimant's claim history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudRisk {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
}

/// Outcome of the claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimDecision {
    #[default]
    Unknown,
    Approved,
    Rejected,
    UnderInvestigation,
}

/// Why a claim was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    FirNotSubmitted,
    IncompleteDocumentation,
    OutsidePolicyPeriod,
    LossNotCovered,
    ApprovalCriteriaNotMet,
}

impl ClaimValidity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimValidity::Unknown => "unknown",
            ClaimValidity::Valid => "valid",
            ClaimValidity::Invalid => "invalid",
        }
    }
}

impl CoverageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageStatus::Unknown => "unknown",
            CoverageStatus::Covered => "covered",
            CoverageStatus::NotCovered => "not_covered",
        }
    }
}

impl FraudRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudRisk::Unknown => "unknown",
            FraudRisk::Low => "low",
            FraudRisk::Medium => "medium",
            FraudRisk::High => "high",
        }
    }
}

impl ClaimDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimDecision::Unknown => "unknown",
            ClaimDecision::Approved => "approved",
            ClaimDecision::Rejected => "rejected",
            ClaimDecision::UnderInvestigation => "under_investigation",
        }
    }
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::FirNotSubmitted => "fir_not_submitted",
            RejectionReason::IncompleteDocumentation => "incomplete_documentation",
            RejectionReason::OutsidePolicyPeriod => "outside_policy_period",
            RejectionReason::LossNotCovered => "loss_not_covered",
            RejectionReason::ApprovalCriteriaNotMet => "approval_criteria_not_met",
        }
    }

    /// Clause used in explanations ("rejected because ...")
    pub fn describe(&self) -> &'static str {
        match self {
            RejectionReason::FirNotSubmitted => {
                "no FIR was submitted for a theft or fire loss"
            }
            RejectionReason::IncompleteDocumentation => "the documentation is incomplete",
            RejectionReason::OutsidePolicyPeriod => "the loss occurred outside the policy period",
            RejectionReason::LossNotCovered => "the loss type is not covered under the policy",
            RejectionReason::ApprovalCriteriaNotMet => "it does not meet the approval criteria",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ClaimValidity, CoverageStatus, FraudRisk, ClaimDecision, RejectionReason);

/// Names of the derived fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedField {
    ClaimValidity,
    CoverageStatus,
    FraudRisk,
    ClaimDecision,
    RejectionReason,
    PayableAmount,
}

impl DerivedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedField::ClaimValidity => "claim_validity",
            DerivedField::CoverageStatus => "coverage_status",
            DerivedField::FraudRisk => "fraud_risk",
            DerivedField::ClaimDecision => "claim_decision",
            DerivedField::RejectionReason => "rejection_reason",
            DerivedField::PayableAmount => "payable_amount",
        }
    }
}

display_as_str!(DerivedField);

/// A value for one derived field, as written by a rule action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value")]
pub enum Derivation {
    #[serde(rename = "claim_validity")]
    Validity(ClaimValidity),
    #[serde(rename = "coverage_status")]
    Coverage(CoverageStatus),
    #[serde(rename = "fraud_risk")]
    Fraud(FraudRisk),
    #[serde(rename = "claim_decision")]
    Decision(ClaimDecision),
    #[serde(rename = "rejection_reason")]
    Rejection(RejectionReason),
    #[serde(rename = "payable_amount")]
    Payable(Money),
}

impl Derivation {
    /// The field this value belongs to
    pub fn field(&self) -> DerivedField {
        match self {
            Derivation::Validity(_) => DerivedField::ClaimValidity,
            Derivation::Coverage(_) => DerivedField::CoverageStatus,
            Derivation::Fraud(_) => DerivedField::FraudRisk,
            Derivation::Decision(_) => DerivedField::ClaimDecision,
            Derivation::Rejection(_) => DerivedField::RejectionReason,
            Derivation::Payable(_) => DerivedField::PayableAmount,
        }
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Derivation::Validity(v) => write!(f, "{} = {}", self.field(), v),
            Derivation::Coverage(v) => write!(f, "{} = {}", self.field(), v),
            Derivation::Fraud(v) => write!(f, "{} = {}", self.field(), v),
            Derivation::Decision(v) => write!(f, "{} = {}", self.field(), v),
            Derivation::Rejection(v) => write!(f, "{} = {}", self.field(), v),
            Derivation::Payable(v) => write!(f, "{} = {}", self.field(), v),
        }
    }
}

/// Conclusions accumulated during one inference session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFacts {
    pub claim_validity: ClaimValidity,
    pub coverage_status: CoverageStatus,
    pub fraud_risk: FraudRisk,
    pub claim_decision: ClaimDecision,
    pub rejection_reason: Option<RejectionReason>,
    pub payable_amount: Option<Money>,
}

impl DerivedFacts {
    /// Current value of a field, or `None` while it is still unknown/unset
    pub fn get(&self, field: DerivedField) -> Option<Derivation> {
        match field {
            DerivedField::ClaimValidity => match self.claim_validity {
                ClaimValidity::Unknown => None,
                v => Some(Derivation::Validity(v)),
            },
            DerivedField::CoverageStatus => match self.coverage_status {
                CoverageStatus::Unknown => None,
                v => Some(Derivation::Coverage(v)),
            },
            DerivedField::FraudRisk => match self.fraud_risk {
                FraudRisk::Unknown => None,
                v => Some(Derivation::Fraud(v)),
            },
            DerivedField::ClaimDecision => match self.claim_decision {
                ClaimDecision::Unknown => None,
                v => Some(Derivation::Decision(v)),
            },
            DerivedField::RejectionReason => self.rejection_reason.map(Derivation::Rejection),
            DerivedField::PayableAmount => self.payable_amount.map(Derivation::Payable),
        }
    }

    /// Writes a value unconditionally; callers enforce write-once semantics
    pub(crate) fn assign(&mut self, value: Derivation) {
        match value {
            Derivation::Validity(v) => self.claim_validity = v,
            Derivation::Coverage(v) => self.coverage_status = v,
            Derivation::Fraud(v) => self.fraud_risk = v,
            Derivation::Decision(v) => self.claim_decision = v,
            Derivation::Rejection(v) => self.rejection_reason = Some(v),
            Derivation::Payable(v) => self.payable_amount = Some(v),
        }
    }
}
