//! Test Data Builders
//!
//! Provides builder patterns for constructing claim records with sensible
//! defaults. Tests specify only the relevant fields; everything else is the
//! approvable reference claim.

use chrono::NaiveDate;
use core_kernel::Currency;
use domain_claims::{ClaimFacts, RawClaim, RawField};
use rust_decimal::Decimal;
use serde_json::{json, Number, Value};

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// Builder for constructing test claim records
#[derive(Debug, Clone)]
pub struct TestClaimBuilder {
    policy_type: String,
    policy_start_date: NaiveDate,
    policy_end_date: NaiveDate,
    loss_date: NaiveDate,
    loss_type: String,
    claim_amount: Decimal,
    sum_insured: Decimal,
    deductible: Decimal,
    fir_submitted: bool,
    documents_complete: bool,
    previous_claims: u32,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            policy_type: "comprehensive".to_string(),
            policy_start_date: TemporalFixtures::policy_start(),
            policy_end_date: TemporalFixtures::policy_end(),
            loss_date: TemporalFixtures::loss_in_period(),
            loss_type: "accident".to_string(),
            claim_amount: MoneyFixtures::inr_claim().amount(),
            sum_insured: MoneyFixtures::inr_sum_insured().amount(),
            deductible: MoneyFixtures::inr_deductible().amount(),
            fir_submitted: true,
            documents_complete: true,
            previous_claims: 1,
        }
    }

    /// Sets the policy type token
    pub fn with_policy_type(mut self, policy_type: impl Into<String>) -> Self {
        self.policy_type = policy_type.into();
        self
    }

    /// Sets the policy period
    pub fn with_policy_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.policy_start_date = start;
        self.policy_end_date = end;
        self
    }

    /// Sets the loss date
    pub fn with_loss_date(mut self, date: NaiveDate) -> Self {
        self.loss_date = date;
        self
    }

    /// Sets the loss type token
    pub fn with_loss_type(mut self, loss_type: impl Into<String>) -> Self {
        self.loss_type = loss_type.into();
        self
    }

    /// Sets the claimed amount
    pub fn with_claim_amount(mut self, amount: Decimal) -> Self {
        self.claim_amount = amount;
        self
    }

    /// Sets the sum insured
    pub fn with_sum_insured(mut self, amount: Decimal) -> Self {
        self.sum_insured = amount;
        self
    }

    /// Sets the deductible
    pub fn with_deductible(mut self, amount: Decimal) -> Self {
        self.deductible = amount;
        self
    }

    /// Sets whether an FIR was submitted
    pub fn with_fir_submitted(mut self, submitted: bool) -> Self {
        self.fir_submitted = submitted;
        self
    }

    /// Sets whether the mandatory documents are complete
    pub fn with_documents_complete(mut self, complete: bool) -> Self {
        self.documents_complete = complete;
        self
    }

    /// Sets the previous claim count
    pub fn with_previous_claims(mut self, count: u32) -> Self {
        self.previous_claims = count;
        self
    }

    /// Builds the raw record as a form would submit it
    pub fn build_raw(&self) -> RawClaim {
        RawClaim {
            policy_type: Some(RawField::new(self.policy_type.as_str())),
            policy_start_date: Some(date_field(self.policy_start_date)),
            policy_end_date: Some(date_field(self.policy_end_date)),
            loss_date: Some(date_field(self.loss_date)),
            loss_type: Some(RawField::new(self.loss_type.as_str())),
            claim_amount: Some(RawField::new(self.claim_amount.to_string())),
            sum_insured: Some(RawField::new(self.sum_insured.to_string())),
            deductible: Some(RawField::new(self.deductible.to_string())),
            fir_submitted: Some(flag_field(self.fir_submitted)),
            documents_complete: Some(flag_field(self.documents_complete)),
            previous_claims: Some(RawField::new(self.previous_claims.to_string())),
        }
    }

    /// Builds validated facts in INR
    ///
    /// # Panics
    ///
    /// Panics if the builder holds values the fact model rejects
    pub fn build_facts(&self) -> ClaimFacts {
        self.build_raw()
            .parse(Currency::INR)
            .expect("test claim should be well formed")
    }

    /// Builds the JSON body accepted by the HTTP API, with native JSON
    /// numbers and booleans
    pub fn build_json(&self) -> Value {
        json!({
            "policy_type": self.policy_type,
            "policy_start_date": self.policy_start_date.format("%Y-%m-%d").to_string(),
            "policy_end_date": self.policy_end_date.format("%Y-%m-%d").to_string(),
            "loss_date": self.loss_date.format("%Y-%m-%d").to_string(),
            "loss_type": self.loss_type,
            "claim_amount": json_number(self.claim_amount),
            "sum_insured": json_number(self.sum_insured),
            "deductible": json_number(self.deductible),
            "fir_submitted": self.fir_submitted,
            "documents_complete": self.documents_complete,
            "previous_claims": self.previous_claims,
        })
    }
}

fn json_number(amount: Decimal) -> Value {
    let number: Number = amount
        .to_string()
        .parse()
        .expect("a decimal renders as a JSON number");
    Value::Number(number)
}

fn date_field(date: NaiveDate) -> RawField {
    RawField::new(date.format("%Y-%m-%d").to_string())
}

fn flag_field(flag: bool) -> RawField {
    RawField::new(if flag { "yes" } else { "no" })
}
