//! Claim facts
//!
//! Typed representation of a claim record as it enters the engine, and the
//! boundary that turns raw caller-supplied values into [`ClaimFacts`].
//! Everything that can be wrong with a record is caught here, so the
//! inference engine only ever sees well-formed facts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use core_kernel::{parse_calendar_date, Currency, Money, PolicyPeriod};

use crate::error::MalformedInputError;

/// Type of motor/property policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    /// Own damage plus third-party liability
    Comprehensive,
    /// Third-party liability only
    ThirdParty,
}

impl PolicyType {
    pub const EXPECTED: &'static str = "comprehensive, third_party";

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Comprehensive => "comprehensive",
            PolicyType::ThirdParty => "third_party",
        }
    }
}

impl FromStr for PolicyType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_token(s).as_str() {
            "comprehensive" => Ok(PolicyType::Comprehensive),
            "third_party" => Ok(PolicyType::ThirdParty),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of loss being claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Accident,
    Theft,
    Fire,
    OwnDamage,
    ThirdPartyDamage,
}

impl LossType {
    pub const EXPECTED: &'static str = "accident, theft, fire, own_damage, third_party_damage";

    pub fn as_str(&self) -> &'static str {
        match self {
            LossType::Accident => "accident",
            LossType::Theft => "theft",
            LossType::Fire => "fire",
            LossType::OwnDamage => "own_damage",
            LossType::ThirdPartyDamage => "third_party_damage",
        }
    }

    /// Losses that must be backed by a First Information Report
    pub fn requires_fir(&self) -> bool {
        matches!(self, LossType::Theft | LossType::Fire)
    }
}

impl FromStr for LossType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_token(s).as_str() {
            "accident" => Ok(LossType::Accident),
            "theft" => Ok(LossType::Theft),
            "fire" => Ok(LossType::Fire),
            "own_damage" => Ok(LossType::OwnDamage),
            "third_party_damage" => Ok(LossType::ThirdPartyDamage),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cases and maps `-`/space separators to `_`
fn normalise_token(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// The eleven input columns of a claim record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimField {
    PolicyType,
    PolicyStartDate,
    PolicyEndDate,
    LossDate,
    LossType,
    ClaimAmount,
    SumInsured,
    Deductible,
    FirSubmitted,
    DocumentsComplete,
    PreviousClaims,
}

impl ClaimField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimField::PolicyType => "policy_type",
            ClaimField::PolicyStartDate => "policy_start_date",
            ClaimField::PolicyEndDate => "policy_end_date",
            ClaimField::LossDate => "loss_date",
            ClaimField::LossType => "loss_type",
            ClaimField::ClaimAmount => "claim_amount",
            ClaimField::SumInsured => "sum_insured",
            ClaimField::Deductible => "deductible",
            ClaimField::FirSubmitted => "fir_submitted",
            ClaimField::DocumentsComplete => "documents_complete",
            ClaimField::PreviousClaims => "previous_claims",
        }
    }
}

impl fmt::Display for ClaimField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, immutable facts about one claim
///
/// Construct through [`ClaimFacts::builder`] or [`RawClaim::parse`]; both
/// enforce non-negative amounts, a single currency and a well-ordered policy
/// period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimFacts {
    policy_type: PolicyType,
    policy_period: PolicyPeriod,
    loss_date: NaiveDate,
    loss_type: LossType,
    claim_amount: Money,
    sum_insured: Money,
    deductible: Money,
    fir_submitted: bool,
    documents_complete: bool,
    previous_claims: u32,
}

impl ClaimFacts {
    /// Starts building a claim in the given currency
    pub fn builder(currency: Currency) -> ClaimFactsBuilder {
        ClaimFactsBuilder::new(currency)
    }

    pub fn policy_type(&self) -> PolicyType {
        self.policy_type
    }

    pub fn policy_period(&self) -> PolicyPeriod {
        self.policy_period
    }

    pub fn policy_start_date(&self) -> NaiveDate {
        self.policy_period.start
    }

    pub fn policy_end_date(&self) -> NaiveDate {
        self.policy_period.end
    }

    pub fn loss_date(&self) -> NaiveDate {
        self.loss_date
    }

    pub fn loss_type(&self) -> LossType {
        self.loss_type
    }

    pub fn claim_amount(&self) -> Money {
        self.claim_amount
    }

    pub fn sum_insured(&self) -> Money {
        self.sum_insured
    }

    pub fn deductible(&self) -> Money {
        self.deductible
    }

    pub fn fir_submitted(&self) -> bool {
        self.fir_submitted
    }

    pub fn documents_complete(&self) -> bool {
        self.documents_complete
    }

    pub fn previous_claims(&self) -> u32 {
        self.previous_claims
    }

    pub fn currency(&self) -> Currency {
        self.claim_amount.currency()
    }

    /// Returns true if the loss date lies within the policy period
    pub fn loss_in_period(&self) -> bool {
        self.policy_period.contains(self.loss_date)
    }

    /// Admissible loss: the claimed amount capped at the sum insured
    pub fn admissible_loss(&self) -> Money {
        let capped = self.claim_amount.amount().min(self.sum_insured.amount());
        Money::new(capped, self.currency())
    }

    /// Admissible loss less the deductible, floored at zero
    pub fn net_payable(&self) -> Money {
        let net = self.admissible_loss().amount() - self.deductible.amount();
        Money::new(net, self.currency()).clamp_non_negative()
    }
}

/// Builder for [`ClaimFacts`]
///
/// Every field is required; `build` reports the first missing or invalid
/// field as a [`MalformedInputError`].
#[derive(Debug, Clone)]
pub struct ClaimFactsBuilder {
    currency: Currency,
    policy_type: Option<PolicyType>,
    policy_start_date: Option<NaiveDate>,
    policy_end_date: Option<NaiveDate>,
    loss_date: Option<NaiveDate>,
    loss_type: Option<LossType>,
    claim_amount: Option<Decimal>,
    sum_insured: Option<Decimal>,
    deductible: Option<Decimal>,
    fir_submitted: Option<bool>,
    documents_complete: Option<bool>,
    previous_claims: Option<u32>,
}

impl ClaimFactsBuilder {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            policy_type: None,
            policy_start_date: None,
            policy_end_date: None,
            loss_date: None,
            loss_type: None,
            claim_amount: None,
            sum_insured: None,
            deductible: None,
            fir_submitted: None,
            documents_complete: None,
            previous_claims: None,
        }
    }

    pub fn policy_type(mut self, policy_type: PolicyType) -> Self {
        self.policy_type = Some(policy_type);
        self
    }

    pub fn policy_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.policy_start_date = Some(start);
        self.policy_end_date = Some(end);
        self
    }

    pub fn loss_date(mut self, date: NaiveDate) -> Self {
        self.loss_date = Some(date);
        self
    }

    pub fn loss_type(mut self, loss_type: LossType) -> Self {
        self.loss_type = Some(loss_type);
        self
    }

    pub fn claim_amount(mut self, amount: Decimal) -> Self {
        self.claim_amount = Some(amount);
        self
    }

    pub fn sum_insured(mut self, amount: Decimal) -> Self {
        self.sum_insured = Some(amount);
        self
    }

    pub fn deductible(mut self, amount: Decimal) -> Self {
        self.deductible = Some(amount);
        self
    }

    pub fn fir_submitted(mut self, submitted: bool) -> Self {
        self.fir_submitted = Some(submitted);
        self
    }

    pub fn documents_complete(mut self, complete: bool) -> Self {
        self.documents_complete = Some(complete);
        self
    }

    pub fn previous_claims(mut self, count: u32) -> Self {
        self.previous_claims = Some(count);
        self
    }

    /// Validates and builds the claim facts
    pub fn build(self) -> Result<ClaimFacts, MalformedInputError> {
        let start = required(self.policy_start_date, ClaimField::PolicyStartDate)?;
        let end = required(self.policy_end_date, ClaimField::PolicyEndDate)?;
        let policy_period = PolicyPeriod::new(start, end)
            .map_err(|_| MalformedInputError::PolicyPeriodReversed { start, end })?;

        Ok(ClaimFacts {
            policy_type: required(self.policy_type, ClaimField::PolicyType)?,
            policy_period,
            loss_date: required(self.loss_date, ClaimField::LossDate)?,
            loss_type: required(self.loss_type, ClaimField::LossType)?,
            claim_amount: money(self.claim_amount, ClaimField::ClaimAmount, self.currency)?,
            sum_insured: money(self.sum_insured, ClaimField::SumInsured, self.currency)?,
            deductible: money(self.deductible, ClaimField::Deductible, self.currency)?,
            fir_submitted: required(self.fir_submitted, ClaimField::FirSubmitted)?,
            documents_complete: required(self.documents_complete, ClaimField::DocumentsComplete)?,
            previous_claims: required(self.previous_claims, ClaimField::PreviousClaims)?,
        })
    }
}

fn required<T>(value: Option<T>, field: ClaimField) -> Result<T, MalformedInputError> {
    value.ok_or(MalformedInputError::Missing { field })
}

fn money(
    amount: Option<Decimal>,
    field: ClaimField,
    currency: Currency,
) -> Result<Money, MalformedInputError> {
    let amount = required(amount, field)?;
    Money::non_negative(amount, currency).map_err(|_| MalformedInputError::Negative {
        field,
        value: amount.to_string(),
    })
}

/// A single raw column value
///
/// Accepts a JSON string, number or boolean and keeps its textual form;
/// interpretation happens in [`RawClaim::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawField(String);

impl RawField {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RawField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(RawField(s)),
            // Numbers keep the text they were written with, so amounts
            // never pass through a float.
            Value::Number(n) => Ok(RawField(n.to_string())),
            Value::Bool(b) => Ok(RawField(b.to_string())),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a string, number or boolean",
            )),
        }
    }
}

fn unexpected(value: &Value) -> Unexpected<'static> {
    match value {
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
        _ => Unexpected::Unit,
    }
}

/// An unvalidated claim record as supplied by the caller (form or CSV row)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClaim {
    #[serde(default)]
    pub policy_type: Option<RawField>,
    #[serde(default)]
    pub policy_start_date: Option<RawField>,
    #[serde(default)]
    pub policy_end_date: Option<RawField>,
    #[serde(default)]
    pub loss_date: Option<RawField>,
    #[serde(default)]
    pub loss_type: Option<RawField>,
    #[serde(default)]
    pub claim_amount: Option<RawField>,
    #[serde(default)]
    pub sum_insured: Option<RawField>,
    #[serde(default)]
    pub deductible: Option<RawField>,
    #[serde(default)]
    pub fir_submitted: Option<RawField>,
    #[serde(default)]
    pub documents_complete: Option<RawField>,
    #[serde(default)]
    pub previous_claims: Option<RawField>,
}

impl RawClaim {
    /// Parses and validates the record into [`ClaimFacts`]
    ///
    /// Pure and total: the first offending field is reported and nothing
    /// outside the record is touched.
    pub fn parse(&self, currency: Currency) -> Result<ClaimFacts, MalformedInputError> {
        let policy_type = self.enumerated(
            &self.policy_type,
            ClaimField::PolicyType,
            PolicyType::EXPECTED,
        )?;
        let start = self.date(&self.policy_start_date, ClaimField::PolicyStartDate)?;
        let end = self.date(&self.policy_end_date, ClaimField::PolicyEndDate)?;
        let loss_date = self.date(&self.loss_date, ClaimField::LossDate)?;
        let loss_type = self.enumerated(&self.loss_type, ClaimField::LossType, LossType::EXPECTED)?;

        ClaimFacts::builder(currency)
            .policy_type(policy_type)
            .policy_period(start, end)
            .loss_date(loss_date)
            .loss_type(loss_type)
            .claim_amount(self.amount(&self.claim_amount, ClaimField::ClaimAmount)?)
            .sum_insured(self.amount(&self.sum_insured, ClaimField::SumInsured)?)
            .deductible(self.amount(&self.deductible, ClaimField::Deductible)?)
            .fir_submitted(self.flag(&self.fir_submitted, ClaimField::FirSubmitted)?)
            .documents_complete(self.flag(&self.documents_complete, ClaimField::DocumentsComplete)?)
            .previous_claims(self.count(&self.previous_claims, ClaimField::PreviousClaims)?)
            .build()
    }

    fn text<'a>(
        &self,
        value: &'a Option<RawField>,
        field: ClaimField,
    ) -> Result<&'a str, MalformedInputError> {
        match value {
            Some(raw) if !raw.as_str().trim().is_empty() => Ok(raw.as_str().trim()),
            _ => Err(MalformedInputError::Missing { field }),
        }
    }

    fn enumerated<T: FromStr>(
        &self,
        value: &Option<RawField>,
        field: ClaimField,
        expected: &'static str,
    ) -> Result<T, MalformedInputError> {
        let text = self.text(value, field)?;
        text.parse().map_err(|_| MalformedInputError::UnknownVariant {
            field,
            value: text.to_string(),
            expected,
        })
    }

    fn date(
        &self,
        value: &Option<RawField>,
        field: ClaimField,
    ) -> Result<NaiveDate, MalformedInputError> {
        let text = self.text(value, field)?;
        parse_calendar_date(text).map_err(|_| MalformedInputError::InvalidDate {
            field,
            value: text.to_string(),
        })
    }

    fn flag(&self, value: &Option<RawField>, field: ClaimField) -> Result<bool, MalformedInputError> {
        let text = self.text(value, field)?;
        parse_flag(text).ok_or_else(|| MalformedInputError::InvalidBoolean {
            field,
            value: text.to_string(),
        })
    }

    fn amount(
        &self,
        value: &Option<RawField>,
        field: ClaimField,
    ) -> Result<Decimal, MalformedInputError> {
        let text = self.text(value, field)?;
        let amount = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| MalformedInputError::NotNumeric {
                field,
                value: text.to_string(),
            })?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MalformedInputError::Negative {
                field,
                value: text.to_string(),
            });
        }
        Ok(amount)
    }

    fn count(&self, value: &Option<RawField>, field: ClaimField) -> Result<u32, MalformedInputError> {
        let text = self.text(value, field)?;
        let amount = self.amount(value, field)?;
        if !amount.fract().is_zero() {
            return Err(MalformedInputError::NotWholeNumber {
                field,
                value: text.to_string(),
            });
        }
        amount.to_u32().ok_or_else(|| MalformedInputError::NotWholeNumber {
            field,
            value: text.to_string(),
        })
    }
}

/// Accepted spellings: yes/no, true/false, 1/0, y/n (case-insensitive)
fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "y" => Some(true),
        "no" | "false" | "0" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record() -> RawClaim {
        RawClaim {
            policy_type: Some("comprehensive".into()),
            policy_start_date: Some("2024-01-01".into()),
            policy_end_date: Some("2025-01-01".into()),
            loss_date: Some("2024-06-15".into()),
            loss_type: Some("accident".into()),
            claim_amount: Some("150000".into()),
            sum_insured: Some("500000".into()),
            deductible: Some("5000".into()),
            fir_submitted: Some("yes".into()),
            documents_complete: Some("yes".into()),
            previous_claims: Some("1".into()),
        }
    }

    #[test]
    fn test_parse_complete_record() {
        let facts = record().parse(Currency::INR).unwrap();
        assert_eq!(facts.policy_type(), PolicyType::Comprehensive);
        assert_eq!(facts.loss_type(), LossType::Accident);
        assert_eq!(facts.claim_amount().amount(), dec!(150000));
        assert!(facts.fir_submitted());
        assert_eq!(facts.previous_claims(), 1);
        assert!(facts.loss_in_period());
    }

    #[test]
    fn test_normalise_token_variants() {
        assert_eq!("Third-Party".parse::<PolicyType>(), Ok(PolicyType::ThirdParty));
        assert_eq!(" OWN DAMAGE ".parse::<LossType>(), Ok(LossType::OwnDamage));
    }

    #[test]
    fn test_parse_flag_spellings() {
        for yes in ["yes", "YES", "true", "1", "y", "Y"] {
            assert_eq!(parse_flag(yes), Some(true), "{yes}");
        }
        for no in ["no", "False", "0", "n"] {
            assert_eq!(parse_flag(no), Some(false), "{no}");
        }
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_previous_claims_accepts_float_form() {
        let mut raw = record();
        raw.previous_claims = Some("2.0".into());
        assert_eq!(raw.parse(Currency::INR).unwrap().previous_claims(), 2);
    }

    #[test]
    fn test_net_payable_caps_and_floors() {
        let mut raw = record();
        raw.claim_amount = Some("350000".into());
        raw.sum_insured = Some("300000".into());
        raw.deductible = Some("10000".into());
        let facts = raw.parse(Currency::INR).unwrap();
        assert_eq!(facts.admissible_loss().amount(), dec!(300000));
        assert_eq!(facts.net_payable().amount(), dec!(290000));

        let mut small = record();
        small.claim_amount = Some("1000".into());
        let facts = small.parse(Currency::INR).unwrap();
        assert!(facts.net_payable().is_zero());
    }

    #[test]
    fn test_lenient_json_values() {
        let json = r#"{
            "policy_type": "comprehensive",
            "policy_start_date": "01/01/2024",
            "policy_end_date": "01-01-2025",
            "loss_date": "2024-06-15",
            "loss_type": "theft",
            "claim_amount": 150000.5,
            "sum_insured": 500000,
            "deductible": 0,
            "fir_submitted": true,
            "documents_complete": 1,
            "previous_claims": 0
        }"#;
        let raw: RawClaim = serde_json::from_str(json).unwrap();
        let facts = raw.parse(Currency::INR).unwrap();
        assert_eq!(facts.claim_amount().amount(), dec!(150000.5));
        assert!(facts.fir_submitted());
        assert!(facts.documents_complete());
    }

    #[test]
    fn test_json_numbers_keep_their_precision() {
        let mut value = serde_json::to_value(record()).unwrap();
        value["claim_amount"] = serde_json::from_str("1e25").unwrap();
        value["sum_insured"] = serde_json::from_str("123456789012345678.0123").unwrap();
        value["deductible"] = serde_json::from_str("0.1").unwrap();

        let raw: RawClaim = serde_json::from_str(&value.to_string()).unwrap();
        let facts = raw.parse(Currency::INR).unwrap();
        assert_eq!(
            facts.claim_amount().amount(),
            dec!(10000000000000000000000000)
        );
        assert_eq!(facts.sum_insured().amount(), dec!(123456789012345678.0123));
        assert_eq!(facts.deductible().amount(), dec!(0.1));
    }

    #[test]
    fn test_nested_json_value_is_rejected() {
        let mut value = serde_json::to_value(record()).unwrap();
        value["claim_amount"] = serde_json::json!([150000]);
        assert!(serde_json::from_str::<RawClaim>(&value.to_string()).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn whole_previous_claims_parse(count in 0u32..100_000) {
                let mut raw = record();
                raw.previous_claims = Some(count.to_string().into());
                prop_assert_eq!(raw.parse(Currency::INR).unwrap().previous_claims(), count);
            }

            #[test]
            fn negative_amounts_name_their_field(paise in 1i64..1_000_000_000) {
                let mut raw = record();
                raw.deductible = Some(Decimal::new(-paise, 2).to_string().into());
                let err = raw.parse(Currency::INR).unwrap_err();
                prop_assert_eq!(err.field(), ClaimField::Deductible);
                let is_negative = matches!(err, MalformedInputError::Negative { .. });
                prop_assert!(is_negative);
            }
        }
    }
}
