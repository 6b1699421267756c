//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! Claim amounts, sums insured, deductibles and payouts all flow through
//! [`Money`] so that payout arithmetic never mixes currencies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    INR,
    USD,
    EUR,
    GBP,
    JPY,
    SGD,
    AUD,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "₹",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::SGD => "S$",
            Currency::AUD => "A$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::SGD => "SGD",
            Currency::AUD => "AUD",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::INR
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally; presentation
/// rounds to the currency's minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates a non-negative Money value, rejecting amounts below zero
    pub fn non_negative(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::InvalidAmount(format!(
                "{} is negative",
                amount
            )));
        }
        Ok(Self::new(amount, currency))
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Rounds to the currency's standard decimal places, fixing the scale
    /// so `145000` becomes `145000.00`
    pub fn round_to_currency(&self) -> Self {
        let dp = self.currency.decimal_places();
        let mut amount = self.amount.round_dp(dp);
        amount.rescale(dp);
        Self {
            amount,
            currency: self.currency,
        }
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }

    /// Checked addition that returns an error on currency mismatch or overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch or overflow
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Floors the amount at zero
    pub fn clamp_non_negative(&self) -> Self {
        if self.is_negative() {
            Self::zero(self.currency)
        } else {
            *self
        }
    }

    /// Formats the amount with the currency symbol and thousands separators,
    /// e.g. `₹145,000.00`
    pub fn format_grouped(&self) -> String {
        let dp = self.currency.decimal_places() as usize;
        let rounded = self.round_to_currency().amount;
        let text = format!("{:.dp$}", rounded.abs(), dp = dp);
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (text.as_str(), None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        match fraction {
            Some(f) => format!("{}{}{}.{}", sign, self.currency.symbol(), grouped, f),
            None => format!("{}{}{}", sign, self.currency.symbol(), grouped),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50), Currency::INR);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::INR);
    }

    #[test]
    fn test_non_negative_rejects_negative_amount() {
        assert!(Money::non_negative(dec!(-0.01), Currency::INR).is_err());
        assert!(Money::non_negative(dec!(0), Currency::INR).is_ok());
    }

    #[test]
    fn test_currency_mismatch() {
        let inr = Money::new(dec!(100.00), Currency::INR);
        let usd = Money::new(dec!(100.00), Currency::USD);

        let result = inr.checked_sub(&usd);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(Money::new(dec!(145000), Currency::INR).format_grouped(), "₹145,000.00");
        assert_eq!(Money::new(dec!(999.5), Currency::INR).format_grouped(), "₹999.50");
        assert_eq!(Money::new(dec!(1234567), Currency::JPY).format_grouped(), "¥1,234,567");
        assert_eq!(Money::zero(Currency::INR).format_grouped(), "₹0.00");
    }
}
