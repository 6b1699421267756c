//! Unit tests for the Money module
//!
//! Tests cover money creation, checked arithmetic, payout helpers
//! and presentation.

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::INR);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::INR);
        assert!(m.is_zero());
        assert!(!m.is_negative());
        assert!(!m.is_positive());
    }

    #[test]
    fn test_non_negative_accepts_zero_and_positive() {
        assert_eq!(
            Money::non_negative(dec!(5000), Currency::INR).unwrap().amount(),
            dec!(5000)
        );
        assert!(Money::non_negative(dec!(0), Currency::INR).unwrap().is_zero());
    }

    #[test]
    fn test_non_negative_rejects_negative() {
        let result = Money::non_negative(dec!(-1), Currency::INR);
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_default_currency_is_inr() {
        assert_eq!(Currency::default(), Currency::INR);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_sub_same_currency() {
        let a = Money::new(dec!(300000), Currency::INR);
        let b = Money::new(dec!(10000), Currency::INR);
        assert_eq!(a.checked_sub(&b).unwrap().amount(), dec!(290000));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let a = Money::new(dec!(1), Currency::INR);
        let b = Money::new(dec!(1), Currency::EUR);
        assert_eq!(
            a.checked_add(&b),
            Err(MoneyError::CurrencyMismatch("INR".to_string(), "EUR".to_string()))
        );
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let big = Money::new(dec!(50000000000000000000000000000), Currency::INR);
        assert_eq!(big.checked_add(&big), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_checked_sub_reports_overflow() {
        let big = Money::new(dec!(50000000000000000000000000000), Currency::INR);
        let negative_big = Money::new(dec!(-50000000000000000000000000000), Currency::INR);
        assert_eq!(negative_big.checked_sub(&big), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_clamp_non_negative_floors_at_zero() {
        let deficit = Money::new(dec!(-2500), Currency::INR);
        assert!(deficit.clamp_non_negative().is_zero());

        let surplus = Money::new(dec!(2500), Currency::INR);
        assert_eq!(surplus.clamp_non_negative(), surplus);
    }
}

mod presentation {
    use super::*;

    #[test]
    fn test_display_uses_symbol_and_minor_units() {
        let m = Money::new(dec!(145000), Currency::INR);
        assert_eq!(m.to_string(), "₹ 145000.00");
    }

    #[test]
    fn test_format_grouped_large_amount() {
        let m = Money::new(dec!(12345678.9), Currency::USD);
        assert_eq!(m.format_grouped(), "$12,345,678.90");
    }

    #[test]
    fn test_format_grouped_negative_amount() {
        let m = Money::new(dec!(-1500), Currency::INR);
        assert_eq!(m.format_grouped(), "-₹1,500.00");
    }

    #[test]
    fn test_round_to_currency_fixes_scale() {
        let inr = Money::new(dec!(145000), Currency::INR).round_to_currency();
        assert_eq!(inr.amount().to_string(), "145000.00");

        let jpy = Money::new(dec!(1234.56), Currency::JPY).round_to_currency();
        assert_eq!(jpy.amount().to_string(), "1235");
    }

    #[test]
    fn test_serde_round_trip_keeps_currency_code() {
        let m = Money::new(dec!(290000), Currency::INR);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"INR\""));
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
