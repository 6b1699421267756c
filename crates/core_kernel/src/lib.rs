//! Core Kernel - Foundational types for the claim evaluator
//!
//! This crate provides the value objects shared by the rule engine and its shells:
//! - Money types with precise decimal arithmetic
//! - Policy periods and calendar-date parsing for claim records

pub mod money;
pub mod temporal;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{PolicyPeriod, TemporalError, parse_calendar_date, ACCEPTED_DATE_FORMATS};
