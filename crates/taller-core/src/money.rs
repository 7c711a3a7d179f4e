//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing purchase totals as floats:                                    │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A provider ranking built from thousands of float additions drifts     │
//! │  by cents, and the chart and the spreadsheet disagree.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "150.00" ──rust_decimal──► 15000 cents ──i64 sums──► exact totals   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use taller_core::money::Money;
//!
//! // Create from cents (preferred)
//! let total = Money::from_cents(15000); // $150.00
//!
//! // Parse what the API sends
//! let parsed: Money = "49.99".parse().unwrap();
//! assert_eq!((total + parsed).cents(), 19999);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for credit notes and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support; serializes as a plain cent count
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Transaction.total ──► Aggregator (header metric) ──► Ranking          │
/// │                                                          │              │
/// │                          ┌───────────────────────────────┤              │
/// │                          ▼                               ▼              │
/// │                  Chart values (f64)           Export rows ("$150.00")   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use taller_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an exact decimal amount to Money.
    ///
    /// Amounts with more than two decimal places are rounded half-to-even
    /// (`0.125 → 0.12`, `0.135 → 0.14`). Returns `None` if the value does not
    /// fit in an `i64` cent count.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use taller_core::money::Money;
    ///
    /// let amount = Decimal::new(15050, 2); // 150.50
    /// assert_eq!(Money::from_decimal(amount).unwrap().cents(), 15050);
    /// ```
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        rounded.checked_mul(Decimal::from(100))?.to_i64().map(Money)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use taller_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// assert_eq!(Money::from_cents(-550).dollars(), -5);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use taller_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Adds two amounts, returning `None` on `i64` overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, clamping at the `i64` bounds.
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Renders the amount with two decimals and no currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use taller_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(15000).to_decimal_string(), "150.00");
    /// assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }

    /// Renders the amount prefixed with a currency symbol (`$150.00`).
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.dollars().abs(),
            self.cents_part()
        )
    }

    /// Returns the amount in major units as a float.
    ///
    /// Only for chart values. Never accumulate with the result.
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$10.99` / `-$5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("$"))
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses a decimal amount as sent by the API: `"150"`, `"150.5"`,
/// `"$1,250.00"`. Surrounding whitespace, one leading `$`, and thousands
/// separators are ignored.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits: String = unsigned
            .strip_prefix('$')
            .unwrap_or(unsigned)
            .chars()
            .filter(|c| *c != ',')
            .collect();

        let amount = Decimal::from_str(&digits).map_err(|e| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount ({})", s, e),
        })?;
        let amount = if negative { -amount } else { amount };

        Money::from_decimal(amount).ok_or_else(|| ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: i64::MIN,
            max: i64::MAX,
        })
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(15000).format_with_symbol("€"), "€150.00");
        assert_eq!(Money::from_cents(-1).format_with_symbol("$"), "-$0.01");
    }

    #[test]
    fn test_parse_wire_amounts() {
        assert_eq!("150.00".parse::<Money>().unwrap().cents(), 15000);
        assert_eq!("150".parse::<Money>().unwrap().cents(), 15000);
        assert_eq!("0.5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!(" $1,250.75 ".parse::<Money>().unwrap().cents(), 125075);
        assert_eq!("-12.30".parse::<Money>().unwrap().cents(), -1230);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("12.3.4".parse::<Money>().is_err());
    }

    #[test]
    fn test_from_decimal_rounds_half_even() {
        assert_eq!(Money::from_decimal(Decimal::new(125, 3)).unwrap().cents(), 12);
        assert_eq!(Money::from_decimal(Decimal::new(135, 3)).unwrap().cents(), 14);
        assert_eq!(Money::from_decimal(Decimal::new(99999, 3)).unwrap().cents(), 10000);
    }

    #[test]
    fn test_oversized_decimal_is_none() {
        assert_eq!(Money::from_decimal(Decimal::MAX), None);
        assert_eq!(Money::from_decimal(Decimal::MIN), None);
        assert!(matches!(
            "9999999999999999999999999999".parse::<Money>(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
    }

    #[test]
    fn test_checked_and_saturating_add_at_bounds() {
        let max = Money::from_cents(i64::MAX);
        let one = Money::from_cents(1);

        assert_eq!(max.checked_add(one), None);
        assert_eq!(max.saturating_add(one), max);
        assert_eq!(Money::from_cents(i64::MIN).saturating_add(Money::from_cents(-1)).cents(), i64::MIN);
    }

    /// Ten cents added a thousand times must be exactly one hundred dollars.
    #[test]
    fn test_repeated_addition_does_not_drift() {
        let dime: Money = "0.10".parse().unwrap();
        let total: Money = std::iter::repeat(dime).take(1000).sum();
        assert_eq!(total.cents(), 10_000);

        let float_total: f64 = std::iter::repeat(0.10_f64).take(1000).sum();
        assert_ne!(float_total, 100.0);
    }

    #[test]
    fn test_decimal_string_and_chart_value() {
        let money = Money::from_cents(15050);
        assert_eq!(money.to_decimal_string(), "150.50");
        assert!((money.as_major_f64() - 150.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::from_cents(100).is_zero());
        assert_eq!(Money::default(), Money::zero());
    }
}
