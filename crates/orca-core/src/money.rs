//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    40000.00 × 0.06 = 2399.9999999999995  ❌ WRONG!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos × Decimal Rates                         │
//! │    4_000_000 centavos × 0.06 = 240_000 centavos  (exact)                │
//! │    Rounded ONCE per cost line, half-up, to whole centavos               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orca_core::money::Money;
//! use orca_core::types::Rate;
//!
//! let final_value = Money::from_major_minor(40_000, 0); // R$ 40000.00
//! let commission = final_value.apply_rate(Rate::from_bps(600)).unwrap();
//! assert_eq!(commission, Money::from_major_minor(2_400, 0));
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (the smallest BRL unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: margins can be negative when costs exceed the sale
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as integer centavos**: the stored snapshot never holds floats
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ambient_value ──► × (1 − discount) ──► final_value                    │
/// │        │                                    │                           │
/// │        └─► × deflator ──► factory_cost      ├─► × tier % ──► commission │
/// │                                             └─► × freight % ──► freight │
/// │                                                                         │
/// │  final_value − Σ costs ──► margin                                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use orca_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents R$ 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// ## Example
    /// ```rust
    /// use orca_core::money::Money;
    ///
    /// let value = Money::from_major_minor(25_000, 1); // R$ 25000.01
    /// assert_eq!(value.cents(), 2_500_001);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -R$ 5.50
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the value as an exact decimal amount of centavos.
    #[inline]
    pub fn as_decimal_cents(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Multiplies by a rate and rounds ONCE to whole centavos, half-up.
    ///
    /// ## Rounding Rule
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND HALF UP (midpoint away from zero)                            │
    /// │                                                                     │
    /// │  5_000_001 centavos × 0.08 = 400_000.08  → 400_000 (R$ 4000.00)     │
    /// │        101 centavos × 0.50 =      50.5   →      51                  │
    /// │        100 centavos × 0.125 =     12.5   →      13                  │
    /// │                                                                     │
    /// │  Each cost line is rounded when it is produced; totals are sums of  │
    /// │  already-rounded lines, so the snapshot always reconciles.          │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Errors
    /// `CoreError::AmountOverflow` when the product does not fit in i64.
    pub fn apply_rate(&self, rate: Rate) -> CoreResult<Money> {
        let product = self
            .as_decimal_cents()
            .checked_mul(rate.as_decimal())
            .ok_or_else(|| CoreError::overflow("money × rate"))?;

        product
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money::from_cents)
            .ok_or_else(|| CoreError::overflow("money × rate"))
    }

    /// Adds two amounts, reporting overflow instead of wrapping.
    ///
    /// ## Example
    /// ```rust
    /// use orca_core::money::Money;
    ///
    /// let total = Money::from_cents(1_000).checked_add(Money::from_cents(99)).unwrap();
    /// assert_eq!(total.cents(), 1_099);
    /// assert!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)).is_err());
    /// ```
    #[inline]
    pub fn checked_add(self, other: Money) -> CoreResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| CoreError::overflow("money + money"))
    }

    #[inline]
    pub fn checked_sub(self, other: Money) -> CoreResult<Money> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| CoreError::overflow("money − money"))
    }

    /// Sums amounts with [`Money::checked_add`]; the first overflow wins.
    pub fn checked_sum<I>(amounts: I) -> CoreResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Returns `self` as a percentage of `whole`, rounded half-up to 2 places.
    ///
    /// Returns zero when `whole` is not positive.
    ///
    /// ## Example
    /// ```rust
    /// use orca_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let margin = Money::from_cents(1_000);
    /// let sale = Money::from_cents(3_000);
    /// assert_eq!(margin.percentage_of(sale), Decimal::new(3333, 2)); // 33.33
    /// ```
    pub fn percentage_of(&self, whole: Money) -> Decimal {
        if !whole.is_positive() {
            return Decimal::ZERO;
        }

        let ratio = self.as_decimal_cents() * Decimal::ONE_HUNDRED / whole.as_decimal_cents();
        ratio.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display (`R$ 10.99`). Localised formatting belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}R$ {}.{:02}",
            sign,
            self.reais().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
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
