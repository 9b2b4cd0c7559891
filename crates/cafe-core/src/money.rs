//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A day of 300 coffee sales summed as floats drifts by centavos.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    ₱120.00 is stored as 12000, totals are exact integer sums           │
//! │    Rounding happens in exactly two places: ingredient purchases        │
//! │    (fractional kg × price) and average order value                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cafe_core::money::Money;
//!
//! // Create from centavos (preferred)
//! let price = Money::from_cents(12000); // ₱120.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                      // ₱240.00
//! let total = price + Money::from_cents(5000);  // ₱170.00
//! assert_eq!(doubled.cents(), 24000);
//! assert_eq!(total.cents(), 17000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for differences and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON snapshots
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  MenuItem.price ──► OrderLine.price ──► OrderLine.subtotal              │
/// │                                              │                          │
/// │                                              ▼                          │
/// │                     Order.subtotal = Order.total ──► change             │
/// │                                                                         │
/// │  InventoryItem.cost_per_unit ──► PurchaseLine.total ──► total_cost      │
/// │                                                                         │
/// │  Order.total ──► Dashboard revenue / Sales report                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let price = Money::from_cents(12050); // ₱120.50
    /// assert_eq!(price.cents(), 12050);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (pesos and centavos).
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let price = Money::from_major_minor(120, 50); // ₱120.50
    /// assert_eq!(price.cents(), 12050);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
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

    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (pesos) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5000); // ₱50.00
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.cents(), 10000); // ₱100.00
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Menu item: Caramel Waffle ₱50.00
    /// Quantity: 2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line subtotal: ₱100.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// `multiply_quantity` that returns `None` instead of overflowing.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Addition that returns `None` instead of overflowing.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, `None` if the total overflows.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let lines = [Money::from_cents(5000), Money::from_cents(2800)];
    /// assert_eq!(Money::checked_sum(lines), Some(Money::from_cents(7800)));
    /// assert_eq!(Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]), None);
    /// ```
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Multiplies money by a fractional quantity, rounding half away from
    /// zero to the nearest centavo.
    ///
    /// Ingredients are bought by weight or volume, so a purchase line is
    /// `cost per unit × 2.5 kg`.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let per_kg = Money::from_cents(33333); // ₱333.33 per kg
    /// assert_eq!(per_kg.scale_by(1.5).cents(), 50000); // 49999.5 → 50000
    /// assert_eq!(Money::from_cents(500).scale_by(20.0).cents(), 10000);
    /// ```
    pub fn scale_by(&self, factor: f64) -> Money {
        Money::from_cents((self.0 as f64 * factor).round() as i64)
    }

    /// Divides money evenly, rounding half away from zero.
    ///
    /// Returns zero when `divisor` is zero (an average over no orders).
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let revenue = Money::from_cents(1000);
    /// assert_eq!(revenue.divide_rounded(3).cents(), 333);
    /// assert_eq!(Money::from_cents(1001).divide_rounded(2).cents(), 501);
    /// assert_eq!(revenue.divide_rounded(0), Money::zero());
    /// ```
    pub fn divide_rounded(&self, divisor: i64) -> Money {
        if divisor == 0 {
            return Money::zero();
        }
        // i128 so the doubled numerator cannot overflow
        let num = self.0 as i128 * 2;
        let den = divisor as i128 * 2;
        let half = divisor.abs() as i128;
        let rounded = if (num >= 0) == (den > 0) {
            (num.abs() + half) / den.abs()
        } else {
            -((num.abs() + half) / den.abs())
        };
        Money::from_cents(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money with the peso sign.
///
/// ## Note
/// This is for logs and debugging. The app formats with the configured
/// currency symbol (`ConfigState::format_currency`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Default money is zero.
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

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing line subtotals and order totals.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
