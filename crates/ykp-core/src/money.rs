//! # Money Module
//!
//! Provides the `Won` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A settlement sheet that drifts by ₩1 per row is a settlement sheet    │
//! │  nobody signs off on.                                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Won                                             │
//! │    KRW has no minor unit, so every amount is a signed i64 of whole won │
//! │    and the only rounding in the system is the single, explicit tax     │
//! │    rounding step.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ykp_core::money::{TaxRate, Won};
//!
//! let settlement = Won::from_won(264_700);
//! let tax = settlement.tax_at(TaxRate::from_bps(1330)); // 13.3%
//! assert_eq!(tax.won(), 35_205);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1330 bps = 13.3% (the interactive-sheet settlement rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Won Type
// =============================================================================

/// Represents a monetary value in whole Korean won.
///
/// ## Design Decisions
/// - **i64 (signed)**: Discounts, deductions and paybacks are negative amounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **No minor unit**: KRW is an integer currency, so there is no cents split
///
/// ## Where Won Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  SaleInputs (base_price, verbal1, ...) ──► rebate_total                 │
/// │        │                                                                │
/// │        └──► settlement_amount ──► tax_at(rate) ──► margins              │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Won(i64);

impl Won {
    /// Creates a Won value from whole won.
    #[inline]
    pub const fn from_won(won: i64) -> Self {
        Won(won)
    }

    /// Returns the value in whole won.
    #[inline]
    pub const fn won(&self) -> i64 {
        self.0
    }

    /// Returns zero won.
    #[inline]
    pub const fn zero() -> Self {
        Won(0)
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
        Won(self.0.abs())
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## Rounding Rule
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND HALF AWAY FROM ZERO                                          │
    /// │                                                                     │
    /// │  tax = round(amount × bps / 10000)                                  │
    /// │                                                                     │
    /// │   264_700 × 1330 / 10000 =  35_205.1  →  35_205                    │
    /// │  -264_700 × 1330 / 10000 = -35_205.1  → -35_205                    │
    /// │                                                                     │
    /// │  Naive integer division truncates toward zero, which would make    │
    /// │  negative settlement rows round differently than positive ones.    │
    /// │  The half-offset is applied with the sign of the product so the    │
    /// │  rule is symmetric across the whole signed range.                  │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Implementation
    /// i128 intermediates so `amount × bps` cannot overflow for any i64 won
    /// amount the system can represent.
    ///
    /// ## Example
    /// ```rust
    /// use ykp_core::money::{TaxRate, Won};
    ///
    /// let amount = Won::from_won(100_000);
    /// let tax = amount.tax_at(TaxRate::from_bps(1000)); // 10%
    /// assert_eq!(tax.won(), 10_000);
    /// ```
    pub fn tax_at(&self, rate: TaxRate) -> Won {
        let scaled = self.0 as i128 * rate.bps() as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Won(rounded as i64)
    }

    /// Formats with an explicit sign prefix, for adjustment columns.
    ///
    /// The sheet renders additive columns (usim fee, cash received) with a
    /// leading `+` and subtractive columns carry their own `-`.
    ///
    /// ## Example
    /// ```rust
    /// use ykp_core::money::Won;
    ///
    /// assert_eq!(Won::from_won(5500).format_signed(), "+₩5,500");
    /// assert_eq!(Won::from_won(-800).format_signed(), "-₩800");
    /// assert_eq!(Won::from_won(0).format_signed(), "₩0");
    /// ```
    pub fn format_signed(&self) -> String {
        if self.0 > 0 {
            format!("+{}", self)
        } else {
            format!("{}", self)
        }
    }
}

/// Best-effort parsing of a won amount from arbitrary user/import text.
///
/// ## Coercion Policy
/// The sheets never reject a cell: commas, a currency mark, a leading `+`
/// and surrounding whitespace are stripped, and anything that still fails
/// to parse coerces to ₩0. Availability over strictness.
///
/// ## Example
/// ```rust
/// use ykp_core::money::{parse_won, Won};
///
/// assert_eq!(parse_won("150,000"), Won::from_won(150_000));
/// assert_eq!(parse_won("₩-800"), Won::from_won(-800));
/// assert_eq!(parse_won("+5,500"), Won::from_won(5_500));
/// assert_eq!(parse_won("n/a"), Won::zero());
/// assert_eq!(parse_won(""), Won::zero());
/// ```
pub fn parse_won(raw: &str) -> Won {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '₩' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    Won(cleaned.parse::<i64>().unwrap_or(0))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows `₩` with thousands grouping; negatives carry a leading `-`.
///
/// ## Note
/// This is for logs, reports and the seed binary. UI surfaces do their own
/// localized formatting.
impl fmt::Display for Won {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₩{}", sign, group_thousands(self.0.unsigned_abs()))
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let chunk = value % 1000;
        value /= 1000;
        if value == 0 {
            groups.push(chunk.to_string());
            break;
        }
        groups.push(format!("{:03}", chunk));
    }
    groups.reverse();
    groups.join(",")
}

/// Default won is zero.
impl Default for Won {
    fn default() -> Self {
        Won::zero()
    }
}

impl Add for Won {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Won(self.0 + other.0)
    }
}

impl AddAssign for Won {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Won {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Won(self.0 - other.0)
    }
}

impl SubAssign for Won {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Won {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Won(-self.0)
    }
}

/// Multiplication by i64 (for row-count style scaling).
impl Mul<i64> for Won {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Won(self.0 * qty)
    }
}

impl Sum for Won {
    fn sum<I: Iterator<Item = Won>>(iter: I) -> Self {
        iter.fold(Won::zero(), |acc, w| acc + w)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_won() {
        let amount = Won::from_won(264_700);
        assert_eq!(amount.won(), 264_700);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Won::from_won(264_700)), "₩264,700");
        assert_eq!(format!("{}", Won::from_won(1_000_000)), "₩1,000,000");
        assert_eq!(format!("{}", Won::from_won(-800)), "-₩800");
        assert_eq!(format!("{}", Won::from_won(0)), "₩0");
        assert_eq!(format!("{}", Won::from_won(5)), "₩5");
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(Won::from_won(5500).format_signed(), "+₩5,500");
        assert_eq!(Won::from_won(-30_000).format_signed(), "-₩30,000");
        assert_eq!(Won::from_won(0).format_signed(), "₩0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Won::from_won(150_000);
        let b = Won::from_won(50_000);

        assert_eq!((a + b).won(), 200_000);
        assert_eq!((a - b).won(), 100_000);
        assert_eq!((-b).won(), -50_000);
        let tripled: Won = b * 3;
        assert_eq!(tripled.won(), 150_000);
    }

    #[test]
    fn test_sum() {
        let total: Won = [150_000, 50_000, -800].iter().map(|w| Won::from_won(*w)).sum();
        assert_eq!(total.won(), 199_200);
    }

    #[test]
    fn test_tax_exact() {
        // ₩100,000 at 10% = ₩10,000, no rounding involved
        let tax = Won::from_won(100_000).tax_at(TaxRate::from_bps(1000));
        assert_eq!(tax.won(), 10_000);
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 264,700 × 13.3% = 35,205.1 → 35,205
        let tax = Won::from_won(264_700).tax_at(TaxRate::from_bps(1330));
        assert_eq!(tax.won(), 35_205);

        // 5 × 10% = 0.5 → 1 (half rounds away from zero)
        let tax = Won::from_won(5).tax_at(TaxRate::from_bps(1000));
        assert_eq!(tax.won(), 1);
    }

    #[test]
    fn test_tax_symmetric_for_negatives() {
        let rate = TaxRate::from_bps(1330);
        for amount in [-10_000_000i64, -264_700, -5, -1, 0, 1, 5, 264_700, 10_000_000] {
            let pos = Won::from_won(amount.abs()).tax_at(rate).won();
            let neg = Won::from_won(-amount.abs()).tax_at(rate).won();
            assert_eq!(pos, -neg, "asymmetric rounding at {}", amount);
        }
    }

    #[test]
    fn test_tax_matches_reference_rounding_over_range() {
        // tax == round(settlement × rate) across the full documented range,
        // sampled coarsely plus the boundary values.
        let rate = TaxRate::from_bps(1330);
        let mut samples: Vec<i64> = (-10_000_000..=10_000_000).step_by(999_983).collect();
        samples.extend([-10_000_000, -1, 0, 1, 10_000_000]);
        for settlement in samples {
            let expected = (settlement as f64 * 0.133).round() as i64;
            let actual = Won::from_won(settlement).tax_at(rate).won();
            assert_eq!(actual, expected, "mismatch at settlement {}", settlement);
        }
    }

    #[test]
    fn test_parse_won_lenient() {
        assert_eq!(parse_won("150,000"), Won::from_won(150_000));
        assert_eq!(parse_won("  -800 "), Won::from_won(-800));
        assert_eq!(parse_won("₩5,500"), Won::from_won(5_500));
        assert_eq!(parse_won("+5500"), Won::from_won(5_500));
        assert_eq!(parse_won(""), Won::zero());
        assert_eq!(parse_won("abc"), Won::zero());
        assert_eq!(parse_won("12.5"), Won::zero());
    }

    #[test]
    fn test_tax_rate_conversions() {
        let rate = TaxRate::from_bps(1330);
        assert_eq!(rate.bps(), 1330);
        assert!((rate.percentage() - 13.3).abs() < 0.001);

        let rate = TaxRate::from_percentage(10.0);
        assert_eq!(rate.bps(), 1000);

        assert!(TaxRate::zero().is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Won::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Won::from_won(100).is_positive());
        assert!(Won::from_won(-100).is_negative());
        assert_eq!(Won::from_won(-550).abs().won(), 550);
    }
}
