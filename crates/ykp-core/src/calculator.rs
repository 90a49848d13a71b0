//! # Settlement Calculator
//!
//! The formula chain that turns raw sale-entry amounts into settlement
//! figures. This is the heart of the system — every surface (interactive
//! edit, bulk import, persistence, reporting) calls into this one module so
//! there is exactly one formula in the codebase.
//!
//! ## The Formula Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Settlement Formula                                 │
//! │                                                                         │
//! │  1. rebate_total      = base_price + verbal1 + verbal2                 │
//! │                         + grade_amount + additional_amount             │
//! │                                                                         │
//! │  2. settlement_amount = rebate_total - cash_activation + usim_fee      │
//! │                         + new_mnp_discount + deduction                 │
//! │                                                                         │
//! │  3. tax               = round(settlement_amount × tax_rate)            │
//! │                                                                         │
//! │  4. margin_before_tax = settlement_amount - tax                        │
//! │                         + cash_received + payback                      │
//! │                                                                         │
//! │  5. margin_after_tax  = margin_before_tax + tax                        │
//! │                                                                         │
//! │  Pure • Total • Idempotent • No I/O • No shared state                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Which Tax Rate? Which Sign Convention?
//! The legacy codebase carried two tax rates (13.3% in the interactive
//! sheets, 10% in one save path) and two post-tax conventions
//! (`margin_before + tax` vs `margin_before - tax`). This implementation is
//! the system-of-record: 13.3% and the additive convention. The 10% rate
//! survives only as [`LEGACY_TAX_RATE_BPS`] so migration audits can name it.

use crate::money::{TaxRate, Won};
use crate::types::{
    ActivationType, DerivedAmounts, SaleInputs, SaleRecord, SettlementSummary,
};

// =============================================================================
// Rate Constants
// =============================================================================

/// Authoritative settlement tax rate: 13.3%.
pub const AUTHORITATIVE_TAX_RATE_BPS: u32 = 1330;

/// The 10% rate from the retired save-path calculator. Historical; rows
/// computed under it are formula-version drift, not an alternate profile.
pub const LEGACY_TAX_RATE_BPS: u32 = 1000;

/// Document discount auto-applied on new / number-port activations.
pub const NEW_MNP_DISCOUNT_DEFAULT: i64 = -800;

// =============================================================================
// Settlement Calculator
// =============================================================================

/// Deterministic, side-effect-free `SaleInputs → DerivedAmounts` transform.
///
/// Cheap to construct and `Copy`; hold one per deployment (the tax rate is
/// deployment configuration, not per-row data) and pass it to every surface
/// that computes or recomputes derived fields.
///
/// ## Example
/// ```rust
/// use ykp_core::calculator::SettlementCalculator;
/// use ykp_core::types::SaleInputs;
///
/// let calc = SettlementCalculator::default();
/// let derived = calc.calculate(&SaleInputs {
///     base_price: 150_000,
///     usim_fee: 5_500,
///     ..SaleInputs::default()
/// });
/// assert_eq!(derived.rebate_total, 150_000);
/// assert_eq!(derived.settlement_amount, 155_500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementCalculator {
    tax_rate: TaxRate,
}

impl SettlementCalculator {
    /// Creates a calculator with an explicit tax rate.
    pub const fn new(tax_rate: TaxRate) -> Self {
        SettlementCalculator { tax_rate }
    }

    /// Returns the configured tax rate.
    pub const fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Computes the derived settlement fields for one row.
    ///
    /// ## Guarantees
    /// - Total: never errors, never panics for any `SaleInputs`
    /// - Idempotent: same inputs always produce the same outputs
    /// - Pure: no I/O, no mutation of anything but the return value
    /// - All-zero inputs yield all-zero outputs
    pub fn calculate(&self, inputs: &SaleInputs) -> DerivedAmounts {
        let rebate_total = Won::from_won(inputs.base_price)
            + Won::from_won(inputs.verbal1)
            + Won::from_won(inputs.verbal2)
            + Won::from_won(inputs.grade_amount)
            + Won::from_won(inputs.additional_amount);

        let settlement_amount = rebate_total - Won::from_won(inputs.cash_activation)
            + Won::from_won(inputs.usim_fee)
            + Won::from_won(inputs.new_mnp_discount)
            + Won::from_won(inputs.deduction);

        let tax = settlement_amount.tax_at(self.tax_rate);

        let margin_before_tax = settlement_amount - tax
            + Won::from_won(inputs.cash_received)
            + Won::from_won(inputs.payback);

        // Additive post-tax convention: the tax is folded back in, so
        // margin_after = settlement + cash_received + payback exactly.
        let margin_after_tax = margin_before_tax + tax;

        DerivedAmounts {
            rebate_total: rebate_total.won(),
            settlement_amount: settlement_amount.won(),
            tax: tax.won(),
            margin_before_tax: margin_before_tax.won(),
            margin_after_tax: margin_after_tax.won(),
        }
    }

    /// Recomputes a record's derived fields in place and stamps the current
    /// formula version.
    ///
    /// ## When To Call
    /// On every input edit, on import backfill, and immediately before
    /// persistence. Client-sent derived values are never trusted.
    pub fn recalculate(&self, record: &mut SaleRecord) {
        record.derived = self.calculate(&record.inputs);
        record.formula_version = crate::types::FORMULA_VERSION;
    }

    /// Checks whether a record's stored derived fields match a fresh
    /// recomputation under the current formula.
    ///
    /// Used for drift audits; a `false` here means a stale client or an
    /// older formula version wrote the row.
    pub fn is_consistent(&self, record: &SaleRecord) -> bool {
        record.formula_version == crate::types::FORMULA_VERSION
            && record.derived == self.calculate(&record.inputs)
    }
}

/// The authoritative 13.3% calculator.
impl Default for SettlementCalculator {
    fn default() -> Self {
        SettlementCalculator::new(TaxRate::from_bps(AUTHORITATIVE_TAX_RATE_BPS))
    }
}

// =============================================================================
// Activation Default
// =============================================================================

/// Business-rule default for `new_mnp_discount` by activation type.
///
/// This is a UI-assist default applied on an activation-type *transition*
/// (the ledger enforces the transition-only rule); it is not part of the
/// pure calculation.
pub const fn default_mnp_discount(activation_type: ActivationType) -> i64 {
    match activation_type {
        ActivationType::New | ActivationType::Mnp => NEW_MNP_DISCOUNT_DEFAULT,
        ActivationType::DeviceChange => 0,
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Rolls up the derived fields of already-calculated records.
///
/// Sums only, so the rollup is associative and order-independent and safe to
/// compute incrementally. `average_margin` is the rounded mean of
/// `margin_before_tax`, 0 for an empty set.
pub fn aggregate(records: &[SaleRecord]) -> SettlementSummary {
    let mut summary = SettlementSummary {
        count: records.len(),
        ..SettlementSummary::default()
    };

    for record in records {
        summary.total_rebate += record.derived.rebate_total;
        summary.total_settlement += record.derived.settlement_amount;
        summary.total_tax += record.derived.tax;
        summary.total_margin_before += record.derived.margin_before_tax;
        summary.total_margin_after += record.derived.margin_after_tax;
    }

    summary.average_margin = div_round(summary.total_margin_before, summary.count as i64);
    summary
}

/// Integer division rounded half away from zero; 0 when the divisor is 0.
///
/// Public because SQL rollups in ykp-db must average with the exact same
/// rule as [`aggregate`].
pub fn div_round(numerator: i64, divisor: i64) -> i64 {
    if divisor == 0 {
        return 0;
    }
    // (n + sign·d/2) / d, done at double scale so odd divisors round
    // correctly without a fractional half.
    let n = numerator as i128;
    let d = divisor as i128;
    let adjusted = if (n >= 0) == (d > 0) {
        n * 2 + d.abs()
    } else {
        n * 2 - d.abs()
    };
    (adjusted / (d * 2)) as i64
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> SaleInputs {
        SaleInputs {
            base_price: 150_000,
            verbal1: 50_000,
            verbal2: 30_000,
            grade_amount: 20_000,
            additional_amount: 10_000,
            cash_activation: 0,
            usim_fee: 5_500,
            new_mnp_discount: -800,
            deduction: 0,
            cash_received: 50_000,
            payback: -30_000,
        }
    }

    #[test]
    fn test_zero_input_identity() {
        let derived = SettlementCalculator::default().calculate(&SaleInputs::default());
        assert_eq!(derived, DerivedAmounts::default());
    }

    #[test]
    fn test_concrete_scenario_at_authoritative_rate() {
        let derived = SettlementCalculator::default().calculate(&sample_inputs());

        assert_eq!(derived.rebate_total, 260_000);
        assert_eq!(derived.settlement_amount, 264_700);
        // round(264,700 × 0.133) = round(35,205.1)
        assert_eq!(derived.tax, 35_205);
        assert_eq!(derived.margin_before_tax, 264_700 - 35_205 + 50_000 - 30_000);
        assert_eq!(derived.margin_before_tax, 249_495);
        // Additive convention: the tax folds back in, leaving
        // settlement + cash_received + payback.
        assert_eq!(derived.margin_after_tax, 284_700);
    }

    #[test]
    fn test_margin_after_tax_is_settlement_plus_cash_flows() {
        // Algebraic consequence of the additive convention, independent of
        // the tax rate and its rounding.
        for rate in [AUTHORITATIVE_TAX_RATE_BPS, LEGACY_TAX_RATE_BPS, 0, 9999] {
            let calc = SettlementCalculator::new(TaxRate::from_bps(rate));
            let inputs = sample_inputs();
            let derived = calc.calculate(&inputs);
            assert_eq!(
                derived.margin_after_tax,
                derived.settlement_amount + inputs.cash_received + inputs.payback
            );
        }
    }

    #[test]
    fn test_legacy_rate_spot_check() {
        let calc = SettlementCalculator::new(TaxRate::from_bps(LEGACY_TAX_RATE_BPS));
        let derived = calc.calculate(&sample_inputs());
        assert_eq!(derived.tax, 26_470); // 264,700 × 10%
        assert_eq!(derived.margin_before_tax, 264_700 - 26_470 + 50_000 - 30_000);
    }

    #[test]
    fn test_idempotence() {
        let calc = SettlementCalculator::default();
        let inputs = sample_inputs();
        assert_eq!(calc.calculate(&inputs), calc.calculate(&inputs));
    }

    #[test]
    fn test_additivity_of_linear_steps() {
        let calc = SettlementCalculator::default();
        let a = sample_inputs();
        let b = SaleInputs {
            base_price: 90_000,
            verbal1: -5_000,
            usim_fee: 5_500,
            deduction: -2_000,
            ..SaleInputs::default()
        };
        let combined = SaleInputs {
            base_price: a.base_price + b.base_price,
            verbal1: a.verbal1 + b.verbal1,
            verbal2: a.verbal2 + b.verbal2,
            grade_amount: a.grade_amount + b.grade_amount,
            additional_amount: a.additional_amount + b.additional_amount,
            cash_activation: a.cash_activation + b.cash_activation,
            usim_fee: a.usim_fee + b.usim_fee,
            new_mnp_discount: a.new_mnp_discount + b.new_mnp_discount,
            deduction: a.deduction + b.deduction,
            cash_received: a.cash_received + b.cash_received,
            payback: a.payback + b.payback,
        };

        let da = calc.calculate(&a);
        let db = calc.calculate(&b);
        let dc = calc.calculate(&combined);

        // Steps 1 and 2 are linear; tax rounding breaks linearity from
        // step 3 on, by design.
        assert_eq!(dc.rebate_total, da.rebate_total + db.rebate_total);
        assert_eq!(dc.settlement_amount, da.settlement_amount + db.settlement_amount);
    }

    #[test]
    fn test_negative_settlement_rows() {
        // A clawback-heavy row can go negative end to end; the formula must
        // stay total and symmetric.
        let calc = SettlementCalculator::default();
        let inputs = SaleInputs {
            base_price: 10_000,
            cash_activation: 100_000,
            deduction: -50_000,
            ..SaleInputs::default()
        };
        let derived = calc.calculate(&inputs);
        assert_eq!(derived.settlement_amount, -140_000);
        assert_eq!(derived.tax, -18_620); // round(-140,000 × 0.133)
        assert_eq!(derived.margin_before_tax, -140_000 + 18_620);
        assert_eq!(derived.margin_after_tax, -140_000);
    }

    #[test]
    fn test_recalculate_stamps_formula_version() {
        let calc = SettlementCalculator::default();
        let mut record = SaleRecord::new();
        record.inputs = sample_inputs();
        record.formula_version = 0; // pretend it came from an old client
        calc.recalculate(&mut record);

        assert_eq!(record.derived.settlement_amount, 264_700);
        assert_eq!(record.formula_version, crate::types::FORMULA_VERSION);
        assert!(calc.is_consistent(&record));
    }

    #[test]
    fn test_is_consistent_flags_drift() {
        let calc = SettlementCalculator::default();
        let mut record = SaleRecord::new();
        record.inputs = sample_inputs();
        calc.recalculate(&mut record);

        // Corrupt the stored tax the way a stale 10% client would have.
        record.derived.tax = 26_470;
        assert!(!calc.is_consistent(&record));

        calc.recalculate(&mut record);
        record.formula_version = 1;
        assert!(!calc.is_consistent(&record));
    }

    #[test]
    fn test_default_mnp_discount() {
        assert_eq!(default_mnp_discount(ActivationType::New), -800);
        assert_eq!(default_mnp_discount(ActivationType::Mnp), -800);
        assert_eq!(default_mnp_discount(ActivationType::DeviceChange), 0);
    }

    #[test]
    fn test_aggregate_totals_match_per_record_sums() {
        let calc = SettlementCalculator::default();
        let mut records = Vec::new();
        for (base, cash) in [(150_000, 0), (90_000, 30_000), (-20_000, 5_000)] {
            let mut record = SaleRecord::new();
            record.inputs = SaleInputs {
                base_price: base,
                cash_activation: cash,
                usim_fee: 5_500,
                ..SaleInputs::default()
            };
            calc.recalculate(&mut record);
            records.push(record);
        }

        let summary = aggregate(&records);
        assert_eq!(summary.count, 3);
        assert_eq!(
            summary.total_settlement,
            records.iter().map(|r| r.derived.settlement_amount).sum::<i64>()
        );
        assert_eq!(
            summary.total_tax,
            records.iter().map(|r| r.derived.tax).sum::<i64>()
        );
        assert_eq!(
            summary.total_margin_before,
            records.iter().map(|r| r.derived.margin_before_tax).sum::<i64>()
        );
        assert_eq!(
            summary.average_margin,
            div_round(summary.total_margin_before, 3)
        );
    }

    #[test]
    fn test_aggregate_empty_set() {
        let summary = aggregate(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_settlement, 0);
        assert_eq!(summary.average_margin, 0);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let calc = SettlementCalculator::default();
        let mut records: Vec<SaleRecord> = (0..5)
            .map(|i| {
                let mut record = SaleRecord::new();
                record.inputs = SaleInputs {
                    base_price: 10_000 * (i + 1),
                    payback: -1_000 * i,
                    ..SaleInputs::default()
                };
                calc.recalculate(&mut record);
                record
            })
            .collect();

        let forward = aggregate(&records);
        records.reverse();
        let backward = aggregate(&records);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_div_round() {
        assert_eq!(div_round(10, 3), 3); // 3.33 → 3
        assert_eq!(div_round(11, 3), 4); // 3.67 → 4
        assert_eq!(div_round(3, 2), 2); // 1.5 → 2 (half away from zero)
        assert_eq!(div_round(-3, 2), -2); // -1.5 → -2
        assert_eq!(div_round(-10, 3), -3);
        assert_eq!(div_round(7, 0), 0);
    }
}
