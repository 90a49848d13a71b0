//! # Domain Types
//!
//! Core domain types for the settlement engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   SaleRecord    │   │   SaleInputs    │   │ DerivedAmounts  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  base_price     │   │  rebate_total   │       │
//! │  │  seller/dealer  │   │  verbal1/2      │   │  settlement     │       │
//! │  │  activation     │   │  usim_fee ...   │   │  tax, margins   │       │
//! │  │  inputs ────────┼──►│  (user-edited)  │   │  (recomputed)   │       │
//! │  │  derived ───────┼───┼─────────────────┼──►│                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │ ActivationType  │   │ SettlementSummary   │                         │
//! │  │  ─────────────  │   │  ─────────────────  │                         │
//! │  │  신규 / 번이     │   │  count + rollups    │                         │
//! │  │  기변           │   │  average_margin     │                         │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The One Invariant That Matters
//! `DerivedAmounts` is a pure function of `SaleInputs`. No derived field is
//! ever authoritative on its own: any persisted derived value must equal a
//! fresh recomputation from the same inputs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Formula Version
// =============================================================================

/// Version stamp for the settlement formula.
///
/// ## Why Version The Formula?
/// The legacy system shipped two tax rates (13.3% and 10%) and two post-tax
/// sign conventions at once, and a stale client could persist figures from
/// the wrong one. Every stored row carries the version it was computed under
/// so drift is flagged instead of silently trusted.
///
/// Bump this whenever the formula chain or the authoritative rate changes.
pub const FORMULA_VERSION: u32 = 2;

// =============================================================================
// Activation Type
// =============================================================================

/// How the handset was activated.
///
/// New activations and number ports (MNP, 번호이동) carry a fixed document
/// discount; device changes do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationType {
    /// New subscription (신규).
    #[serde(rename = "신규")]
    New,
    /// Mobile number portability, carrier switch (번이 / 번호이동).
    #[serde(rename = "번이")]
    Mnp,
    /// Device change on an existing line (기변).
    #[serde(rename = "기변")]
    DeviceChange,
}

impl ActivationType {
    /// Canonical sheet label.
    pub const fn label(&self) -> &'static str {
        match self {
            ActivationType::New => "신규",
            ActivationType::Mnp => "번이",
            ActivationType::DeviceChange => "기변",
        }
    }
}

impl fmt::Display for ActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActivationType {
    type Err = ();

    /// Accepts the canonical labels plus the long-form 번호이동 seen in
    /// older sheets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "신규" => Ok(ActivationType::New),
            "번이" | "번호이동" => Ok(ActivationType::Mnp),
            "기변" => Ok(ActivationType::DeviceChange),
            _ => Err(()),
        }
    }
}

impl Default for ActivationType {
    fn default() -> Self {
        ActivationType::New
    }
}

// =============================================================================
// Sale Inputs
// =============================================================================

/// The user-editable amounts of one sale row, in whole won.
///
/// ## Sign Conventions
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  additive   : base_price, verbal1, verbal2, grade_amount,              │
/// │               additional_amount, usim_fee, cash_received              │
/// │  subtracted : cash_activation (entered positive, subtracted)           │
/// │  signed     : new_mnp_discount (conventionally -800), deduction,       │
/// │               payback (conventionally negative)                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Every field defaults to 0 when absent; missing or malformed import cells
/// coerce to 0 at the adapter boundary rather than erroring here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleInputs {
    /// Base (face) price of the contract.
    #[serde(default)]
    pub base_price: i64,

    /// First verbal incentive.
    #[serde(default)]
    pub verbal1: i64,

    /// Second verbal incentive.
    #[serde(default)]
    pub verbal2: i64,

    /// Grade incentive amount.
    #[serde(default)]
    pub grade_amount: i64,

    /// Additional incentive amount.
    #[serde(default)]
    pub additional_amount: i64,

    /// Document-cash amount, subtracted from the rebate total.
    #[serde(default)]
    pub cash_activation: i64,

    /// USIM fee, additive fixed fee (conventionally positive).
    #[serde(default)]
    pub usim_fee: i64,

    /// New/MNP document discount (conventionally -800; 0 for device change).
    #[serde(default)]
    pub new_mnp_discount: i64,

    /// Manual deduction (conventionally negative).
    #[serde(default)]
    pub deduction: i64,

    /// Cash received directly from the customer.
    #[serde(default)]
    pub cash_received: i64,

    /// Payback to the customer (conventionally negative).
    #[serde(default)]
    pub payback: i64,
}

// =============================================================================
// Derived Amounts
// =============================================================================

/// The computed financial fields of one sale row.
///
/// Never user-edited. The calculator is the only writer; every surface that
/// persists or displays these recomputes them from [`SaleInputs`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DerivedAmounts {
    /// base_price + verbal1 + verbal2 + grade_amount + additional_amount.
    pub rebate_total: i64,

    /// rebate_total − cash_activation + usim_fee + new_mnp_discount + deduction.
    pub settlement_amount: i64,

    /// round(settlement_amount × tax_rate).
    pub tax: i64,

    /// settlement_amount − tax + cash_received + payback.
    pub margin_before_tax: i64,

    /// margin_before_tax + tax (additive convention, see calculator docs).
    pub margin_after_tax: i64,
}

// =============================================================================
// Sale Record
// =============================================================================

/// One sale-entry row: classification fields, editable amounts, and the
/// recomputed settlement figures.
///
/// ## Identity
/// `id` is a UUID v4 string assigned at creation time (client-side, before
/// the row ever reaches the database). The same id survives persistence, so
/// there is no temporary-id reconciliation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Salesperson name.
    pub seller: String,

    /// Dealer / agency name.
    pub dealer: String,

    /// Carrier (SKT, KT, LG U+).
    pub carrier: String,

    /// Activation type (신규 / 번이 / 기변).
    pub activation_type: ActivationType,

    /// Handset model name.
    pub model: String,

    /// Date of sale.
    pub sale_date: Option<NaiveDate>,

    /// Customer phone number.
    pub phone_number: String,

    /// Customer name.
    pub customer_name: String,

    /// Customer birth date.
    pub birth_date: Option<NaiveDate>,

    /// Free-form memo.
    pub memo: String,

    /// User-editable amounts.
    pub inputs: SaleInputs,

    /// Recomputed settlement figures.
    pub derived: DerivedAmounts,

    /// Formula version the derived figures were computed under.
    pub formula_version: u32,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl SaleRecord {
    /// Creates a blank record with a fresh id and all amounts at zero.
    ///
    /// Derived fields start at zero; the ledger recomputes them on insert
    /// and after every edit.
    pub fn new() -> Self {
        let now = Utc::now();
        SaleRecord {
            id: Uuid::new_v4().to_string(),
            seller: String::new(),
            dealer: String::new(),
            carrier: String::new(),
            activation_type: ActivationType::default(),
            model: String::new(),
            sale_date: None,
            phone_number: String::new(),
            customer_name: String::new(),
            birth_date: None,
            memo: String::new(),
            inputs: SaleInputs::default(),
            derived: DerivedAmounts::default(),
            formula_version: FORMULA_VERSION,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for SaleRecord {
    fn default() -> Self {
        SaleRecord::new()
    }
}

// =============================================================================
// Settlement Summary
// =============================================================================

/// Aggregate rollup over a set of calculated sale records.
///
/// Used by dashboard cards and report endpoints. All totals are plain sums
/// of the per-record derived fields, so aggregation is associative and
/// order-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Number of records aggregated.
    pub count: usize,

    /// Sum of rebate_total.
    pub total_rebate: i64,

    /// Sum of settlement_amount.
    pub total_settlement: i64,

    /// Sum of tax.
    pub total_tax: i64,

    /// Sum of margin_before_tax.
    pub total_margin_before: i64,

    /// Sum of margin_after_tax.
    pub total_margin_after: i64,

    /// round(total_margin_before / count), or 0 for an empty set.
    pub average_margin: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
