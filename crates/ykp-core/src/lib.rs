//! # ykp-core: Pure Settlement Logic for YKP Settlement
//!
//! This crate is the **heart** of the system. It contains the settlement
//! formula and everything that feeds it as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     YKP Settlement Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Calling Surfaces (excluded)                    │   │
//! │  │  Edit Sheet ──► Bulk Import ──► Batch Save ──► Dashboards       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ ykp-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │ calculator │  │  ledger   │  │  adapter  │ │   │
//! │  │   │SaleRecord │  │  formula   │  │ undo/redo │  │ legacy    │ │   │
//! │  │   │SaleInputs │  │ aggregate  │  │ ordered   │  │ row maps  │ │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘ │   │
//! │  │   ┌───────────┐  ┌────────────┐                                │   │
//! │  │   │   money   │  │ validation │                                │   │
//! │  │   │ Won, Tax  │  │   strict   │                                │   │
//! │  │   └───────────┘  └────────────┘                                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   ykp-db (Database Layer)                       │   │
//! │  │     SQLite repositories; recomputes derived before EVERY write  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (SaleRecord, SaleInputs, DerivedAmounts, ...)
//! - [`money`] - Won type with integer arithmetic (no floating point!)
//! - [`calculator`] - The settlement formula chain and aggregation
//! - [`ledger`] - Ordered record container with undo/redo
//! - [`adapter`] - Legacy import-format adapters
//! - [`validation`] - Opt-in strict input checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **One Formula**: every surface recomputes through [`calculator`];
//!    derived fields are never authoritative on their own
//! 2. **Pure Functions**: same input = same output, no hidden state
//! 3. **Integer Money**: all amounts are whole won (i64), the only rounding
//!    is the explicit tax rounding step
//! 4. **Coerce, Don't Crash**: malformed numeric input becomes 0; strictness
//!    is an opt-in layer, not a property of the calculator
//!
//! ## Example Usage
//!
//! ```rust
//! use ykp_core::calculator::SettlementCalculator;
//! use ykp_core::types::SaleInputs;
//!
//! let calc = SettlementCalculator::default(); // 13.3%, system-of-record
//! let derived = calc.calculate(&SaleInputs {
//!     base_price: 150_000,
//!     verbal1: 50_000,
//!     verbal2: 30_000,
//!     grade_amount: 20_000,
//!     additional_amount: 10_000,
//!     usim_fee: 5_500,
//!     new_mnp_discount: -800,
//!     cash_received: 50_000,
//!     payback: -30_000,
//!     ..SaleInputs::default()
//! });
//!
//! assert_eq!(derived.rebate_total, 260_000);
//! assert_eq!(derived.settlement_amount, 264_700);
//! assert_eq!(derived.margin_after_tax, 284_700);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapter;
pub mod calculator;
pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use ykp_core::SettlementCalculator` instead of
// `use ykp_core::calculator::SettlementCalculator`

pub use calculator::{aggregate, SettlementCalculator};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::SaleLedger;
pub use money::{TaxRate, Won};
pub use types::*;
