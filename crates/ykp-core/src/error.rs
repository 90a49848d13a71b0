//! # Error Types
//!
//! Domain-specific error types for ykp-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ykp-core errors (this file)                                           │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Strict-layer input rejections                  │
//! │                                                                         │
//! │  ykp-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  NOTE: the calculator itself is TOTAL and never returns these.         │
//! │  Errors exist only in the optional validation layer above it and in    │
//! │  the ledger/persistence surfaces around it.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Record cannot be found in the ledger.
    #[error("Sale record not found: {0}")]
    RecordNotFound(String),

    /// A stored row's derived figures disagree with a fresh recomputation,
    /// or it was computed under an older formula version.
    ///
    /// ## When This Occurs
    /// - A stale client persisted figures from the retired 10% rate
    /// - A row predates the current formula version
    #[error("Record {id} was computed under formula v{stored}, current is v{current}")]
    StaleFormula { id: String, stored: u32, current: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Strict-layer input rejections.
///
/// The calculator coerces bad input to 0 and never rejects; these errors are
/// produced only by the opt-in validation layer for callers that want
/// stricter intake (imports, manual entry review).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., malformed phone number or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
