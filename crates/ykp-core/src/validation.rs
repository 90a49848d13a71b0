//! # Validation Module
//!
//! Opt-in strict checks layered ABOVE the calculator.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Two Intake Policies                                │
//! │                                                                         │
//! │  Calculator (always)                                                   │
//! │  └── Best-effort: bad cells coerce to 0, never rejects                 │
//! │                                                                         │
//! │  THIS MODULE (opt-in)                                                  │
//! │  └── Strict: callers that want to surface suspect rows before they     │
//! │      hit the books (import review, manual-entry save) run these        │
//! │      checks and decide what to do with the failures                    │
//! │                                                                         │
//! │  The strict layer NEVER changes what the calculator computes.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::SaleRecord;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Carriers the dealer network settles against.
pub const ALLOWED_CARRIERS: [&str; 3] = ["SKT", "KT", "LG U+"];

// =============================================================================
// Field Validators
// =============================================================================

/// Validates the USIM fee.
///
/// The fee is an additive fixed charge; a negative value is a data-entry
/// mistake, not a discount.
pub fn validate_usim_fee(usim_fee: i64) -> ValidationResult<()> {
    if usim_fee < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "usim_fee".to_string(),
        });
    }
    Ok(())
}

/// Validates a phone number: digits and hyphens, 9 to 13 characters.
///
/// ## Example
/// ```rust
/// use ykp_core::validation::validate_phone_number;
///
/// assert!(validate_phone_number("010-1234-5678").is_ok());
/// assert!(validate_phone_number("call me").is_err());
/// ```
pub fn validate_phone_number(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone_number".to_string(),
        });
    }

    if !(9..=13).contains(&phone.len())
        || !phone.chars().all(|c| c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone_number".to_string(),
            reason: "must be 9-13 digits/hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a carrier name against the allowed set.
pub fn validate_carrier(carrier: &str) -> ValidationResult<()> {
    if ALLOWED_CARRIERS.contains(&carrier.trim()) {
        return Ok(());
    }
    Err(ValidationError::NotAllowed {
        field: "carrier".to_string(),
        allowed: ALLOWED_CARRIERS.iter().map(|c| c.to_string()).collect(),
    })
}

/// Validates a sale-date string as YYYY-MM-DD.
pub fn validate_sale_date(date: &str) -> ValidationResult<()> {
    chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: "sale_date".to_string(),
            reason: "must be YYYY-MM-DD".to_string(),
        }
    })?;
    Ok(())
}

// =============================================================================
// Record Validator
// =============================================================================

/// Runs the strict checks against one record and collects every failure.
///
/// Returns an empty vec for a clean record. Collecting rather than failing
/// fast lets an import review screen show everything wrong with a row at
/// once.
pub fn validate_record(record: &SaleRecord) -> Vec<ValidationError> {
    let mut failures = Vec::new();

    if let Err(e) = validate_usim_fee(record.inputs.usim_fee) {
        failures.push(e);
    }
    if !record.phone_number.trim().is_empty() {
        if let Err(e) = validate_phone_number(&record.phone_number) {
            failures.push(e);
        }
    }
    if !record.carrier.trim().is_empty() {
        if let Err(e) = validate_carrier(&record.carrier) {
            failures.push(e);
        }
    }

    failures
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_usim_fee() {
        assert!(validate_usim_fee(0).is_ok());
        assert!(validate_usim_fee(5500).is_ok());
        assert!(validate_usim_fee(-1).is_err());
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("010-1234-5678").is_ok());
        assert!(validate_phone_number("0212345678").is_ok());
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("010 1234 5678").is_err());
        assert!(validate_phone_number("12345678").is_err()); // too short
        assert!(validate_phone_number("call me maybe").is_err());
    }

    #[test]
    fn test_validate_carrier() {
        assert!(validate_carrier("SKT").is_ok());
        assert!(validate_carrier(" KT ").is_ok());
        assert!(validate_carrier("LG U+").is_ok());
        assert!(validate_carrier("Verizon").is_err());
        assert!(validate_carrier("").is_err());
    }

    #[test]
    fn test_validate_sale_date() {
        assert!(validate_sale_date("2026-03-15").is_ok());
        assert!(validate_sale_date("2026.03.15").is_err());
        assert!(validate_sale_date("someday").is_err());
    }

    #[test]
    fn test_validate_record_collects_failures() {
        let mut record = SaleRecord::new();
        record.inputs.usim_fee = -5;
        record.phone_number = "nope".to_string();
        record.carrier = "Verizon".to_string();

        let failures = validate_record(&record);
        assert_eq!(failures.len(), 3);

        // Blank classification fields are not failures; strictness is only
        // about values that are present.
        let clean = SaleRecord::new();
        assert!(validate_record(&clean).is_empty());
    }
}
