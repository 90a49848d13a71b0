//! # Legacy Import Adapters
//!
//! The legacy sheets produced three incompatible row shapes: a Korean-keyed
//! spreadsheet export, a camelCase English export from the backup views, and
//! the snake_case production shape. The core tolerates exactly one canonical
//! schema ([`SaleRecord`]); this module is the boundary where each legacy
//! shape is mapped onto it, one explicit adapter per format.
//!
//! ## Coercion Policy
//! Imports never reject a row. Missing or malformed numeric cells coerce to
//! 0, unparseable dates become `None`, and source-supplied derived values
//! are discarded outright — every imported row leaves this module with
//! freshly recomputed settlement figures.

use chrono::NaiveDate;
use serde_json::Value;

use crate::calculator::SettlementCalculator;
use crate::money::parse_won;
use crate::types::{ActivationType, SaleInputs, SaleRecord};

// =============================================================================
// Formats
// =============================================================================

/// The known legacy row shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFormat {
    /// Korean-keyed rows from the spreadsheet exports ("판매자", "액면가", …).
    KoreanSheet,
    /// camelCase English keys from the backup views ("basePrice", …).
    CamelCase,
    /// snake_case keys matching the canonical serde shape.
    Production,
}

/// Per-format key table. One row of names per canonical field.
struct KeyMap {
    id: &'static str,
    seller: &'static str,
    dealer: &'static str,
    carrier: &'static str,
    activation_type: &'static str,
    model: &'static str,
    sale_date: &'static str,
    phone_number: &'static str,
    customer_name: &'static str,
    birth_date: &'static str,
    memo: &'static str,
    base_price: &'static str,
    verbal1: &'static str,
    verbal2: &'static str,
    grade_amount: &'static str,
    additional_amount: &'static str,
    cash_activation: &'static str,
    usim_fee: &'static str,
    new_mnp_discount: &'static str,
    deduction: &'static str,
    cash_received: &'static str,
    payback: &'static str,
}

const KOREAN_SHEET: KeyMap = KeyMap {
    id: "id",
    seller: "판매자",
    dealer: "대리점",
    carrier: "통신사",
    activation_type: "개통방식",
    model: "모델명",
    sale_date: "판매일",
    phone_number: "휴대폰번호",
    customer_name: "고객명",
    birth_date: "생년월일",
    memo: "메모",
    base_price: "액면가",
    verbal1: "구두1",
    verbal2: "구두2",
    grade_amount: "그레이드",
    additional_amount: "부가추가",
    cash_activation: "서류상현금개통",
    usim_fee: "유심비",
    new_mnp_discount: "신규번이",
    deduction: "차감",
    cash_received: "현금받음",
    payback: "페이백",
};

const CAMEL_CASE: KeyMap = KeyMap {
    id: "id",
    seller: "seller",
    dealer: "dealer",
    carrier: "carrier",
    activation_type: "activationType",
    model: "model",
    sale_date: "saleDate",
    phone_number: "phoneNumber",
    customer_name: "customerName",
    birth_date: "birthDate",
    memo: "memo",
    base_price: "basePrice",
    verbal1: "verbal1",
    verbal2: "verbal2",
    grade_amount: "gradeAmount",
    additional_amount: "additionalAmount",
    cash_activation: "cashActivation",
    usim_fee: "usimFee",
    new_mnp_discount: "newMnpDiscount",
    deduction: "deduction",
    cash_received: "cashReceived",
    payback: "payback",
};

const PRODUCTION: KeyMap = KeyMap {
    id: "id",
    seller: "seller",
    dealer: "dealer",
    carrier: "carrier",
    activation_type: "activation_type",
    model: "model",
    sale_date: "sale_date",
    phone_number: "phone_number",
    customer_name: "customer_name",
    birth_date: "birth_date",
    memo: "memo",
    base_price: "base_price",
    verbal1: "verbal1",
    verbal2: "verbal2",
    grade_amount: "grade_amount",
    additional_amount: "additional_amount",
    cash_activation: "cash_activation",
    usim_fee: "usim_fee",
    new_mnp_discount: "new_mnp_discount",
    deduction: "deduction",
    cash_received: "cash_received",
    payback: "payback",
};

const fn key_map(format: LegacyFormat) -> &'static KeyMap {
    match format {
        LegacyFormat::KoreanSheet => &KOREAN_SHEET,
        LegacyFormat::CamelCase => &CAMEL_CASE,
        LegacyFormat::Production => &PRODUCTION,
    }
}

// =============================================================================
// Row Parsing
// =============================================================================

/// Maps one legacy JSON row onto a canonical [`SaleRecord`].
///
/// The record's derived fields are recomputed through `calculator`; any
/// derived values present in the source row are ignored.
pub fn parse_row(
    format: LegacyFormat,
    row: &Value,
    calculator: &SettlementCalculator,
) -> SaleRecord {
    let keys = key_map(format);
    let mut record = SaleRecord::new();

    // SaleRecord::new already assigned a fresh UUID; a source id wins only
    // when it is a non-empty string.
    if let Some(id) = row.get(keys.id).and_then(Value::as_str) {
        if !id.trim().is_empty() {
            record.id = id.trim().to_string();
        }
    }

    record.seller = coerce_string(row.get(keys.seller));
    record.dealer = coerce_string(row.get(keys.dealer));
    record.carrier = coerce_string(row.get(keys.carrier));
    record.activation_type = coerce_string(row.get(keys.activation_type))
        .parse::<ActivationType>()
        .unwrap_or_default();
    record.model = coerce_string(row.get(keys.model));
    record.sale_date = coerce_date(row.get(keys.sale_date));
    record.phone_number = coerce_string(row.get(keys.phone_number));
    record.customer_name = coerce_string(row.get(keys.customer_name));
    record.birth_date = coerce_date(row.get(keys.birth_date));
    record.memo = coerce_string(row.get(keys.memo));

    record.inputs = SaleInputs {
        base_price: coerce_amount(row.get(keys.base_price)),
        verbal1: coerce_amount(row.get(keys.verbal1)),
        verbal2: coerce_amount(row.get(keys.verbal2)),
        grade_amount: coerce_amount(row.get(keys.grade_amount)),
        additional_amount: coerce_amount(row.get(keys.additional_amount)),
        cash_activation: coerce_amount(row.get(keys.cash_activation)),
        usim_fee: coerce_amount(row.get(keys.usim_fee)),
        new_mnp_discount: coerce_amount(row.get(keys.new_mnp_discount)),
        deduction: coerce_amount(row.get(keys.deduction)),
        cash_received: coerce_amount(row.get(keys.cash_received)),
        payback: coerce_amount(row.get(keys.payback)),
    };

    calculator.recalculate(&mut record);
    record
}

/// Maps a JSON array of legacy rows. Non-object elements are skipped.
pub fn parse_rows(
    format: LegacyFormat,
    rows: &Value,
    calculator: &SettlementCalculator,
) -> Vec<SaleRecord> {
    rows.as_array()
        .map(|array| {
            array
                .iter()
                .filter(|row| row.is_object())
                .map(|row| parse_row(format, row, calculator))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Cell Coercion
// =============================================================================

/// Best-effort amount coercion: integers pass through, floats round,
/// strings go through the lenient won parser, everything else is 0.
fn coerce_amount(cell: Option<&Value>) -> i64 {
    match cell {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_won(s).won(),
        _ => 0,
    }
}

fn coerce_string(cell: Option<&Value>) -> String {
    match cell {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Accepts the date spellings seen across the exports; anything else is
/// `None` rather than an error.
fn coerce_date(cell: Option<&Value>) -> Option<NaiveDate> {
    let raw = match cell {
        Some(Value::String(s)) => s.trim(),
        _ => return None,
    };
    for pattern in ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
            return Some(date);
        }
    }
    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_korean_sheet_row() {
        let calc = SettlementCalculator::default();
        let row = json!({
            "판매자": "김판매",
            "대리점": "서울중앙",
            "통신사": "SKT",
            "개통방식": "번호이동",
            "모델명": "Galaxy S24",
            "판매일": "2026.03.15",
            "고객명": "이고객",
            "액면가": "150,000",
            "구두1": 50000,
            "구두2": 30000,
            "그레이드": 20000,
            "부가추가": 10000,
            "유심비": 5500,
            "신규번이": -800,
            "현금받음": "50,000",
            "페이백": -30000
        });

        let record = parse_row(LegacyFormat::KoreanSheet, &row, &calc);
        assert_eq!(record.seller, "김판매");
        assert_eq!(record.activation_type, ActivationType::Mnp);
        assert_eq!(record.sale_date, NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(record.inputs.base_price, 150_000);
        assert_eq!(record.inputs.cash_received, 50_000);
        // Derived is always backfilled by recomputation.
        assert_eq!(record.derived.rebate_total, 260_000);
        assert_eq!(record.derived.settlement_amount, 264_700);
    }

    #[test]
    fn test_camel_case_row_discards_source_derived() {
        let calc = SettlementCalculator::default();
        let row = json!({
            "id": "row-7",
            "seller": "Park",
            "activationType": "기변",
            "basePrice": 100000,
            "usimFee": 5500,
            // A stale client computed these under the wrong rate; they
            // must be ignored.
            "settlementAmount": 1,
            "tax": 2,
            "marginBeforeTax": 3
        });

        let record = parse_row(LegacyFormat::CamelCase, &row, &calc);
        assert_eq!(record.id, "row-7");
        assert_eq!(record.activation_type, ActivationType::DeviceChange);
        assert_eq!(record.derived.settlement_amount, 105_500);
        assert_eq!(record.derived, calc.calculate(&record.inputs));
    }

    #[test]
    fn test_production_row() {
        let calc = SettlementCalculator::default();
        let row = json!({
            "seller": "최판매",
            "activation_type": "신규",
            "sale_date": "2026-01-31",
            "base_price": 90000,
            "new_mnp_discount": -800
        });

        let record = parse_row(LegacyFormat::Production, &row, &calc);
        assert_eq!(record.activation_type, ActivationType::New);
        assert_eq!(record.sale_date, NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(record.derived.settlement_amount, 89_200);
    }

    #[test]
    fn test_malformed_cells_coerce_to_defaults() {
        let calc = SettlementCalculator::default();
        let row = json!({
            "액면가": "n/a",
            "구두1": null,
            "유심비": true,
            "판매일": "someday",
            "개통방식": "선불"
        });

        let record = parse_row(LegacyFormat::KoreanSheet, &row, &calc);
        assert_eq!(record.inputs, SaleInputs::default());
        assert_eq!(record.sale_date, None);
        assert_eq!(record.activation_type, ActivationType::default());
        assert_eq!(record.derived.settlement_amount, 0);
    }

    #[test]
    fn test_missing_id_gets_generated() {
        let calc = SettlementCalculator::default();
        let a = parse_row(LegacyFormat::Production, &json!({}), &calc);
        let b = parse_row(LegacyFormat::Production, &json!({}), &calc);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_parse_rows_skips_non_objects() {
        let calc = SettlementCalculator::default();
        let rows = json!([
            { "base_price": 10000 },
            "garbage",
            42,
            { "base_price": 20000 }
        ]);

        let records = parse_rows(LegacyFormat::Production, &rows, &calc);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].inputs.base_price, 10_000);
        assert_eq!(records[1].inputs.base_price, 20_000);

        assert!(parse_rows(LegacyFormat::Production, &json!("not an array"), &calc).is_empty());
    }

    #[test]
    fn test_float_amounts_round() {
        let calc = SettlementCalculator::default();
        let row = json!({ "base_price": 150000.6 });
        let record = parse_row(LegacyFormat::Production, &row, &calc);
        assert_eq!(record.inputs.base_price, 150_001);
    }
}
