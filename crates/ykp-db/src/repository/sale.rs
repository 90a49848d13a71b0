//! # Sale Repository
//!
//! Database operations for sale records.
//!
//! ## The Save Path Is Authoritative
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Batch Save Lifecycle                                 │
//! │                                                                         │
//! │  Client sends records (inputs + whatever derived figures it computed)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                     │
//! │       │                                                                 │
//! │       ├── for each record:                                             │
//! │       │     recompute derived from inputs  ← ykp-core, 13.3% rate      │
//! │       │     stamp current formula version                              │
//! │       │     INSERT OR REPLACE                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Client-sent derived values NEVER reach disk. A stale client formula   │
//! │  cannot corrupt stored settlement data.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use ykp_core::calculator::SettlementCalculator;
use ykp_core::types::{ActivationType, DerivedAmounts, SaleInputs, SaleRecord};

/// Every column of `sale_records`, in schema order. Shared by the insert
/// and select statements so the two cannot drift apart silently.
const ALL_COLUMNS: &str = "\
    id, seller, dealer, carrier, activation_type, model, sale_date, \
    phone_number, customer_name, birth_date, memo, \
    base_price, verbal1, verbal2, grade_amount, additional_amount, \
    cash_activation, usim_fee, new_mnp_discount, deduction, cash_received, payback, \
    rebate_total, settlement_amount, tax, margin_before_tax, margin_after_tax, \
    formula_version, created_at, updated_at";

/// Repository for sale record database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a batch of records, recomputing every record's derived
    /// fields immediately before the write.
    ///
    /// ## Why Recompute Here?
    /// The legacy system had at least one save path that stored client-sent
    /// derived values unchanged, which let a stale client formula corrupt
    /// the books. This repository is the only write path and it never
    /// trusts derived figures: inputs in, recomputation out, inside one
    /// transaction.
    ///
    /// Existing ids are replaced in place (upsert by primary key).
    ///
    /// ## Returns
    /// The number of records written.
    pub async fn save_batch(
        &self,
        records: &[SaleRecord],
        calculator: &SettlementCalculator,
    ) -> DbResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for record in records {
            let mut authoritative = record.clone();
            calculator.recalculate(&mut authoritative);
            if authoritative.derived != record.derived {
                warn!(
                    id = %record.id,
                    "Client-sent derived values discarded; server recomputation differs"
                );
            }
            authoritative.updated_at = Utc::now();

            debug!(id = %authoritative.id, settlement = authoritative.derived.settlement_amount, "Saving sale record");

            let sql = format!(
                "INSERT OR REPLACE INTO sale_records ({ALL_COLUMNS}) VALUES (\
                 ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, \
                 ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)"
            );
            sqlx::query(&sql)
                .bind(&authoritative.id)
                .bind(&authoritative.seller)
                .bind(&authoritative.dealer)
                .bind(&authoritative.carrier)
                .bind(authoritative.activation_type.label())
                .bind(&authoritative.model)
                .bind(authoritative.sale_date)
                .bind(&authoritative.phone_number)
                .bind(&authoritative.customer_name)
                .bind(authoritative.birth_date)
                .bind(&authoritative.memo)
                .bind(authoritative.inputs.base_price)
                .bind(authoritative.inputs.verbal1)
                .bind(authoritative.inputs.verbal2)
                .bind(authoritative.inputs.grade_amount)
                .bind(authoritative.inputs.additional_amount)
                .bind(authoritative.inputs.cash_activation)
                .bind(authoritative.inputs.usim_fee)
                .bind(authoritative.inputs.new_mnp_discount)
                .bind(authoritative.inputs.deduction)
                .bind(authoritative.inputs.cash_received)
                .bind(authoritative.inputs.payback)
                .bind(authoritative.derived.rebate_total)
                .bind(authoritative.derived.settlement_amount)
                .bind(authoritative.derived.tax)
                .bind(authoritative.derived.margin_before_tax)
                .bind(authoritative.derived.margin_after_tax)
                .bind(authoritative.formula_version as i64)
                .bind(authoritative.created_at)
                .bind(authoritative.updated_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = records.len(), "Sale batch saved");
        Ok(records.len())
    }

    /// Gets a sale record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let sql = format!("SELECT {ALL_COLUMNS} FROM sale_records WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| record_from_row(&r)).transpose()
    }

    /// Lists records with a sale date inside the inclusive range, ordered by
    /// sale date then creation time. Rows without a sale date are excluded.
    pub async fn list_by_sale_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<SaleRecord>> {
        let sql = format!(
            "SELECT {ALL_COLUMNS} FROM sale_records \
             WHERE sale_date IS NOT NULL AND sale_date >= ?1 AND sale_date <= ?2 \
             ORDER BY sale_date, created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    /// Lists every record, ordered by creation time.
    pub async fn list_all(&self) -> DbResult<Vec<SaleRecord>> {
        let sql = format!("SELECT {ALL_COLUMNS} FROM sale_records ORDER BY created_at, id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(record_from_row).collect()
    }

    /// Deletes a record. Hard delete, matching the sheet semantics.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sale_records WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale record", id));
        }

        debug!(id = %id, "Sale record deleted");
        Ok(())
    }

    /// Number of stored records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Drift audit: returns the ids of stored rows whose persisted derived
    /// figures (or formula version) disagree with a fresh recomputation.
    ///
    /// ## When To Run
    /// After a formula-version bump, or when reconciling data migrated from
    /// the legacy system (which mixed a 10% save-path rate into rows
    /// previewed at 13.3%). The audit flags; it never rewrites.
    pub async fn audit_derived(
        &self,
        calculator: &SettlementCalculator,
    ) -> DbResult<Vec<String>> {
        let records = self.list_all().await?;
        let stale: Vec<String> = records
            .iter()
            .filter(|r| !calculator.is_consistent(r))
            .map(|r| r.id.clone())
            .collect();

        if !stale.is_empty() {
            warn!(count = stale.len(), "Found records with stale derived figures");
        }
        Ok(stale)
    }
}

/// Maps one database row onto the canonical record type.
fn record_from_row(row: &SqliteRow) -> DbResult<SaleRecord> {
    let activation: String = row.try_get("activation_type")?;
    let formula_version: i64 = row.try_get("formula_version")?;

    Ok(SaleRecord {
        id: row.try_get("id")?,
        seller: row.try_get("seller")?,
        dealer: row.try_get("dealer")?,
        carrier: row.try_get("carrier")?,
        // Unknown labels from hand-edited rows fall back to the default
        // rather than poisoning the whole read.
        activation_type: activation.parse::<ActivationType>().unwrap_or_default(),
        model: row.try_get("model")?,
        sale_date: row.try_get::<Option<NaiveDate>, _>("sale_date")?,
        phone_number: row.try_get("phone_number")?,
        customer_name: row.try_get("customer_name")?,
        birth_date: row.try_get::<Option<NaiveDate>, _>("birth_date")?,
        memo: row.try_get("memo")?,
        inputs: SaleInputs {
            base_price: row.try_get("base_price")?,
            verbal1: row.try_get("verbal1")?,
            verbal2: row.try_get("verbal2")?,
            grade_amount: row.try_get("grade_amount")?,
            additional_amount: row.try_get("additional_amount")?,
            cash_activation: row.try_get("cash_activation")?,
            usim_fee: row.try_get("usim_fee")?,
            new_mnp_discount: row.try_get("new_mnp_discount")?,
            deduction: row.try_get("deduction")?,
            cash_received: row.try_get("cash_received")?,
            payback: row.try_get("payback")?,
        },
        derived: DerivedAmounts {
            rebate_total: row.try_get("rebate_total")?,
            settlement_amount: row.try_get("settlement_amount")?,
            tax: row.try_get("tax")?,
            margin_before_tax: row.try_get("margin_before_tax")?,
            margin_after_tax: row.try_get("margin_after_tax")?,
        },
        formula_version: formula_version as u32,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
