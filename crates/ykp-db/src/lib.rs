//! # ykp-db: Database Layer for YKP Settlement
//!
//! This crate provides database access for the YKP settlement engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     YKP Settlement Data Flow                            │
//! │                                                                         │
//! │  Service Handler (save sheet, render dashboard)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      ykp-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (sale.rs,    │    │  (embedded)  │  │   │
//! │  │   │               │    │   report.rs)  │    │              │  │   │
//! │  │   │ SqlitePool    │    │ SaleRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ ReportRepo    │    │ ...          │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                       ./ykp.db (WAL)                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived settlement amounts are never trusted from callers: the sale
//! repository recomputes them with the [`ykp_core`] calculator before every
//! write, so the database is the system of record for the formula too.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (sale, report)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ykp_db::{Database, DbConfig};
//! use ykp_core::SettlementCalculator;
//!
//! let db = Database::new(DbConfig::new("path/to/ykp.db")).await?;
//!
//! let calc = SettlementCalculator::default();
//! db.sales().save_batch(&records, &calc).await?;
//!
//! let summary = db.reports().overall_summary().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::report::{MonthlyMargin, ReportRepository};
pub use repository::sale::SaleRepository;
