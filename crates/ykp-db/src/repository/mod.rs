//! # Repository Module
//!
//! Database repository implementations for YKP Settlement.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Service Handler                                                       │
//! │       │                                                                 │
//! │       │  db.sales().save_batch(&records, &calc)                        │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── save_batch(&self, records, calculator)   ← recompute + write      │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_by_sale_date(&self, from, to)                                │
//! │  └── audit_derived(&self, calculator)                                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • The recompute-before-write rule lives in exactly one place          │
//! │  • SQL is isolated from callers                                        │
//! │  • Easy to test against an in-memory database                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`sale::SaleRepository`] - Sale record persistence and drift audits
//! - [`report::ReportRepository`] - Dashboard rollups and trend series

pub mod report;
pub mod sale;
