//! # Seed Data Generator
//!
//! Populates the database with test sale records for development.
//!
//! ## Usage
//! ```bash
//! # Generate 300 records (default)
//! cargo run -p ykp-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p ykp-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p ykp-db --bin seed -- --db ./data/ykp.db
//! ```
//!
//! ## Generated Records
//! Creates realistic sale rows across sellers, dealers, and carriers,
//! spread over the last ~90 days. Each record has:
//! - Unique UUID id
//! - Rebate inputs drawn from realistic ranges
//! - Activation-type dependent new/MNP discount
//! - Derived amounts recomputed by the repository on save
//!
//! The first record is always the worked scenario used throughout the
//! calculator docs, so a fresh database has a known-good anchor row.

use chrono::{Duration, NaiveDate, Utc};
use std::env;
use ykp_core::calculator::default_mnp_discount;
use ykp_core::types::{ActivationType, SaleInputs, SaleRecord};
use ykp_core::SettlementCalculator;
use ykp_db::{Database, DbConfig};

const SELLERS: &[&str] = &["김철수", "이영희", "박민수", "최지우", "정다은"];

const DEALERS: &[&str] = &["골드텔레콤", "SM통신", "미래모바일", "한빛정보통신"];

const CARRIERS: &[&str] = &["SKT", "KT", "LG U+"];

const MODELS: &[&str] = &[
    "Galaxy S25",
    "Galaxy S25 Ultra",
    "Galaxy Z Flip 7",
    "Galaxy A56",
    "iPhone 16",
    "iPhone 16 Pro",
    "iPhone 16 Pro Max",
    "iPhone SE4",
];

const ACTIVATION_TYPES: &[ActivationType] = &[
    ActivationType::New,
    ActivationType::Mnp,
    ActivationType::DeviceChange,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 300;
    let mut db_path = String::from("./ykp_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(300);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("YKP Settlement Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of sale records to generate (default: 300)");
                println!("  -d, --db <PATH>    Database file path (default: ./ykp_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 YKP Settlement Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!("Records:  {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing records
    let existing = db.sales().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} sale records", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate records
    println!();
    println!("Generating sale records...");

    let records = build_records(count);

    let calc = SettlementCalculator::default();
    let start = std::time::Instant::now();
    let saved = db.sales().save_batch(&records, &calc).await?;
    let elapsed = start.elapsed();

    println!("✓ Saved {} records in {:?}", saved, elapsed);

    // Verify rollups
    println!();
    println!("Verifying report rollups...");

    let summary = db.reports().overall_summary().await?;
    println!("  Records:           {}", summary.count);
    println!("  Total rebate:      {}₩", summary.total_rebate);
    println!("  Total settlement:  {}₩", summary.total_settlement);
    println!("  Total tax:         {}₩", summary.total_tax);
    println!("  Margin before tax: {}₩", summary.total_margin_before);
    println!("  Margin after tax:  {}₩", summary.total_margin_after);
    println!("  Average margin:    {}₩", summary.average_margin);

    let trend = db.reports().monthly_margin_trend(6).await?;
    println!();
    println!("  Monthly margin trend:");
    for month in &trend {
        println!(
            "    {}  {:>4} records  {}₩",
            month.month, month.count, month.total_margin_before
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds the seed batch: the anchor scenario first, then `count - 1`
/// generated rows. Empty for a count of 0.
fn build_records(count: usize) -> Vec<SaleRecord> {
    let mut records = Vec::with_capacity(count);
    if count == 0 {
        return records;
    }
    records.push(anchor_record());
    for seed in 1..count {
        records.push(generate_record(seed));
    }
    records
}

/// The worked settlement scenario from the calculator documentation.
///
/// Expected derived amounts after save: rebate 260,000₩, settlement
/// 264,700₩, tax 35,205₩, margin before 249,495₩, margin after 284,700₩.
fn anchor_record() -> SaleRecord {
    let mut record = SaleRecord::new();
    record.seller = "김철수".to_string();
    record.dealer = "골드텔레콤".to_string();
    record.carrier = "SKT".to_string();
    record.activation_type = ActivationType::Mnp;
    record.model = "Galaxy S25".to_string();
    record.sale_date = Some(Utc::now().date_naive());
    record.inputs = SaleInputs {
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
    };
    record
}

/// Generates a single sale record with deterministic pseudo-random data.
fn generate_record(seed: usize) -> SaleRecord {
    let mut record = SaleRecord::new();

    record.seller = SELLERS[seed % SELLERS.len()].to_string();
    record.dealer = DEALERS[seed % DEALERS.len()].to_string();
    record.carrier = CARRIERS[seed % CARRIERS.len()].to_string();
    record.activation_type = ACTIVATION_TYPES[seed % ACTIVATION_TYPES.len()];
    record.model = MODELS[(seed * 7) % MODELS.len()].to_string();

    // Spread sale dates over the last ~90 days
    let days_ago = (seed * 13) % 90;
    record.sale_date = Some(sale_date(days_ago as i64));

    record.phone_number = format!("010-{:04}-{:04}", 1000 + seed % 9000, (seed * 31) % 10_000);
    record.customer_name = format!("고객{:03}", seed % 500);

    // Rebate inputs in round 1,000₩ steps, sized like real sheets
    record.inputs = SaleInputs {
        base_price: 100_000 + ((seed * 17) % 200) as i64 * 1_000,
        verbal1: ((seed * 11) % 80) as i64 * 1_000,
        verbal2: ((seed * 23) % 50) as i64 * 1_000,
        grade_amount: ((seed * 5) % 30) as i64 * 1_000,
        additional_amount: ((seed * 3) % 20) as i64 * 1_000,
        cash_activation: ((seed * 29) % 40) as i64 * 1_000,
        usim_fee: if seed % 4 == 0 { 0 } else { 5_500 },
        new_mnp_discount: default_mnp_discount(record.activation_type),
        deduction: -(((seed * 19) % 30) as i64 * 1_000),
        cash_received: ((seed * 37) % 60) as i64 * 1_000,
        payback: -(((seed * 41) % 50) as i64 * 1_000),
    };

    record
}

fn sale_date(days_ago: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days_ago)).date_naive()
}

// =============================================================================
// Unit Tests
// =============================================================================
