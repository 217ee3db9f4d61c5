//! # Seed Data Generator
//!
//! Populates the database with the standard development dataset.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p rxledger-db --bin seed
//!
//! # Specify database path
//! cargo run -p rxledger-db --bin seed -- --db ./data/rxledger.db
//! ```
//!
//! ## Generated Data
//! - 3 users: a nurse, a witness, and an admin
//! - 5 medications across schedules II-V with realistic stock levels
//!
//! Refuses to seed a database that already contains users, so running it
//! twice never duplicates reference data.

use std::env;

use rxledger_core::{CreateMedication, Role, Schedule, Unit};
use rxledger_db::{Database, DbConfig};

/// (email, name, role)
const USERS: &[(&str, &str, Role)] = &[
    ("nurse@hospital.com", "Jane Smith", Role::Nurse),
    ("witness@hospital.com", "John Doe", Role::Witness),
    ("admin@hospital.com", "Alice Johnson", Role::Admin),
];

/// (name, schedule, unit, stock, slug)
const MEDICATIONS: &[(&str, Schedule, Unit, i64, &str)] = &[
    ("Morphine Sulfate", Schedule::II, Unit::Mg, 500, "morphine-sulfate"),
    ("Fentanyl", Schedule::II, Unit::Mcg, 1000, "fentanyl"),
    ("Codeine", Schedule::III, Unit::Mg, 300, "codeine"),
    ("Diazepam", Schedule::IV, Unit::Mg, 200, "diazepam"),
    ("Pregabalin", Schedule::V, Unit::Mg, 750, "pregabalin"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./rxledger.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("RxLedger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rxledger.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 RxLedger Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.users().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} users", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding users...");
    for (email, name, role) in USERS {
        let user = db.users().insert(email, name, *role).await?;
        println!("  {} <{}>", user.name, user.email);
    }

    println!();
    println!("Seeding medications...");
    for (name, schedule, unit, stock, slug) in MEDICATIONS {
        let medication = db
            .medications()
            .insert(&CreateMedication {
                name: name.to_string(),
                schedule: *schedule,
                unit: *unit,
                slug: slug.to_string(),
                stock_quantity: *stock,
            })
            .await?;
        println!(
            "  {} (Schedule {}, {} {})",
            medication.name, medication.schedule, medication.stock_quantity, medication.unit
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
