//! Schema migration runner for JobLedger.
//!
//! Usage:
//!   migrator up      - Apply all pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - List applied and pending migrations
//!   migrator fresh   - Drop all tables and re-apply every migration
//!
//! Reads `DATABASE_URL` from the environment or a `.env` file. The server
//! refuses traffic until this has been run against its database.

use sea_orm_migration::prelude::*;
use jobledger_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
