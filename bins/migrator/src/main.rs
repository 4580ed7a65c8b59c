//! Database migration runner for Spendflow.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show applied and pending migrations
//!   migrator fresh   - Drop every table and migrate from scratch
//!
//! The target database comes from `DATABASE_URL` (a `.env` file is read).

use sea_orm_migration::prelude::*;
use spendflow_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sets up its own tracing and reads DATABASE_URL.
    cli::run_cli(Migrator).await;
}
