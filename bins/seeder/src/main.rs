//! Database seeder for Bursar development and testing.
//!
//! Seeds the organization account that the LMS pays course fees into.
//! Safe to run repeatedly: an existing account is left untouched.
//!
//! Environment:
//!   BURSAR_ORG_SECRET   - secret for the organization account (required)
//!   BURSAR_ORG_ACCOUNT  - account number (default: LMS-ORG-001)
//!   BURSAR_ORG_BALANCE  - opening balance (default: 0)
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, bail};
use bursar_core::account::validate_new_account;
use bursar_core::credential::hash_secret;
use bursar_core::ledger::LedgerError;
use bursar_db::{AccountRepository, CreateAccountInput};
use bursar_shared::AppConfig;
use rust_decimal::Decimal;

/// Account number the LMS expects course payments to land in.
const DEFAULT_ORG_ACCOUNT: &str = "LMS-ORG-001";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = bursar_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let accounts = AccountRepository::new(Arc::new(db));

    println!("Seeding organization account...");
    seed_org_account(&accounts).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_org_account(accounts: &AccountRepository) -> anyhow::Result<()> {
    let account_number =
        std::env::var("BURSAR_ORG_ACCOUNT").unwrap_or_else(|_| DEFAULT_ORG_ACCOUNT.to_string());

    match accounts.get_account(&account_number).await {
        Ok(_) => {
            println!("  Account {account_number} already exists, skipping...");
            return Ok(());
        }
        Err(LedgerError::AccountNotFound(_)) => {}
        Err(e) => return Err(e).context("Failed to look up organization account"),
    }

    let Ok(secret) = std::env::var("BURSAR_ORG_SECRET") else {
        bail!("BURSAR_ORG_SECRET must be set to create {account_number}");
    };
    let balance = match std::env::var("BURSAR_ORG_BALANCE") {
        Ok(raw) => Some(
            Decimal::from_str(raw.trim())
                .with_context(|| format!("BURSAR_ORG_BALANCE is not a decimal: {raw}"))?,
        ),
        Err(_) => None,
    };

    let new_account = validate_new_account(Some(secret), balance, Decimal::ZERO)?;
    let secret_hash = hash_secret(&new_account.secret)?;

    let created = accounts
        .create_account_with_number(
            &account_number,
            CreateAccountInput {
                secret_hash,
                initial_balance: new_account.initial_balance,
            },
        )
        .await?;

    println!(
        "  Created {} with balance {}",
        created.account_number, created.balance
    );
    Ok(())
}
