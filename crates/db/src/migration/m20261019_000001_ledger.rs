//! Initial ledger migration.
//!
//! Creates the transaction status enum, the accounts table and the
//! transactions table with the constraints that back the ledger rules.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE transaction_status AS ENUM ('pending', 'completed');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    account_number VARCHAR(64) PRIMARY KEY,
    secret_hash TEXT NOT NULL,
    balance NUMERIC(18, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- Backstop for the application-level funds check
    CONSTRAINT chk_accounts_balance_non_negative CHECK (balance >= 0)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id BIGSERIAL PRIMARY KEY,
    from_account VARCHAR(64) NOT NULL REFERENCES accounts(account_number),
    to_account VARCHAR(64) NOT NULL REFERENCES accounts(account_number),
    amount NUMERIC(18, 2) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status transaction_status NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    validated_at TIMESTAMPTZ,
    CONSTRAINT chk_transactions_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transactions_distinct_parties CHECK (from_account <> to_account),
    CONSTRAINT chk_transactions_validated_at CHECK (
        (status = 'completed' AND validated_at IS NOT NULL)
        OR (status = 'pending' AND validated_at IS NULL)
    )
);

-- Account history, newest first
CREATE INDEX idx_transactions_from ON transactions(from_account, created_at DESC);
CREATE INDEX idx_transactions_to ON transactions(to_account, created_at DESC);

-- Settlement lookups
CREATE INDEX idx_transactions_pending ON transactions(id) WHERE status = 'pending';
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TYPE IF EXISTS transaction_status;
";
