//! Account repository for the ledger's balance rows.
//!
//! Creation, lookups, row locking and the single balance mutation
//! primitive all live here. Locking helpers take any `ConnectionTrait` so
//! they run inside the caller's `DatabaseTransaction`.

use std::sync::Arc;

use bursar_core::account::generate_account_number;
use bursar_core::ledger::{LedgerError, LedgerService};
use bursar_shared::LedgerConfig;
use chrono::Utc;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QuerySelect, Set,
};
use tracing::{info, warn};

use crate::entities::accounts;
use crate::error::{classify, is_unique_violation};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Argon2id PHC string of the account secret.
    pub secret_hash: String,
    /// Opening balance.
    pub initial_balance: Decimal,
}

/// Account repository for balance rows.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates an account under a freshly generated account number.
    ///
    /// # Errors
    ///
    /// See [`Self::create_account_with_rng`].
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
        config: &LedgerConfig,
    ) -> Result<accounts::Model, LedgerError> {
        self.create_account_with_rng(input, config, &mut StdRng::from_os_rng())
            .await
    }

    /// Creates an account, drawing account numbers from `rng`.
    ///
    /// A collision on the primary key draws a new number, up to
    /// `max_account_number_attempts` times.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Conflict` if every attempt collided, or a
    /// classified database error.
    pub async fn create_account_with_rng<R: Rng + Send + ?Sized>(
        &self,
        input: CreateAccountInput,
        config: &LedgerConfig,
        rng: &mut R,
    ) -> Result<accounts::Model, LedgerError> {
        for attempt in 1..=config.max_account_number_attempts {
            let account_number = generate_account_number(&config.account_prefix, rng);

            match self.insert(&account_number, &input).await {
                Ok(account) => {
                    info!(
                        account_number = %account.account_number,
                        balance = %account.balance,
                        "Account created"
                    );
                    return Ok(account);
                }
                Err(e) if is_unique_violation(&e) => {
                    warn!(
                        account_number = %account_number,
                        attempt,
                        "Account number collision, drawing a new one"
                    );
                }
                Err(e) => return Err(classify(e)),
            }
        }

        Err(LedgerError::Conflict(format!(
            "Could not allocate a unique account number after {} attempts",
            config.max_account_number_attempts
        )))
    }

    /// Creates an account under a caller-chosen account number.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the number is already taken, or a
    /// classified database error.
    pub async fn create_account_with_number(
        &self,
        account_number: &str,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, LedgerError> {
        match self.insert(account_number, &input).await {
            Ok(account) => {
                info!(account_number = %account.account_number, "Account created");
                Ok(account)
            }
            Err(e) if is_unique_violation(&e) => Err(LedgerError::validation(format!(
                "Account {account_number} already exists"
            ))),
            Err(e) => Err(classify(e)),
        }
    }

    async fn insert(
        &self,
        account_number: &str,
        input: &CreateAccountInput,
    ) -> Result<accounts::Model, sea_orm::DbErr> {
        let now = Utc::now().into();

        let account = accounts::ActiveModel {
            account_number: Set(account_number.to_string()),
            secret_hash: Set(input.secret_hash.clone()),
            balance: Set(input.initial_balance),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(self.db.as_ref()).await
    }

    /// Gets an account by number.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if no such account exists.
    pub async fn get_account(&self, account_number: &str) -> Result<accounts::Model, LedgerError> {
        accounts::Entity::find_by_id(account_number.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(classify)?
            .ok_or_else(|| LedgerError::AccountNotFound(account_number.to_string()))
    }

    /// Gets the current balance of an account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if no such account exists.
    pub async fn get_balance(&self, account_number: &str) -> Result<Decimal, LedgerError> {
        self.get_account(account_number)
            .await
            .map(|account| account.balance)
    }

    /// Loads an account row with `SELECT ... FOR UPDATE`.
    ///
    /// The lock is held until the surrounding transaction ends.
    ///
    /// # Errors
    ///
    /// Returns a classified database error; `Conflict` if the lock wait
    /// timed out.
    pub async fn lock_account<C: ConnectionTrait>(
        conn: &C,
        account_number: &str,
    ) -> Result<Option<accounts::Model>, LedgerError> {
        accounts::Entity::find_by_id(account_number.to_string())
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(classify)
    }

    /// Locks two account rows in ascending account-number order.
    ///
    /// Returns the rows in argument order, `(first, second)`, whatever order
    /// they were locked in.
    ///
    /// # Errors
    ///
    /// Returns a classified database error; `Conflict` if either lock wait
    /// timed out.
    pub async fn lock_pair<C: ConnectionTrait>(
        conn: &C,
        first: &str,
        second: &str,
    ) -> Result<(Option<accounts::Model>, Option<accounts::Model>), LedgerError> {
        let [low, high] = LedgerService::lock_order(first, second);

        let low_row = Self::lock_account(conn, low).await?;
        let high_row = if high == low {
            low_row.clone()
        } else {
            Self::lock_account(conn, high).await?
        };

        if low == first {
            Ok((low_row, high_row))
        } else {
            Ok((high_row, low_row))
        }
    }

    /// Adds a signed delta to an account balance and returns the new balance.
    ///
    /// Locks the row, computes the new balance with the ledger rules and
    /// writes it. Must run on a connection that is inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `InsufficientFunds` if the balance would go
    /// negative, or a classified database error.
    pub async fn apply_delta<C: ConnectionTrait>(
        conn: &C,
        account_number: &str,
        delta: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let account = Self::lock_account(conn, account_number)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_number.to_string()))?;

        let change = LedgerService::apply_delta(account_number, account.balance, delta)?;

        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(change.new_balance);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await.map_err(classify)?;

        Ok(change.new_balance)
    }
}
