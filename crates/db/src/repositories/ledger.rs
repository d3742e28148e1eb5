//! Ledger repository for transfers and the pending transaction workflow.
//!
//! Every mutating operation is one database transaction that:
//! 1. Bounds lock waits with `SET LOCAL lock_timeout`
//! 2. Locks the rows it will touch (pending transaction first, then
//!    accounts in ascending account-number order)
//! 3. Hands the locked snapshots to `LedgerService` for a decision
//! 4. Persists the plan and commits
//!
//! Returning early drops the `DatabaseTransaction`, which rolls back.

use std::sync::Arc;

use bursar_core::credential::verify_secret;
use bursar_core::ledger::{
    LedgerError, LedgerService, RecordRequest, TransferPlan, TransferRequest,
};
use bursar_shared::types::{PageRequest, PageResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{debug, info, warn};

use super::account::AccountRepository;
use crate::entities::{accounts, sea_orm_active_enums::TransactionStatus, transactions};
use crate::error::classify;

/// Ledger repository for money movement.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: Arc<DatabaseConnection>,
    lock_timeout_ms: u64,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    ///
    /// `lock_timeout_ms` bounds how long a unit of work waits for a row lock
    /// before failing with a retryable conflict. Zero is raised to 1ms, since
    /// Postgres reads a zero timeout as no bound at all.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, lock_timeout_ms: u64) -> Self {
        Self {
            db,
            lock_timeout_ms: if lock_timeout_ms == 0 { 1 } else { lock_timeout_ms },
        }
    }

    /// Starts a unit of work with a bounded lock wait.
    async fn begin_unit(&self) -> Result<DatabaseTransaction, LedgerError> {
        let txn = self.db.begin().await.map_err(classify)?;

        txn.execute_unprepared(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout_ms
        ))
        .await
        .map_err(classify)?;

        Ok(txn)
    }

    /// Moves funds immediately from one account to another.
    ///
    /// The sender authorizes with its secret. Both account rows are locked
    /// before any check runs.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `AccountNotFound`, `Unauthorized`,
    /// `InsufficientFunds`, `Conflict` or a database error. Nothing is
    /// written on error.
    pub async fn transfer(
        &self,
        request: TransferRequest,
    ) -> Result<transactions::Model, LedgerError> {
        LedgerService::validate_transfer(&request)?;

        let txn = self.begin_unit().await?;

        let (sender, receiver) =
            AccountRepository::lock_pair(&txn, &request.from_account, &request.to_account).await?;
        let sender = sender.as_ref().map(accounts::Model::snapshot);
        let receiver = receiver.as_ref().map(accounts::Model::snapshot);

        let plan = LedgerService::plan_transfer(
            &request,
            sender.as_ref(),
            receiver.as_ref(),
            verify_secret,
        )
        .inspect_err(|e| log_rejection(e, &request.from_account))?;

        Self::apply_plan(&txn, &plan).await?;

        let now = Utc::now().into();
        let transaction = transactions::ActiveModel {
            from_account: Set(request.from_account.clone()),
            to_account: Set(request.to_account.clone()),
            amount: Set(plan.amount),
            description: Set(request.description.clone()),
            status: Set(TransactionStatus::Completed),
            created_at: Set(now),
            validated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify)?;

        txn.commit().await.map_err(classify)?;

        info!(
            transaction_id = transaction.id,
            from = %transaction.from_account,
            to = %transaction.to_account,
            amount = %transaction.amount,
            "Transfer completed"
        );

        Ok(transaction)
    }

    /// Records a pending transaction. No funds move and no secret is needed.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `AccountNotFound` or a database error.
    pub async fn record_transaction(
        &self,
        request: RecordRequest,
    ) -> Result<transactions::Model, LedgerError> {
        LedgerService::validate_record(&request)?;

        for account_number in [&request.from_account, &request.to_account] {
            let exists = accounts::Entity::find_by_id(account_number.clone())
                .one(self.db.as_ref())
                .await
                .map_err(classify)?
                .is_some();
            if !exists {
                return Err(LedgerError::AccountNotFound(account_number.clone()));
            }
        }

        let transaction = transactions::ActiveModel {
            from_account: Set(request.from_account),
            to_account: Set(request.to_account),
            amount: Set(request.amount),
            description: Set(request.description),
            status: Set(TransactionStatus::Pending),
            created_at: Set(Utc::now().into()),
            validated_at: Set(None),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(classify)?;

        info!(
            transaction_id = transaction.id,
            from = %transaction.from_account,
            to = %transaction.to_account,
            amount = %transaction.amount,
            "Pending transaction recorded"
        );

        Ok(transaction)
    }

    /// Settles a pending transaction, authorized by the receiver's secret.
    ///
    /// The pending row is locked first, so a concurrent second validation
    /// waits, re-reads the row, no longer sees it pending and fails with
    /// `TransactionNotFound`. A rejected validation leaves the transaction
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `AccountNotFound`, `Unauthorized`,
    /// `InsufficientFunds`, `Conflict` or a database error.
    pub async fn validate_transaction(
        &self,
        transaction_id: i64,
        receiver_secret: &str,
    ) -> Result<transactions::Model, LedgerError> {
        let txn = self.begin_unit().await?;

        let pending = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(classify)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;
        let view = pending.pending_view();

        let (sender, receiver) =
            AccountRepository::lock_pair(&txn, &view.from_account, &view.to_account).await?;
        let sender = sender.as_ref().map(accounts::Model::snapshot);
        let receiver = receiver.as_ref().map(accounts::Model::snapshot);

        let plan = LedgerService::plan_settlement(
            &view,
            receiver_secret,
            sender.as_ref(),
            receiver.as_ref(),
            verify_secret,
        )
        .inspect_err(|e| log_rejection(e, &view.to_account))?;

        Self::apply_plan(&txn, &plan).await?;

        let mut active: transactions::ActiveModel = pending.into();
        active.status = Set(TransactionStatus::Completed);
        active.validated_at = Set(Some(Utc::now().into()));
        let transaction = active.update(&txn).await.map_err(classify)?;

        txn.commit().await.map_err(classify)?;

        info!(
            transaction_id = transaction.id,
            from = %transaction.from_account,
            to = %transaction.to_account,
            amount = %transaction.amount,
            "Pending transaction validated"
        );

        Ok(transaction)
    }

    /// Gets a transaction by ID, in any status.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if no such transaction exists.
    pub async fn get_transaction(
        &self,
        transaction_id: i64,
    ) -> Result<transactions::Model, LedgerError> {
        transactions::Entity::find_by_id(transaction_id)
            .one(self.db.as_ref())
            .await
            .map_err(classify)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))
    }

    /// Lists transactions where the account is sender or receiver, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn list_account_transactions(
        &self,
        account_number: &str,
        status: Option<TransactionStatus>,
        page: &PageRequest,
    ) -> Result<PageResponse<transactions::Model>, LedgerError> {
        let exists = accounts::Entity::find_by_id(account_number.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(classify)?
            .is_some();
        if !exists {
            return Err(LedgerError::AccountNotFound(account_number.to_string()));
        }

        let page = page.clamped();

        let mut query = transactions::Entity::find().filter(
            Condition::any()
                .add(transactions::Column::FromAccount.eq(account_number))
                .add(transactions::Column::ToAccount.eq(account_number)),
        );
        if let Some(status) = status {
            query = query.filter(transactions::Column::Status.eq(status));
        }

        let total = query.clone().count(self.db.as_ref()).await.map_err(classify)?;

        let data = query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .map_err(classify)?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Writes both sides of a plan through the balance mutation primitive.
    async fn apply_plan<C: ConnectionTrait>(conn: &C, plan: &TransferPlan) -> Result<(), LedgerError> {
        for change in [&plan.debit, &plan.credit] {
            let new_balance =
                AccountRepository::apply_delta(conn, &change.account_number, change.delta).await?;
            debug!(
                account_number = %change.account_number,
                previous = %change.previous_balance,
                new = %new_balance,
                "Balance updated"
            );
        }
        Ok(())
    }
}

/// Logs a rejected money movement at the level its kind deserves.
fn log_rejection(err: &LedgerError, account_number: &str) {
    match err {
        LedgerError::Unauthorized => {
            warn!(account_number = %account_number, "Secret verification failed");
        }
        LedgerError::InsufficientFunds { .. } => {
            info!(account_number = %account_number, error = %err, "Rejected for insufficient funds");
        }
        _ => debug!(account_number = %account_number, error = %err, "Rejected"),
    }
}
