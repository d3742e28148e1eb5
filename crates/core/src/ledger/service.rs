//! Ledger service for transfer and settlement decisions.
//!
//! This module provides the core business logic for moving money between
//! accounts. It never touches storage: callers lock and load the rows, pass
//! snapshots in, and persist the returned [`TransferPlan`] inside the same
//! unit of work.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{
    AccountSnapshot, BalanceChange, PendingTransaction, RecordRequest, TransferPlan,
    TransferRequest,
};

/// Maximum number of fractional digits in a monetary amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount or balance the ledger stores (`NUMERIC(18,2)`).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 2);

/// Ledger service for transfer validation and planning.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Returns the value of a required text field, rejecting missing or blank input.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` naming the field.
    pub fn require_field(value: Option<String>, field: &str) -> Result<String, LedgerError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(LedgerError::validation(format!("{field} is required"))),
        }
    }

    /// Validates a monetary amount: strictly positive, at most two
    /// fractional digits, within storage range.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if any rule is broken.
    pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::validation("Amount must be positive"));
        }
        Self::validate_scale(amount, "Amount")?;
        Ok(amount)
    }

    /// Validates that a value fits the ledger's decimal column.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the value has too many
    /// fractional digits or exceeds [`MAX_AMOUNT`].
    pub fn validate_scale(value: Decimal, what: &str) -> Result<(), LedgerError> {
        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(LedgerError::validation(format!(
                "{what} must have at most {AMOUNT_SCALE} decimal places"
            )));
        }
        if value.abs() > MAX_AMOUNT {
            return Err(LedgerError::validation(format!("{what} exceeds {MAX_AMOUNT}")));
        }
        Ok(())
    }

    /// Validates the two parties of a money movement.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the sender and receiver are the
    /// same account.
    pub fn validate_parties(from_account: &str, to_account: &str) -> Result<(), LedgerError> {
        if from_account == to_account {
            return Err(LedgerError::validation(
                "Sender and receiver must be different accounts",
            ));
        }
        Ok(())
    }

    /// Validates an immediate transfer before any row is touched.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` on malformed input.
    pub fn validate_transfer(request: &TransferRequest) -> Result<(), LedgerError> {
        Self::validate_amount(request.amount)?;
        Self::validate_parties(&request.from_account, &request.to_account)?;
        if request.secret.is_empty() {
            return Err(LedgerError::validation("secret is required"));
        }
        Ok(())
    }

    /// Validates a pending-transaction record before any row is touched.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` on malformed input.
    pub fn validate_record(request: &RecordRequest) -> Result<(), LedgerError> {
        Self::validate_amount(request.amount)?;
        Self::validate_parties(&request.from_account, &request.to_account)
    }

    /// Returns the order in which two account rows must be locked.
    ///
    /// Every unit of work locks accounts in ascending account-number order,
    /// so two transfers moving money in opposite directions between the same
    /// pair queue up instead of deadlocking.
    #[must_use]
    pub fn lock_order<'a>(a: &'a str, b: &'a str) -> [&'a str; 2] {
        if a <= b { [a, b] } else { [b, a] }
    }

    /// Applies a signed delta to a balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientFunds` if the result would be
    /// negative, `LedgerError::Validation` if it would leave storage range.
    pub fn apply_delta(
        account_number: &str,
        balance: Decimal,
        delta: Decimal,
    ) -> Result<BalanceChange, LedgerError> {
        let new_balance = balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::validation("Balance overflow"))?;

        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds {
                account: account_number.to_string(),
                balance,
                requested: -delta,
            });
        }
        if new_balance > MAX_AMOUNT {
            return Err(LedgerError::validation(format!(
                "Balance of account {account_number} would exceed {MAX_AMOUNT}"
            )));
        }

        Ok(BalanceChange {
            account_number: account_number.to_string(),
            previous_balance: balance,
            delta,
            new_balance,
        })
    }

    /// Decides an immediate transfer against locked snapshots.
    ///
    /// Checks run in this order, and the first failure wins:
    /// 1. Sender exists
    /// 2. Secret matches the sender's credential
    /// 3. Sender balance covers the amount
    /// 4. Receiver exists
    ///
    /// # Arguments
    ///
    /// * `request` - A request that already passed [`Self::validate_transfer`]
    /// * `sender` - The locked sender row, if it exists
    /// * `receiver` - The locked receiver row, if it exists
    /// * `verify` - Secret verifier, called as `verify(secret, hash)`
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `Unauthorized` or `InsufficientFunds`.
    pub fn plan_transfer<V>(
        request: &TransferRequest,
        sender: Option<&AccountSnapshot>,
        receiver: Option<&AccountSnapshot>,
        verify: V,
    ) -> Result<TransferPlan, LedgerError>
    where
        V: FnOnce(&str, &str) -> bool,
    {
        // 1. Sender exists
        let sender =
            sender.ok_or_else(|| LedgerError::AccountNotFound(request.from_account.clone()))?;

        // 2. Sender authorizes
        if !verify(&request.secret, &sender.secret_hash) {
            return Err(LedgerError::Unauthorized);
        }

        // 3. Funds check
        Self::ensure_funds(sender, request.amount)?;

        // 4. Receiver exists
        let receiver =
            receiver.ok_or_else(|| LedgerError::AccountNotFound(request.to_account.clone()))?;

        Self::build_plan(sender, receiver, request.amount)
    }

    /// Decides the settlement of a pending transaction against locked snapshots.
    ///
    /// Checks run in this order, and the first failure wins:
    /// 1. Transaction is still pending
    /// 2. Receiver exists
    /// 3. Secret matches the **receiver's** credential
    /// 4. Sender exists and its current balance covers the amount
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `AccountNotFound`, `Unauthorized` or
    /// `InsufficientFunds`.
    pub fn plan_settlement<V>(
        pending: &PendingTransaction,
        receiver_secret: &str,
        sender: Option<&AccountSnapshot>,
        receiver: Option<&AccountSnapshot>,
        verify: V,
    ) -> Result<TransferPlan, LedgerError>
    where
        V: FnOnce(&str, &str) -> bool,
    {
        if !pending.status.is_settleable() {
            return Err(LedgerError::TransactionNotFound(pending.id));
        }

        let receiver =
            receiver.ok_or_else(|| LedgerError::AccountNotFound(pending.to_account.clone()))?;

        if !verify(receiver_secret, &receiver.secret_hash) {
            return Err(LedgerError::Unauthorized);
        }

        let sender =
            sender.ok_or_else(|| LedgerError::AccountNotFound(pending.from_account.clone()))?;
        Self::ensure_funds(sender, pending.amount)?;

        Self::build_plan(sender, receiver, pending.amount)
    }

    fn ensure_funds(sender: &AccountSnapshot, amount: Decimal) -> Result<(), LedgerError> {
        if sender.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: sender.account_number.clone(),
                balance: sender.balance,
                requested: amount,
            });
        }
        Ok(())
    }

    fn build_plan(
        sender: &AccountSnapshot,
        receiver: &AccountSnapshot,
        amount: Decimal,
    ) -> Result<TransferPlan, LedgerError> {
        let debit = Self::apply_delta(&sender.account_number, sender.balance, -amount)?;
        let credit = Self::apply_delta(&receiver.account_number, receiver.balance, amount)?;

        Ok(TransferPlan {
            amount,
            debit,
            credit,
        })
    }
}
