//! Ledger error types.
//!
//! One taxonomy covers every failure a ledger operation can report:
//! malformed input, unknown accounts or transactions, a secret mismatch,
//! a business-rule rejection for insufficient funds, lock contention, and
//! storage faults.

use bursar_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    // ========== Lookup Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Transaction not found, or not in a state the operation accepts.
    #[error("Transaction not found or already processed: {0}")]
    TransactionNotFound(i64),

    // ========== Authorization Errors ==========
    /// Presented secret does not match the account's credential.
    #[error("Invalid secret")]
    Unauthorized,

    // ========== Business Rule Errors ==========
    /// A debit would drive the balance below zero.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The account being debited.
        account: String,
        /// Balance at the time of the check.
        balance: Decimal,
        /// Amount that was requested.
        requested: Decimal,
    },

    // ========== Concurrency Errors ==========
    /// Lock wait timed out, deadlock detected, or a concurrent update won.
    #[error("Concurrent modification detected, please retry: {0}")]
    Conflict(String),

    // ========== Storage Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Unauthorized => "INVALID_SECRET",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - caller bug or business rule rejection
            Self::Validation(_) | Self::InsufficientFunds { .. } => 400,

            // 401 Unauthorized - secret mismatch
            Self::Unauthorized => 401,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TransactionNotFound(_) => 404,

            // 409 Conflict - lock contention, safe to retry
            Self::Conflict(_) => 409,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => Self::Validation(msg),
            LedgerError::AccountNotFound(account) => {
                Self::NotFound(format!("Account {account} not found"))
            }
            LedgerError::TransactionNotFound(id) => {
                Self::NotFound(format!("Transaction {id} not found or already processed"))
            }
            LedgerError::Unauthorized => Self::Unauthorized("Invalid secret".to_string()),
            LedgerError::InsufficientFunds { account, .. } => {
                Self::InsufficientFunds(format!("Insufficient balance in account {account}"))
            }
            LedgerError::Conflict(msg) => Self::Conflict(msg),
            LedgerError::Database(msg) => Self::Database(msg),
            LedgerError::Internal(msg) => Self::Internal(msg),
        }
    }
}
