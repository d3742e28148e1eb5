//! Account ledger and transfer logic.
//!
//! This module implements the core ledger functionality:
//! - Domain types for transfers and pending transactions
//! - Error types for ledger operations
//! - Ledger service for transfer and settlement decisions

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::{AMOUNT_SCALE, LedgerService, MAX_AMOUNT};
pub use types::{
    AccountSnapshot, BalanceChange, PendingTransaction, RecordRequest, TransactionStatus,
    TransferPlan, TransferRequest,
};
