//! Ledger domain types for transfers and pending transactions.
//!
//! Repositories load rows, turn them into these snapshots, and hand them to
//! [`LedgerService`](super::LedgerService) which decides what to write.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction status.
///
/// The only valid transition is Pending → Completed (validate). Immediate
/// transfers are born Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Recorded, funds not moved yet.
    Pending,
    /// Funds moved; terminal.
    Completed,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns true if the transaction can still be settled.
    #[must_use]
    pub fn is_settleable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account row as seen inside a unit of work.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    /// External account number.
    pub account_number: String,
    /// Current balance.
    pub balance: Decimal,
    /// Argon2id PHC string of the account secret.
    pub secret_hash: String,
}

/// Input for an immediate transfer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Account to debit.
    pub from_account: String,
    /// Account to credit.
    pub to_account: String,
    /// Amount to move.
    pub amount: Decimal,
    /// Sender's secret.
    pub secret: String,
    /// Free-text description.
    pub description: String,
}

/// Input for recording a pending transaction.
#[derive(Debug, Clone)]
pub struct RecordRequest {
    /// Account that will be debited on settlement.
    pub from_account: String,
    /// Account that will be credited on settlement.
    pub to_account: String,
    /// Amount to move on settlement.
    pub amount: Decimal,
    /// Free-text description.
    pub description: String,
}

/// A stored transaction awaiting settlement.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    /// Transaction ID.
    pub id: i64,
    /// Account to debit.
    pub from_account: String,
    /// Account to credit.
    pub to_account: String,
    /// Amount to move.
    pub amount: Decimal,
    /// Current status.
    pub status: TransactionStatus,
}

/// One side of a transfer: how a single balance moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    /// Account being changed.
    pub account_number: String,
    /// Balance before the change.
    pub previous_balance: Decimal,
    /// Signed delta (negative for a debit).
    pub delta: Decimal,
    /// Balance after the change.
    pub new_balance: Decimal,
}

/// The debit/credit pair a unit of work must write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Amount moved.
    pub amount: Decimal,
    /// Sender side.
    pub debit: BalanceChange,
    /// Receiver side.
    pub credit: BalanceChange,
}

impl TransferPlan {
    /// Returns true if the plan neither creates nor destroys money.
    #[must_use]
    pub fn is_conserving(&self) -> bool {
        self.debit.delta + self.credit.delta == Decimal::ZERO
            && self.debit.previous_balance + self.credit.previous_balance
                == self.debit.new_balance + self.credit.new_balance
    }
}
