//! `SeaORM` active enums mapped to Postgres enum types.

use bursar_core::ledger::TransactionStatus as LedgerStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<LedgerStatus> for TransactionStatus {
    fn from(status: LedgerStatus) -> Self {
        match status {
            LedgerStatus::Pending => Self::Pending,
            LedgerStatus::Completed => Self::Completed,
        }
    }
}

impl From<TransactionStatus> for LedgerStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Completed => Self::Completed,
        }
    }
}
