//! `SeaORM` Entity for transactions table.

use bursar_core::ledger::PendingTransaction;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub from_account: String,
    pub to_account: String,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub amount: Decimal,
    pub description: String,
    pub status: TransactionStatus,
    pub created_at: DateTimeWithTimeZone,
    pub validated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccount",
        to = "super::accounts::Column::AccountNumber"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ToAccount",
        to = "super::accounts::Column::AccountNumber"
    )]
    ToAccount,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the view of this row the settlement rules operate on.
    #[must_use]
    pub fn pending_view(&self) -> PendingTransaction {
        PendingTransaction {
            id: self.id,
            from_account: self.from_account.clone(),
            to_account: self.to_account.clone(),
            amount: self.amount,
            status: self.status.into(),
        }
    }
}
