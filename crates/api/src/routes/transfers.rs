//! Immediate transfer route.

use axum::{
    Json, Router, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    routing::post,
};
use bursar_core::account::validate_account_number;
use bursar_core::ledger::{LedgerError, LedgerService, TransferRequest};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::transactions::TransactionResponse;
use crate::AppState;
use crate::error::ApiResult;

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transfers", post(transfer))
}

/// Request body for an immediate transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    /// Account to debit.
    pub from_account: Option<String>,
    /// Account to credit.
    pub to_account: Option<String>,
    /// Amount to move.
    pub amount: Option<Decimal>,
    /// The sending account's secret.
    pub secret: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// POST /transfers
async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let Json(payload) = payload?;

    let request = TransferRequest {
        from_account: validate_account_number(payload.from_account, "fromAccount")?,
        to_account: validate_account_number(payload.to_account, "toAccount")?,
        amount: payload
            .amount
            .ok_or_else(|| LedgerError::validation("amount is required"))?,
        secret: LedgerService::require_field(payload.secret, "secret")?,
        description: payload.description.unwrap_or_default(),
    };

    let transaction = state.ledger().transfer(request).await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}
