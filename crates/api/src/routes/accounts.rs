//! Account routes: creation, balance lookup and history.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    routing::{get, post},
};
use bursar_core::account::{validate_account_number, validate_new_account};
use bursar_core::credential::hash_secret;
use bursar_core::ledger::TransactionStatus;
use bursar_db::CreateAccountInput;
use bursar_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transactions::TransactionResponse;
use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{account_number}/balance", get(get_balance))
        .route("/accounts/{account_number}/transactions", get(list_transactions))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Authorization secret for the new account.
    pub secret: Option<String>,
    /// Opening balance; the configured default when absent.
    pub initial_balance: Option<Decimal>,
}

/// Response for an account balance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Account number.
    pub account_number: String,
    /// Current balance.
    pub balance: Decimal,
}

/// Query parameters for account history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Filter by status: `pending` or `completed`.
    pub status: Option<String>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Items per page (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// POST /accounts
async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BalanceResponse>)> {
    let Json(payload) = payload?;

    let account = validate_new_account(
        payload.secret,
        payload.initial_balance,
        state.ledger_config.default_initial_balance,
    )?;

    let secret_hash =
        hash_secret(&account.secret).map_err(|e| ApiError::internal(e.to_string()))?;

    let created = state
        .accounts()
        .create_account(
            CreateAccountInput {
                secret_hash,
                initial_balance: account.initial_balance,
            },
            &state.ledger_config,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BalanceResponse {
            account_number: created.account_number,
            balance: created.balance,
        }),
    ))
}

/// GET /accounts/{account_number}/balance
async fn get_balance(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    let account_number = validate_account_number(Some(account_number), "accountNumber")?;
    let balance = state.accounts().get_balance(&account_number).await?;

    Ok(Json(BalanceResponse {
        account_number,
        balance,
    }))
}

/// GET /accounts/{account_number}/transactions
async fn list_transactions(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<PageResponse<TransactionResponse>>> {
    let Query(query) = query?;
    let account_number = validate_account_number(Some(account_number), "accountNumber")?;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            TransactionStatus::parse(s).ok_or_else(|| {
                ApiError::validation(format!(
                    "Invalid status '{s}'. Must be one of: pending, completed"
                ))
            })
        })
        .transpose()?;

    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let history = state
        .ledger()
        .list_account_transactions(&account_number, status.map(Into::into), &page)
        .await?;

    Ok(Json(history.map(TransactionResponse::from)))
}
