//! Pending transaction routes: record, validate and lookup.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
    routing::{get, post},
};
use bursar_core::account::validate_account_number;
use bursar_core::ledger::{LedgerError, LedgerService, RecordRequest, TransactionStatus};
use bursar_db::entities::transactions;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiResult;

/// Creates the pending transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(record_transaction))
        .route("/transactions/{transaction_id}", get(get_transaction))
        .route(
            "/transactions/{transaction_id}/validate",
            post(validate_transaction),
        )
}

/// Request body for recording a pending transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    /// Account to debit on settlement.
    pub from_account: Option<String>,
    /// Account to credit on settlement.
    pub to_account: Option<String>,
    /// Amount to move on settlement.
    pub amount: Option<Decimal>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Request body for validating a pending transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTransactionRequest {
    /// The receiving account's secret.
    pub receiver_secret: Option<String>,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub transaction_id: i64,
    /// Debited account.
    pub from_account: String,
    /// Credited account.
    pub to_account: String,
    /// Amount moved (or to be moved).
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// `pending` or `completed`.
    pub status: TransactionStatus,
    /// When the transaction was recorded.
    pub created_at: DateTime<FixedOffset>,
    /// When funds moved; absent while pending.
    pub validated_at: Option<DateTime<FixedOffset>>,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        Self {
            transaction_id: model.id,
            from_account: model.from_account,
            to_account: model.to_account,
            amount: model.amount,
            description: model.description,
            status: model.status.into(),
            created_at: model.created_at,
            validated_at: model.validated_at,
        }
    }
}

/// POST /transactions
async fn record_transaction(
    State(state): State<AppState>,
    payload: Result<Json<RecordTransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let Json(payload) = payload?;

    let request = RecordRequest {
        from_account: validate_account_number(payload.from_account, "fromAccount")?,
        to_account: validate_account_number(payload.to_account, "toAccount")?,
        amount: payload
            .amount
            .ok_or_else(|| LedgerError::validation("amount is required"))?,
        description: payload.description.unwrap_or_default(),
    };

    let transaction = state.ledger().record_transaction(request).await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// POST /transactions/{transaction_id}/validate
async fn validate_transaction(
    State(state): State<AppState>,
    transaction_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ValidateTransactionRequest>, JsonRejection>,
) -> ApiResult<Json<TransactionResponse>> {
    let Path(transaction_id) = transaction_id?;
    let Json(payload) = payload?;

    let receiver_secret = LedgerService::require_field(payload.receiver_secret, "receiverSecret")?;

    let transaction = state
        .ledger()
        .validate_transaction(transaction_id, &receiver_secret)
        .await?;

    Ok(Json(transaction.into()))
}

/// GET /transactions/{transaction_id}
async fn get_transaction(
    State(state): State<AppState>,
    transaction_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<TransactionResponse>> {
    let Path(transaction_id) = transaction_id?;

    let transaction = state.ledger().get_transaction(transaction_id).await?;

    Ok(Json(transaction.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use bursar_db::entities::{accounts, sea_orm_active_enums::TransactionStatus, transactions};
    use chrono::{DateTime, FixedOffset};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::{Value, json};

    use crate::test_support::{empty_state, send, state_with, unit_of_work_db};

    fn timestamp() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-01-15T10:00:00+00:00").unwrap()
    }

    fn account(number: &str, balance: Decimal) -> accounts::Model {
        accounts::Model {
            account_number: number.to_string(),
            secret_hash: "$argon2id$placeholder".to_string(),
            balance,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn pending(id: i64) -> transactions::Model {
        transactions::Model {
            id,
            from_account: "ACC-000000001".to_string(),
            to_account: "ACC-000000002".to_string(),
            amount: dec!(200.00),
            description: "Course purchase".to_string(),
            status: TransactionStatus::Pending,
            created_at: timestamp(),
            validated_at: None,
        }
    }

    #[tokio::test]
    async fn test_record_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![account("ACC-000000001", dec!(700))],
                vec![account("ACC-000000002", dec!(300))],
            ])
            .append_query_results([vec![pending(1)]])
            .into_connection();

        let (status, body) = send(
            state_with(db),
            "POST",
            "/transactions",
            Some(json!({
                "fromAccount": "ACC-000000001",
                "toAccount": "ACC-000000002",
                "amount": 200,
                "description": "Course purchase"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["transactionId"], 1);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["amount"], "200.00");
        assert!(body["validatedAt"].is_null());
    }

    #[tokio::test]
    async fn test_record_transaction_unknown_receiver() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![account("ACC-000000001", dec!(700))],
                Vec::<accounts::Model>::new(),
            ])
            .into_connection();

        let (status, body) = send(
            state_with(db),
            "POST",
            "/transactions",
            Some(json!({
                "fromAccount": "ACC-000000001",
                "toAccount": "ACC-000000404",
                "amount": "10"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "ACCOUNT_NOT_FOUND");
    }

    #[rstest]
    #[case(json!({"toAccount": "B", "amount": 10}))]
    #[case(json!({"fromAccount": "A", "amount": 10}))]
    #[case(json!({"fromAccount": "A", "toAccount": "B"}))]
    #[case(json!({"fromAccount": "A", "toAccount": "B", "amount": 0}))]
    #[case(json!({"fromAccount": "A", "toAccount": "A", "amount": 10}))]
    #[tokio::test]
    async fn test_record_transaction_rejects_bad_input(#[case] payload: Value) {
        let (status, body) = send(empty_state(), "POST", "/transactions", Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validate_requires_receiver_secret() {
        let (status, body) =
            send(empty_state(), "POST", "/transactions/1/validate", Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validate_rejects_non_numeric_id() {
        let (status, body) = send(
            empty_state(),
            "POST",
            "/transactions/abc/validate",
            Some(json!({"receiverSecret": "s2"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validate_settled_or_unknown_transaction() {
        let db = unit_of_work_db()
            .append_query_results([Vec::<transactions::Model>::new()])
            .into_connection();

        let (status, body) = send(
            state_with(db),
            "POST",
            "/transactions/42/validate",
            Some(json!({"receiverSecret": "s2"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "TRANSACTION_NOT_FOUND");
        assert_eq!(body["message"], "Transaction 42 not found or already processed");
    }

    #[tokio::test]
    async fn test_validate_with_wrong_secret() {
        let mut sender = account("ACC-000000001", dec!(700));
        let mut receiver = account("ACC-000000002", dec!(300));
        sender.secret_hash = bursar_core::credential::hash_secret("s1").unwrap();
        receiver.secret_hash = bursar_core::credential::hash_secret("s2").unwrap();

        let db = unit_of_work_db()
            .append_query_results([vec![pending(5)]])
            .append_query_results([vec![sender], vec![receiver]])
            .into_connection();

        // Sender's secret cannot settle
        let (status, body) = send(
            state_with(db),
            "POST",
            "/transactions/5/validate",
            Some(json!({"receiverSecret": "s1"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "INVALID_SECRET");
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn test_validate_with_insufficient_funds() {
        let mut sender = account("ACC-000000001", dec!(100));
        let mut receiver = account("ACC-000000002", dec!(300));
        sender.secret_hash = bursar_core::credential::hash_secret("s1").unwrap();
        receiver.secret_hash = bursar_core::credential::hash_secret("s2").unwrap();

        let db = unit_of_work_db()
            .append_query_results([vec![pending(5)]])
            .append_query_results([vec![sender], vec![receiver]])
            .into_connection();

        let (status, body) = send(
            state_with(db),
            "POST",
            "/transactions/5/validate",
            Some(json!({"receiverSecret": "s2"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INSUFFICIENT_FUNDS");
        assert_eq!(body["retryable"], false);
        assert_eq!(body["message"], "Insufficient balance in account ACC-000000001");
    }

    #[tokio::test]
    async fn test_get_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending(3)]])
            .into_connection();

        let (status, body) = send(state_with(db), "GET", "/transactions/3", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactionId"], 3);
        assert_eq!(body["fromAccount"], "ACC-000000001");
        assert_eq!(body["description"], "Course purchase");
    }
}
