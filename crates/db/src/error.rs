//! Classification of database errors into ledger errors.
//!
//! Lock contention (lock wait timeout, detected deadlock, serialization
//! failure) and connection pool exhaustion are retryable and surface as
//! `LedgerError::Conflict`. Everything else is a storage fault.

use bursar_core::ledger::LedgerError;
use sea_orm::{ConnAcquireErr, DbErr, RuntimeErr, SqlErr};

/// SQLSTATE for `lock_not_available` (raised when `lock_timeout` expires).
pub const LOCK_NOT_AVAILABLE: &str = "55P03";

/// SQLSTATE for `deadlock_detected`.
pub const DEADLOCK_DETECTED: &str = "40P01";

/// SQLSTATE for `serialization_failure`.
pub const SERIALIZATION_FAILURE: &str = "40001";

/// Extracts the Postgres SQLSTATE code from a database error, if any.
pub fn sqlstate(err: &DbErr) -> Option<String> {
    let (DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime)) = err else {
        return None;
    };
    let RuntimeErr::SqlxError(sqlx_err) = runtime else {
        return None;
    };

    database_code(sqlx_err)
}

fn database_code(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code.into_owned())
}

/// Returns the retry reason for a contention SQLSTATE, or `None` if the code
/// is not a contention failure.
pub fn contention_reason(code: &str) -> Option<&'static str> {
    match code {
        LOCK_NOT_AVAILABLE => Some("Timed out waiting for an account lock"),
        DEADLOCK_DETECTED => Some("Deadlock detected"),
        SERIALIZATION_FAILURE => Some("Concurrent update detected"),
        _ => None,
    }
}

/// Returns true if the error is a unique-constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Converts a database error into the ledger taxonomy.
pub fn classify(err: DbErr) -> LedgerError {
    if let DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) = err {
        return LedgerError::Conflict("Timed out waiting for a database connection".to_string());
    }

    if let Some(reason) = sqlstate(&err).as_deref().and_then(contention_reason) {
        return LedgerError::Conflict(reason.to_string());
    }

    LedgerError::Database(err.to_string())
}
