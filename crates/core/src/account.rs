//! Account creation rules.
//!
//! Account numbers are a configurable prefix plus a nine-digit random
//! suffix. Uniqueness is enforced by storage; callers draw a fresh number and
//! retry when an insert collides.

use rand::Rng;
use rust_decimal::Decimal;

use crate::ledger::{LedgerError, LedgerService};

/// Number of digits in the random suffix of an account number.
pub const ACCOUNT_SUFFIX_DIGITS: usize = 9;

const SUFFIX_RANGE: u32 = 1_000_000_000;

/// Validated input for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Plain secret, hashed before storage.
    pub secret: String,
    /// Opening balance.
    pub initial_balance: Decimal,
}

/// Draws a new account number such as `ACC-004213977`.
///
/// # Example
///
/// ```
/// use bursar_core::account::generate_account_number;
///
/// let number = generate_account_number("ACC", &mut rand::rng());
/// assert!(number.starts_with("ACC-"));
/// assert_eq!(number.len(), 13);
/// ```
pub fn generate_account_number<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let suffix = rng.random_range(0..SUFFIX_RANGE);
    format!("{prefix}-{suffix:0width$}", width = ACCOUNT_SUFFIX_DIGITS)
}

/// Validates the input for account creation.
///
/// The secret must be present and not blank. The opening balance falls back
/// to `default_balance`; zero is allowed, negatives and sub-cent values are
/// not.
///
/// # Errors
///
/// Returns `LedgerError::Validation` describing the first broken rule.
pub fn validate_new_account(
    secret: Option<String>,
    initial_balance: Option<Decimal>,
    default_balance: Decimal,
) -> Result<NewAccount, LedgerError> {
    let secret = LedgerService::require_field(secret, "secret")?;
    let initial_balance = initial_balance.unwrap_or(default_balance);

    if initial_balance < Decimal::ZERO {
        return Err(LedgerError::validation("Initial balance cannot be negative"));
    }
    LedgerService::validate_scale(initial_balance, "Initial balance")?;

    Ok(NewAccount {
        secret,
        initial_balance,
    })
}

/// Validates an account number supplied by a caller.
///
/// Lookups accept any non-blank number so that hand-assigned numbers (such as
/// the organization account) resolve like generated ones.
///
/// # Errors
///
/// Returns `LedgerError::Validation` if the number is missing or blank.
pub fn validate_account_number(number: Option<String>, field: &str) -> Result<String, LedgerError> {
    LedgerService::require_field(number, field).map(|n| n.trim().to_string())
}
