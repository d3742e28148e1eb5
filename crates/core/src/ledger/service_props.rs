//! Property-based tests for LedgerService.
//!
//! - Property 1: Conservation of money
//! - Property 2: No overdraft
//! - Property 3: Deterministic lock order
//! - Property 4: Amount precision

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{AccountSnapshot, PendingTransaction, TransactionStatus, TransferRequest};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate balances including zero (0.00 to 10,000.00).
fn balance() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate account numbers in the generated format.
fn account_number() -> impl Strategy<Value = String> {
    (0u32..1_000_000_000u32).prop_map(|n| format!("ACC-{n:09}"))
}

/// Helper to create an account snapshot whose hash is the secret itself.
fn make_account(number: &str, balance: Decimal) -> AccountSnapshot {
    AccountSnapshot {
        account_number: number.to_string(),
        balance,
        secret_hash: format!("{number}-secret"),
    }
}

/// Mock verifier: the hash is the secret.
fn plain_verify(secret: &str, hash: &str) -> bool {
    secret == hash
}

fn make_transfer(from: &str, to: &str, amount: Decimal) -> TransferRequest {
    TransferRequest {
        from_account: from.to_string(),
        to_account: to.to_string(),
        amount,
        secret: format!("{from}-secret"),
        description: "prop".to_string(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 1: Conservation of money
    // =========================================================================

    /// Property 1.1: An accepted transfer leaves the pair's total unchanged.
    #[test]
    fn prop_transfer_conserves_total(
        sender_balance in balance(),
        receiver_balance in balance(),
        amount in positive_amount(),
    ) {
        prop_assume!(amount <= sender_balance);

        let sender = make_account("ACC-000000001", sender_balance);
        let receiver = make_account("ACC-000000002", receiver_balance);
        let request = make_transfer("ACC-000000001", "ACC-000000002", amount);

        let plan = LedgerService::plan_transfer(&request, Some(&sender), Some(&receiver), plain_verify)
            .unwrap();

        prop_assert!(plan.is_conserving());
        prop_assert_eq!(
            plan.debit.new_balance + plan.credit.new_balance,
            sender_balance + receiver_balance
        );
        prop_assert_eq!(plan.debit.new_balance, sender_balance - amount);
    }

    /// Property 1.2: A settlement moves exactly the recorded amount.
    #[test]
    fn prop_settlement_conserves_total(
        sender_balance in balance(),
        receiver_balance in balance(),
        amount in positive_amount(),
    ) {
        prop_assume!(amount <= sender_balance);

        let sender = make_account("ACC-000000001", sender_balance);
        let receiver = make_account("ACC-000000002", receiver_balance);
        let pending = PendingTransaction {
            id: 1,
            from_account: "ACC-000000001".to_string(),
            to_account: "ACC-000000002".to_string(),
            amount,
            status: TransactionStatus::Pending,
        };

        let plan = LedgerService::plan_settlement(
            &pending,
            "ACC-000000002-secret",
            Some(&sender),
            Some(&receiver),
            plain_verify,
        )
        .unwrap();

        prop_assert!(plan.is_conserving());
        prop_assert_eq!(plan.credit.delta, amount);
    }

    // =========================================================================
    // Property 2: No overdraft
    // =========================================================================

    /// Property 2.1: Any transfer larger than the balance is rejected.
    #[test]
    fn prop_overdraft_rejected(
        sender_balance in balance(),
        excess in positive_amount(),
    ) {
        let amount = sender_balance + excess;
        let sender = make_account("ACC-000000001", sender_balance);
        let receiver = make_account("ACC-000000002", Decimal::ZERO);
        let request = make_transfer("ACC-000000001", "ACC-000000002", amount);

        let result = LedgerService::plan_transfer(&request, Some(&sender), Some(&receiver), plain_verify);

        prop_assert!(
            matches!(result, Err(LedgerError::InsufficientFunds { .. })),
            "Overdraft should be rejected"
        );
    }

    /// Property 2.2: apply_delta never yields a negative balance.
    #[test]
    fn prop_apply_delta_never_negative(
        start in balance(),
        delta_cents in -2_000_000i64..2_000_000i64,
    ) {
        let delta = Decimal::new(delta_cents, 2);
        match LedgerService::apply_delta("ACC-000000001", start, delta) {
            Ok(change) => {
                prop_assert!(change.new_balance >= Decimal::ZERO);
                prop_assert_eq!(change.new_balance, start + delta);
            }
            Err(e) => {
                prop_assert!(start + delta < Decimal::ZERO);
                let is_insufficient = matches!(e, LedgerError::InsufficientFunds { .. });
                prop_assert!(is_insufficient);
            }
        }
    }

    /// Property 2.3: A wrong secret is rejected regardless of funds.
    #[test]
    fn prop_wrong_secret_rejected(
        sender_balance in balance(),
        amount in positive_amount(),
    ) {
        let sender = make_account("ACC-000000001", sender_balance);
        let receiver = make_account("ACC-000000002", Decimal::ZERO);
        let mut request = make_transfer("ACC-000000001", "ACC-000000002", amount);
        request.secret = "not-the-secret".to_string();

        let result = LedgerService::plan_transfer(&request, Some(&sender), Some(&receiver), plain_verify);
        prop_assert!(matches!(result, Err(LedgerError::Unauthorized)));
    }

    // =========================================================================
    // Property 3: Deterministic lock order
    // =========================================================================

    /// Property 3.1: Both directions between a pair lock in the same order.
    #[test]
    fn prop_lock_order_symmetric(
        a in account_number(),
        b in account_number(),
    ) {
        let forward = LedgerService::lock_order(&a, &b);
        let backward = LedgerService::lock_order(&b, &a);

        prop_assert_eq!(forward, backward);
        prop_assert!(forward[0] <= forward[1]);
    }

    // =========================================================================
    // Property 4: Amount precision
    // =========================================================================

    /// Property 4.1: Amounts with more than two decimals are rejected.
    #[test]
    fn prop_sub_cent_amounts_rejected(
        mills in 1i64..10_000_000i64,
    ) {
        prop_assume!(mills % 10 != 0);
        let amount = Decimal::new(mills, 3);
        prop_assert!(matches!(
            LedgerService::validate_amount(amount),
            Err(LedgerError::Validation(_))
        ));
    }
}
