//! Stateless request validation
//!
//! Pure predicate evaluation, first violated rule wins, no I/O. Balance
//! sufficiency is deliberately absent here: it needs a fresh read, so the
//! service owns the fast-path check and the store's atomic apply is the
//! authoritative one.

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{minimum_opening_deposit, AccountType, TransactionType};

use super::account::{CreateAccountRequest, TransactionRequest};

/// Rules for opening an account: funding minimum first, then a known
/// account type (case-insensitive)
pub fn validate_create_account(req: &CreateAccountRequest) -> Result<AccountType> {
    if req.amount < minimum_opening_deposit() {
        return Err(Error::validation("minimum funding not met"));
    }
    req.account_type.parse()
}

/// Rules for a deposit/withdrawal request: known transaction type first,
/// then a non-negative amount
pub fn validate_transaction(req: &TransactionRequest) -> Result<TransactionType> {
    let transaction_type: TransactionType = req.transaction_type.parse()?;
    if req.amount < Decimal::ZERO {
        return Err(Error::validation("amount cannot be negative"));
    }
    Ok(transaction_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(account_type: &str, amount: Decimal) -> CreateAccountRequest {
        CreateAccountRequest {
            customer_id: "2000".to_string(),
            account_type: account_type.to_string(),
            amount,
        }
    }

    fn transaction_request(transaction_type: &str, amount: Decimal) -> TransactionRequest {
        TransactionRequest {
            account_id: "c6c8f4ae-7c9f-4d5a-8df6-3a4b9d3d5a10".to_string(),
            transaction_type: transaction_type.to_string(),
            amount,
        }
    }

    #[test]
    fn opening_below_the_funding_minimum_fails() {
        let err = validate_create_account(&create_request("checking", Decimal::new(499_999, 2)))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "minimum funding not met"));
    }

    #[test]
    fn opening_at_the_funding_minimum_succeeds() {
        let account_type =
            validate_create_account(&create_request("checking", Decimal::new(5_000, 0))).unwrap();
        assert_eq!(account_type, AccountType::Checking);
    }

    #[test]
    fn unknown_account_type_fails_regardless_of_amount() {
        let err = validate_create_account(&create_request("brokerage", Decimal::new(1_000_000, 0)))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "invalid account type"));
    }

    #[test]
    fn funding_rule_is_checked_before_the_type_rule() {
        let err =
            validate_create_account(&create_request("brokerage", Decimal::new(100, 0))).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "minimum funding not met"));
    }

    #[test]
    fn account_type_is_accepted_case_insensitively() {
        let account_type =
            validate_create_account(&create_request("SAVING", Decimal::new(5_000, 0))).unwrap();
        assert_eq!(account_type, AccountType::Saving);
    }

    #[test]
    fn unknown_transaction_type_fails() {
        let err =
            validate_transaction(&transaction_request("transfer", Decimal::new(100, 0))).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "invalid transaction type"));
    }

    #[test]
    fn type_rule_is_checked_before_the_amount_rule() {
        let err =
            validate_transaction(&transaction_request("transfer", Decimal::new(-100, 0))).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "invalid transaction type"));
    }

    #[test]
    fn negative_amount_fails() {
        let err =
            validate_transaction(&transaction_request("deposit", Decimal::new(-1, 2))).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "amount cannot be negative"));
    }

    #[test]
    fn zero_amount_is_allowed() {
        let transaction_type =
            validate_transaction(&transaction_request("withdrawal", Decimal::ZERO)).unwrap();
        assert_eq!(transaction_type, TransactionType::Withdrawal);
    }
}
