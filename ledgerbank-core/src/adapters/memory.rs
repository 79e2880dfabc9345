//! In-memory account store for service tests
//!
//! Mirrors the durable store's semantics - the sufficiency check and the
//! balance mutation happen under one lock, and a failed apply leaves no
//! ledger row behind - so service tests exercise the same outcomes without
//! a database. Not a production code path.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountStatus, AccountType, LedgerEntry, NewAccount, NewTransaction,
    PostedTransaction, TransactionType,
};
use crate::ports::AccountRepository;

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    ledger: Vec<LedgerEntry>,
    fail_with: Option<String>,
}

/// In-memory `AccountRepository` double with failure injection
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `Unexpected(msg)`,
    /// simulating a lost connection or commit failure
    pub fn fail_with(&self, msg: &str) {
        self.state.lock().unwrap().fail_with = Some(msg.to_string());
    }

    /// Total committed ledger rows across all accounts
    pub fn ledger_len(&self) -> usize {
        self.state.lock().unwrap().ledger.len()
    }
}

fn check_failure(state: &State) -> Result<()> {
    match &state.fail_with {
        Some(msg) => Err(Error::unexpected(msg.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn create_account(&self, account: &NewAccount) -> Result<Uuid> {
        let mut state = self.state.lock().unwrap();
        check_failure(&state)?;

        // Same outcome the durable store's conditional insert produces
        let duplicate = state.accounts.values().any(|a| {
            a.customer_id == account.customer_id
                && a.account_type == account.account_type
                && a.status == AccountStatus::Active
        });
        if duplicate {
            return Err(Error::validation(format!(
                "customer already has a {} account",
                account.account_type
            )));
        }

        let account_id = Uuid::new_v4();
        state.accounts.insert(
            account_id,
            Account {
                account_id,
                customer_id: account.customer_id.clone(),
                opening_date: Utc::now(),
                account_type: account.account_type,
                balance: account.opening_balance,
                status: AccountStatus::Active,
            },
        );
        Ok(account_id)
    }

    async fn accounts_by_customer(&self, customer_id: &str) -> Result<Vec<Account>> {
        let state = self.state.lock().unwrap();
        check_failure(&state)?;
        Ok(state
            .accounts
            .values()
            .filter(|a| a.customer_id == customer_id && a.status == AccountStatus::Active)
            .cloned()
            .collect())
    }

    async fn account_by_id(&self, account_id: Uuid) -> Result<Account> {
        let state = self.state.lock().unwrap();
        check_failure(&state)?;
        state
            .accounts
            .get(&account_id)
            .filter(|a| a.status == AccountStatus::Active)
            .cloned()
            .ok_or_else(|| Error::not_found("account not found"))
    }

    async fn delete_account(&self, customer_id: &str, account_type: AccountType) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        check_failure(&state)?;

        let target = state.accounts.values_mut().find(|a| {
            a.customer_id == customer_id
                && a.account_type == account_type
                && a.status == AccountStatus::Active
        });

        match target {
            Some(account) => {
                // The row and its ledger stay as audit history
                account.status = AccountStatus::Closed;
                Ok(())
            }
            None => Err(Error::not_found(format!(
                "no {account_type} account for customer {customer_id}"
            ))),
        }
    }

    async fn apply_transaction(&self, tx: &NewTransaction) -> Result<PostedTransaction> {
        let mut state = self.state.lock().unwrap();
        check_failure(&state)?;

        if tx.amount < Decimal::ZERO {
            return Err(Error::validation("amount cannot be negative"));
        }

        let account = state
            .accounts
            .get_mut(&tx.account_id)
            .filter(|a| a.status == AccountStatus::Active)
            .ok_or_else(|| Error::not_found("account not found"))?;

        let balance = match tx.transaction_type {
            TransactionType::Deposit => account.balance + tx.amount,
            TransactionType::Withdrawal => {
                if account.balance < tx.amount {
                    return Err(Error::validation("insufficient balance"));
                }
                account.balance - tx.amount
            }
        };
        account.balance = balance;

        let entry = LedgerEntry {
            transaction_id: Uuid::new_v4(),
            account_id: tx.account_id,
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            transaction_date: Utc::now(),
        };
        state.ledger.push(entry.clone());

        Ok(PostedTransaction { entry, balance })
    }

    async fn ledger_by_account(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let state = self.state.lock().unwrap();
        check_failure(&state)?;
        Ok(state
            .ledger
            .iter()
            .rev()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }
}
