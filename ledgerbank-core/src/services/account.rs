//! Account service
//!
//! The four public operations: open an account, list a customer's
//! accounts, close an account, and post a deposit or withdrawal. The
//! service orchestrates validation and the repository port; all durable
//! state changes happen behind `AccountRepository`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountStatus, AccountType, NewAccount, NewTransaction, PostedTransaction,
    TransactionType,
};
use crate::ports::AccountRepository;

use super::validation;

/// Request to open a new account
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub customer_id: String,
    pub account_type: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub account_id: Uuid,
}

/// Read projection of an account, as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub account_id: Uuid,
    pub customer_id: String,
    pub opening_date: DateTime<Utc>,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub status: AccountStatus,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            customer_id: account.customer_id,
            opening_date: account.opening_date,
            account_type: account.account_type,
            balance: account.balance,
            status: account.status,
        }
    }
}

/// Request to post a deposit or withdrawal against an account
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    pub account_id: String,
    pub amount: Decimal,
    pub transaction_type: String,
}

/// Outcome of a committed transaction, including the balance it produced
#[derive(Debug, Serialize)]
pub struct TransactionReceipt {
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
    #[serde(rename = "new_balance")]
    pub balance: Decimal,
}

impl From<PostedTransaction> for TransactionReceipt {
    fn from(posted: PostedTransaction) -> Self {
        Self {
            transaction_id: posted.entry.transaction_id,
            account_id: posted.entry.account_id,
            amount: posted.entry.amount,
            transaction_type: posted.entry.transaction_type,
            transaction_date: posted.entry.transaction_date,
            balance: posted.balance,
        }
    }
}

/// Service for account lifecycle and transaction processing
pub struct AccountService {
    repository: Arc<dyn AccountRepository>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn AccountRepository>) -> Self {
        Self { repository }
    }

    /// Open a new account for a customer
    ///
    /// A customer may hold at most one open account of each type, and the
    /// opening deposit must meet the funding minimum.
    pub async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<CreateAccountResponse> {
        let existing = self
            .repository
            .accounts_by_customer(&request.customer_id)
            .await?;
        if let Ok(requested) = request.account_type.parse::<AccountType>() {
            if existing.iter().any(|a| a.account_type == requested) {
                return Err(Error::validation(format!(
                    "customer already has a {requested} account"
                )));
            }
        }

        let account_type = validation::validate_create_account(&request)?;

        let account = NewAccount::new(request.customer_id.clone(), account_type, request.amount);
        let account_id = self.repository.create_account(&account).await?;
        info!(%account_id, customer_id = %request.customer_id, %account_type, "account opened");
        Ok(CreateAccountResponse { account_id })
    }

    /// List all accounts held by a customer (possibly none)
    pub async fn get_accounts(&self, customer_id: &str) -> Result<Vec<AccountView>> {
        let accounts = self.repository.accounts_by_customer(customer_id).await?;
        Ok(accounts.into_iter().map(AccountView::from).collect())
    }

    /// Look up a single account by its id
    pub async fn get_account(&self, account_id: &str) -> Result<AccountView> {
        let account_id = parse_account_id(account_id)?;
        let account = self.repository.account_by_id(account_id).await?;
        Ok(AccountView::from(account))
    }

    /// Close a customer's account of the given type
    ///
    /// Only an account carrying a zero balance can be closed; its ledger
    /// history remains readable afterwards.
    pub async fn delete_account(&self, customer_id: &str, account_type: &str) -> Result<()> {
        let account_type: AccountType = account_type.parse()?;

        let accounts = self.repository.accounts_by_customer(customer_id).await?;
        if let Some(account) = accounts.iter().find(|a| a.account_type == account_type) {
            if !account.is_closable() {
                return Err(Error::validation("account balance must be zero to close"));
            }
        }

        self.repository
            .delete_account(customer_id, account_type)
            .await?;
        info!(customer_id, %account_type, "account closed");
        Ok(())
    }

    /// Post a deposit or withdrawal and return the receipt
    pub async fn make_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionReceipt> {
        let transaction_type = validation::validate_transaction(&request)?;
        let account_id = parse_account_id(&request.account_id)?;

        // Fast-path sufficiency check against a fresh read. The store
        // re-checks inside its atomic apply, which is the authoritative
        // serialization point under concurrency.
        if transaction_type.is_withdrawal() {
            let account = self.repository.account_by_id(account_id).await?;
            if !account.can_withdraw(request.amount) {
                return Err(Error::validation("insufficient balance"));
            }
        }

        let transaction = NewTransaction {
            account_id,
            amount: request.amount,
            transaction_type,
        };
        let posted = self.repository.apply_transaction(&transaction).await?;
        debug!(
            transaction_id = %posted.entry.transaction_id,
            %account_id,
            %transaction_type,
            "transaction committed"
        );
        Ok(TransactionReceipt::from(posted))
    }

    /// Read the full transaction history of an account, newest first
    ///
    /// Each receipt carries the balance its entry produced, recovered by
    /// walking the signed amounts backwards from the present balance. The
    /// opening deposit is not a ledger entry, so a forward replay from zero
    /// would misreport every balance. A closed account was drained to zero
    /// before closing, so its replay starts from zero.
    pub async fn transaction_history(&self, account_id: &str) -> Result<Vec<TransactionReceipt>> {
        let account_id = parse_account_id(account_id)?;
        let entries = self.repository.ledger_by_account(account_id).await?;

        let mut balance = match self.repository.account_by_id(account_id).await {
            Ok(account) => account.balance,
            Err(Error::NotFound(_)) => Decimal::ZERO,
            Err(e) => return Err(e),
        };

        let mut receipts = Vec::with_capacity(entries.len());
        for entry in entries {
            let balance_after = balance;
            balance -= entry.signed_amount();
            receipts.push(TransactionReceipt {
                transaction_id: entry.transaction_id,
                account_id: entry.account_id,
                amount: entry.amount,
                transaction_type: entry.transaction_type,
                transaction_date: entry.transaction_date,
                balance: balance_after,
            });
        }
        Ok(receipts)
    }
}

fn parse_account_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::not_found("account not found"))
}
