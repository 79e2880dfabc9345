//! Repository port - persistence boundary for accounts and their ledger

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{
    Account, AccountType, LedgerEntry, NewAccount, NewTransaction, PostedTransaction,
};

/// Durable account/ledger store
///
/// Implementations own all I/O and all atomicity: `apply_transaction` must
/// commit the ledger insert and the balance change as one unit or not at
/// all, and must serialize the sufficiency check against concurrent
/// transactions on the same account. There is no caching layer - every call
/// reflects committed state at call time.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account; returns the store-assigned id. `Validation`
    /// when the customer already holds an open account of the type.
    async fn create_account(&self, account: &NewAccount) -> Result<Uuid>;

    /// All open accounts owned by a customer; empty when the customer has none
    async fn accounts_by_customer(&self, customer_id: &str) -> Result<Vec<Account>>;

    /// Single open-account lookup; `NotFound` when absent or closed
    async fn account_by_id(&self, account_id: Uuid) -> Result<Account>;

    /// Close the customer's open account of the given type; `NotFound` when
    /// no open row matches. The row and its ledger history are kept.
    async fn delete_account(&self, customer_id: &str, account_type: AccountType) -> Result<()>;

    /// Commit a ledger entry and its balance delta as one atomic unit,
    /// returning the entry enriched with the post-transaction balance
    async fn apply_transaction(&self, tx: &NewTransaction) -> Result<PostedTransaction>;

    /// Committed ledger history for an account, newest first
    async fn ledger_by_account(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>>;
}
