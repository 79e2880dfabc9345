//! Core domain entities
//!
//! Pure data structures and business-rule predicates - no I/O or external
//! dependencies.

mod account;
mod transaction;
pub mod result;

pub use account::{minimum_opening_deposit, Account, AccountStatus, AccountType, NewAccount};
pub use transaction::{LedgerEntry, NewTransaction, PostedTransaction, TransactionType};
