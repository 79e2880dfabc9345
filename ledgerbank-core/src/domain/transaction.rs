//! Ledger entry domain model
//!
//! A ledger entry records a single deposit or withdrawal. Once committed it
//! is immutable and append-only: entries are never updated or deleted, and
//! they survive the closure of their account as audit history.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::Error;

/// Direction of a balance movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }

    pub fn is_withdrawal(&self) -> bool {
        matches!(self, Self::Withdrawal)
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            _ => Err(Error::validation("invalid transaction type")),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed ledger row
///
/// `amount` is the non-negative magnitude of the movement; the direction
/// lives in `transaction_type`. The store assigns `transaction_id` and
/// `transaction_date` at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
}

impl LedgerEntry {
    /// The balance delta this entry applied: negative for withdrawals
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdrawal => -self.amount,
        }
    }
}

/// A transaction before the store has committed it
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
}

/// A committed ledger entry together with the post-transaction balance,
/// read back inside the same atomic unit that applied it
#[derive(Debug, Clone)]
pub struct PostedTransaction {
    pub entry: LedgerEntry,
    pub balance: Decimal,
}
