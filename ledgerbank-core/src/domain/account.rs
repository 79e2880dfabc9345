//! Account domain model and funding rules

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::Error;

/// Minimum opening deposit required to fund a new account.
pub fn minimum_opening_deposit() -> Decimal {
    Decimal::new(5_000, 0)
}

/// Account types a customer may hold - at most one open account of each
/// type per customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Saving,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Saving => "saving",
        }
    }
}

impl FromStr for AccountType {
    type Err = Error;

    /// Case-insensitive parse; anything but checking/saving is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "saving" => Ok(Self::Saving),
            _ => Err(Error::validation("invalid account type")),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            other => Err(Error::unexpected(format!(
                "unknown account status in store: {other}"
            ))),
        }
    }
}

/// A customer's bank account
///
/// `account_id` and `opening_date` are assigned by the store on creation and
/// immutable afterwards. `balance` is changed exclusively by the store's
/// atomic transaction apply; `status` flips to closed exactly once, when the
/// drained account is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: Uuid,
    pub customer_id: String,
    pub opening_date: DateTime<Utc>,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub status: AccountStatus,
}

impl Account {
    /// Sufficiency check for a withdrawal. Fast path only - the store's
    /// conditional update is the authoritative check under concurrency.
    pub fn can_withdraw(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// An account can only be closed once its balance is zero
    pub fn is_closable(&self) -> bool {
        self.balance == Decimal::ZERO
    }
}

/// A new account before the store has assigned its id and opening date
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub customer_id: String,
    pub account_type: AccountType,
    pub opening_balance: Decimal,
}

impl NewAccount {
    pub fn new(
        customer_id: impl Into<String>,
        account_type: AccountType,
        opening_balance: Decimal,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            account_type,
            opening_balance,
        }
    }
}
