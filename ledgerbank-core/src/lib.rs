//! Ledgerbank core - account lifecycle and transaction processing
//!
//! The crate follows a hexagonal layout:
//! - **domain**: entities and business rules (accounts, ledger entries,
//!   the error taxonomy)
//! - **ports**: trait definitions the core depends on (`AccountRepository`)
//! - **services**: orchestration of validation and persistence
//! - **adapters**: concrete implementations of the ports (DuckDB)
//!
//! [`BankContext`] wires the layers together and is the single entry
//! point for embedding callers.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::AccountService;

pub use domain::result::{Error, Result};
pub use domain::{Account, AccountStatus, AccountType, LedgerEntry, TransactionType};
pub use services::{
    AccountView, CreateAccountRequest, CreateAccountResponse, TransactionReceipt,
    TransactionRequest,
};

/// Main context for ledgerbank operations
///
/// Holds the configuration, the store, and the account service.
/// Constructed once at startup and passed around explicitly; there is no
/// global database handle.
pub struct BankContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub account_service: AccountService,
}

impl BankContext {
    /// Open (or create) the database under `data_dir` and wire up the
    /// service layer
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let repository = Arc::new(DuckDbRepository::new(&config.db_path(data_dir))?);
        repository.ensure_schema()?;
        let account_service = AccountService::new(repository.clone());
        Ok(Self {
            config,
            repository,
            account_service,
        })
    }
}
