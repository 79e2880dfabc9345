//! DuckDB repository implementation
//!
//! All statements run behind a single `Mutex<Connection>`. The transaction
//! apply additionally relies on a conditional UPDATE rather than the mutex
//! for its sufficiency guarantee, so the no-overdraw invariant holds even
//! when several repository instances share one database file.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountStatus, AccountType, LedgerEntry, NewAccount, NewTransaction,
    PostedTransaction, TransactionType,
};
use crate::migrations::MIGRATIONS;
use crate::ports::AccountRepository;

/// DuckDB-backed account store
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
}

impl DuckDbRepository {
    /// Open (or create) the database file at `db_path`
    pub fn new(db_path: &Path) -> Result<Self> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by unit tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Apply all pending migrations. Idempotent; safe to call at every startup.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // Bootstrap the tracking table before consulting it
        if let Some((name, sql)) = MIGRATIONS.first() {
            if !migrations_table_exists(&conn)? {
                conn.execute_batch(sql)?;
                record_migration(&conn, name)?;
                debug!(migration = name, "applied");
            }
        }

        let applied = applied_migrations(&conn)?;
        for (name, sql) in MIGRATIONS.iter().skip(1) {
            if !applied.contains(&name.to_string()) {
                conn.execute_batch(sql)?;
                record_migration(&conn, name)?;
                debug!(migration = name, "applied");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for DuckDbRepository {
    async fn create_account(&self, account: &NewAccount) -> Result<Uuid> {
        let account_id = Uuid::new_v4();
        let opening_date = Utc::now();

        // Closed rows stay behind as audit history, so one-open-account-per-
        // type cannot be a unique index; the conditional insert keeps the
        // duplicate check and the insert in one statement
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT INTO accounts (account_id, customer_id, opening_date, account_type, balance, status)
             SELECT ?, ?, ?, ?, CAST(? AS DECIMAL(18,2)), ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM accounts
                 WHERE customer_id = ? AND account_type = ? AND status = 'active'
             )",
            params![
                account_id.to_string(),
                account.customer_id,
                opening_date.to_rfc3339(),
                account.account_type.as_str(),
                account.opening_balance.to_string(),
                AccountStatus::Active.as_str(),
                account.customer_id,
                account.account_type.as_str(),
            ],
        )?;

        if inserted == 0 {
            return Err(Error::validation(format!(
                "customer already has a {} account",
                account.account_type
            )));
        }
        Ok(account_id)
    }

    async fn accounts_by_customer(&self, customer_id: &str) -> Result<Vec<Account>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT account_id, customer_id, opening_date, account_type, balance::VARCHAR, status
             FROM accounts
             WHERE customer_id = ? AND status = 'active'
             ORDER BY opening_date",
        )?;

        let rows = stmt.query_map([customer_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(decode_account(row?)?);
        }
        Ok(accounts)
    }

    async fn account_by_id(&self, account_id: Uuid) -> Result<Account> {
        let conn = self.conn.lock().unwrap();
        let row = conn.query_row(
            "SELECT account_id, customer_id, opening_date, account_type, balance::VARCHAR, status
             FROM accounts
             WHERE account_id = ? AND status = 'active'",
            [account_id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        );

        match row {
            Ok(raw) => decode_account(raw),
            Err(duckdb::Error::QueryReturnedNoRows) => {
                Err(Error::not_found("account not found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_account(&self, customer_id: &str, account_type: AccountType) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let closed = conn.execute(
            "UPDATE accounts SET status = ?
             WHERE customer_id = ? AND account_type = ? AND status = 'active'",
            params![
                AccountStatus::Closed.as_str(),
                customer_id,
                account_type.as_str()
            ],
        )?;

        if closed == 0 {
            return Err(Error::not_found(format!(
                "no {account_type} account for customer {customer_id}"
            )));
        }
        Ok(())
    }

    async fn apply_transaction(&self, tx: &NewTransaction) -> Result<PostedTransaction> {
        // The validator rejects negative amounts before any store call; a
        // negative deposit slipping through would break balance >= 0
        if tx.amount < Decimal::ZERO {
            return Err(Error::validation("amount cannot be negative"));
        }

        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN TRANSACTION")?;
        match apply_transaction_in_tx(&conn, tx) {
            Ok(posted) => {
                conn.execute_batch("COMMIT")?;
                Ok(posted)
            }
            Err(e) => {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    warn!(error = %rollback_err, "rollback failed after aborted transaction apply");
                }
                Err(e)
            }
        }
    }

    async fn ledger_by_account(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT transaction_id, account_id, amount::VARCHAR, transaction_type, transaction_date
             FROM ledger_entries
             WHERE account_id = ?
             ORDER BY transaction_date DESC",
        )?;

        let rows = stmt.query_map([account_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(decode_ledger_entry(row?)?);
        }
        Ok(entries)
    }
}

/// Body of the atomic unit: ledger insert + conditional balance update +
/// post-update balance read. The caller wraps this in BEGIN/COMMIT and rolls
/// back on any error, so both writes land together or not at all.
fn apply_transaction_in_tx(conn: &Connection, tx: &NewTransaction) -> Result<PostedTransaction> {
    let transaction_id = Uuid::new_v4();
    let transaction_date = Utc::now();

    conn.execute(
        "INSERT INTO ledger_entries (transaction_id, account_id, amount, transaction_type, transaction_date)
         VALUES (?, ?, CAST(? AS DECIMAL(18,2)), ?, ?)",
        params![
            transaction_id.to_string(),
            tx.account_id.to_string(),
            tx.amount.to_string(),
            tx.transaction_type.as_str(),
            transaction_date.to_rfc3339(),
        ],
    )?;

    // Withdrawals only go through when the balance still covers the amount.
    // The condition and the mutation are one statement, so two concurrent
    // withdrawals cannot both pass a stale sufficiency check.
    let updated = match tx.transaction_type {
        TransactionType::Deposit => conn.execute(
            "UPDATE accounts
             SET balance = balance + CAST(? AS DECIMAL(18,2))
             WHERE account_id = ? AND status = 'active'",
            params![tx.amount.to_string(), tx.account_id.to_string()],
        )?,
        TransactionType::Withdrawal => conn.execute(
            "UPDATE accounts
             SET balance = balance - CAST(? AS DECIMAL(18,2))
             WHERE account_id = ? AND status = 'active'
               AND balance >= CAST(? AS DECIMAL(18,2))",
            params![
                tx.amount.to_string(),
                tx.account_id.to_string(),
                tx.amount.to_string()
            ],
        )?,
    };

    if updated == 0 {
        // Zero rows affected: either no such active account, or a
        // withdrawal the balance cannot support
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE account_id = ? AND status = 'active'",
            [tx.account_id.to_string()],
            |row| row.get(0),
        )?;
        return if exists == 0 {
            Err(Error::not_found("account not found"))
        } else {
            Err(Error::validation("insufficient balance"))
        };
    }

    let balance: String = conn.query_row(
        "SELECT balance::VARCHAR FROM accounts WHERE account_id = ?",
        [tx.account_id.to_string()],
        |row| row.get(0),
    )?;

    Ok(PostedTransaction {
        entry: LedgerEntry {
            transaction_id,
            account_id: tx.account_id,
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            transaction_date,
        },
        balance: parse_decimal(&balance)?,
    })
}

// === Migration helpers ===

fn migrations_table_exists(conn: &Connection) -> Result<bool> {
    let result: std::result::Result<i64, _> = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
        [],
        |row| row.get(0),
    );
    match result {
        Ok(count) => Ok(count > 0),
        Err(_) => Ok(false),
    }
}

fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut result = Vec::new();
    for name in names {
        result.push(name?);
    }
    Ok(result)
}

fn record_migration(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO sys_migrations (migration_name) VALUES (?)",
        [name],
    )?;
    Ok(())
}

// === Row decoding ===

type AccountRow = (String, String, String, String, String, String);
type LedgerRow = (String, String, String, String, String);

fn decode_account(
    (account_id, customer_id, opening_date, account_type, balance, status): AccountRow,
) -> Result<Account> {
    Ok(Account {
        account_id: parse_uuid(&account_id)?,
        customer_id,
        opening_date: parse_timestamp(&opening_date)?,
        account_type: AccountType::from_str(&account_type)
            .map_err(|_| Error::unexpected(format!("unknown account type in store: {account_type}")))?,
        balance: parse_decimal(&balance)?,
        status: AccountStatus::from_str(&status)?,
    })
}

fn decode_ledger_entry(
    (transaction_id, account_id, amount, transaction_type, transaction_date): LedgerRow,
) -> Result<LedgerEntry> {
    Ok(LedgerEntry {
        transaction_id: parse_uuid(&transaction_id)?,
        account_id: parse_uuid(&account_id)?,
        amount: parse_decimal(&amount)?,
        transaction_type: TransactionType::from_str(&transaction_type).map_err(|_| {
            Error::unexpected(format!("unknown transaction type in store: {transaction_type}"))
        })?,
        transaction_date: parse_timestamp(&transaction_date)?,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::unexpected(format!("malformed id in store: {e}")))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::unexpected(format!("malformed timestamp in store: {e}")))
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|e| Error::unexpected(format!("malformed amount in store: {e}")))
}
