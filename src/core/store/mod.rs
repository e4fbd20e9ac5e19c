//! SQLite-backed record store
//!
//! This module provides the shared store every workshop component works against:
//! - Keyed collections for jobs, the four inventory categories, the purchase
//!   queue, suppliers and employees
//! - Atomic multi-record transactions with bounded retry on lock conflicts
//! - Push subscriptions to collection changes, delivered after commit
//!
//! A `Store` is opened once per process and passed by reference to the
//! ledger, purchase queue, job lifecycle and settlement engine.

mod schema;
mod serialize;
mod watch;


use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use miette::Diagnostic;
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use thiserror::Error;

use crate::core::config::StoreConfig;
use crate::core::error::ShopResult;

pub use schema::SCHEMA_VERSION;
pub use watch::{ChangeEvent, Collection, Subscription};

use watch::Watchers;

/// Errors raised by the record store itself
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("Database error: {0}")]
    #[diagnostic(code(shopfloor::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("Transaction conflict: store still locked after {attempts} attempt(s)")]
    #[diagnostic(
        code(shopfloor::store::conflict),
        help("Another session is writing to the workshop store. Try again.")
    )]
    Conflict { attempts: u32 },

    #[error("Failed to encode record: {0}")]
    #[diagnostic(code(shopfloor::store::encode))]
    Encode(#[from] serde_json::Error),

    #[error("Store schema version {found} is newer than supported version {supported}")]
    #[diagnostic(code(shopfloor::store::schema))]
    UnsupportedSchema { found: i32, supported: i32 },

    #[error("IO error: {0}")]
    #[diagnostic(code(shopfloor::store::io))]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// SQLite reported the database as busy or locked by another connection
    pub fn is_busy(&self) -> bool {
        match self {
            StoreError::Sqlite(e) => matches!(
                e.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

/// The workshop record store backed by SQLite
pub struct Store {
    conn: Connection,
    config: StoreConfig,
    watchers: Watchers,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: &Path, config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL lets readers proceed while a settlement holds the write lock
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::from_connection(conn, config)
    }

    /// Open a private in-memory store (tests, dry runs)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, StoreConfig::default())
    }

    fn from_connection(conn: Connection, config: StoreConfig) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        schema::init(&conn)?;

        tracing::debug!(
            busy_timeout_ms = config.busy_timeout_ms,
            max_retries = config.max_retries,
            "Store opened"
        );

        Ok(Self {
            conn,
            config,
            watchers: Watchers::default(),
        })
    }

    /// Store settings in effect
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read-only access for single-statement queries outside a transaction
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` as one atomic unit
    ///
    /// The transaction takes the write lock up front (`BEGIN IMMEDIATE`), so
    /// every read inside `f` observes committed state that no other writer can
    /// change before commit. If the lock cannot be acquired the whole closure is
    /// re-run from fresh reads, up to `max_retries` more times, then the
    /// conflict is surfaced. Any other error rolls the transaction back.
    pub fn transact<T, F>(&self, mut f: F) -> ShopResult<T>
    where
        F: FnMut(&mut Tx<'_>) -> ShopResult<T>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.try_transact(&mut f) {
                Err(e) if e.is_conflict() && attempt <= self.config.max_retries => {
                    tracing::warn!(attempt, error = %e, "Store busy, retrying transaction");
                    std::thread::sleep(retry_backoff(attempt));
                }
                Err(e) if e.is_conflict() => {
                    tracing::error!(attempts = attempt, "Giving up on transaction after conflicts");
                    return Err(StoreError::Conflict { attempts: attempt }.into());
                }
                result => return result,
            }
        }
    }

    fn try_transact<T, F>(&self, f: &mut F) -> ShopResult<T>
    where
        F: FnMut(&mut Tx<'_>) -> ShopResult<T>,
    {
        let inner = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let mut tx = Tx {
            inner,
            changes: BTreeMap::new(),
        };

        // Dropping `tx` on error rolls back
        let value = f(&mut tx)?;

        let Tx { inner, changes } = tx;
        inner.commit()?;
        self.watchers.publish(changes);
        Ok(value)
    }

    /// Subscribe to committed changes in a collection
    ///
    /// Events arrive after the writing transaction commits. Dropping (or
    /// cancelling) the returned handle ends the subscription.
    pub fn subscribe(
        &self,
        collection: Collection,
    ) -> (Subscription, crossbeam_channel::Receiver<ChangeEvent>) {
        self.watchers.subscribe(collection)
    }
}

fn retry_backoff(attempt: u32) -> Duration {
    Duration::from_millis(25 * u64::from(attempt))
}

/// An open write transaction
///
/// Dereferences to the underlying connection for queries; writers record the
/// IDs they touch so subscribers can be notified after commit.
pub struct Tx<'c> {
    inner: Transaction<'c>,
    changes: BTreeMap<Collection, Vec<String>>,
}

impl Tx<'_> {
    /// Record that a row in `collection` was written
    pub fn touch(&mut self, collection: Collection, id: impl ToString) {
        let ids = self.changes.entry(collection).or_default();
        let id = id.to_string();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}

impl std::ops::Deref for Tx<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.inner
    }
}
