//! Record store service.
//!
//! # Responsibility
//! - Own the SQLite connection, clock and id generator for its lifetime.
//! - Run every operation as one critical section over both collections.
//! - Map repository results onto the store's typed error kinds.
//!
//! # Invariants
//! - The connection mutex is held for the full read-validate-write sequence.
//! - Mutations run in an `IMMEDIATE` transaction; any early return rolls
//!   the transaction back on drop, so no operation half-applies.

use crate::clock::{Clock, SystemClock};
use crate::db::{open_db, open_db_in_memory};
use crate::id_gen::{IdGenerator, UuidV4Generator};
use crate::model::item::ItemId;
use crate::model::user::UserId;
use crate::model::validation::{EntityKind, ValidationError};
use crate::repo::item_repo::SqliteItemRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse error classification for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
}

impl ErrorKind {
    /// Stable snake_case code used in log events and transport payloads.
    pub fn code(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

/// Precondition on existing state failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    AlreadyShared { item_id: ItemId, user_id: UserId },
}

impl Display for ConflictError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyShared { item_id, user_id } => write!(
                f,
                "item with id={item_id} is already shared with user id={user_id}"
            ),
        }
    }
}

/// Error returned by every store operation.
#[derive(Debug)]
pub enum StoreError {
    /// A required payload field was empty.
    Validation(ValidationError),
    /// The referenced id does not exist in the named collection.
    NotFound { entity: EntityKind, id: String },
    Conflict(ConflictError),
    /// Storage transport or persisted-data failure.
    Repo(RepoError),
}

impl StoreError {
    pub(crate) fn not_found(entity: EntityKind, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} with id={id} not found"),
            Self::Conflict(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound { .. } | Self::Conflict(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Confirmation returned by a successful share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareConfirmation {
    pub item_id: ItemId,
    pub user_id: UserId,
    /// Length of the user's shared list after this share.
    pub shared_count: usize,
}

impl Display for ShareConfirmation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "item {} shared successfully with user {}",
            self.item_id, self.user_id
        )
    }
}

/// Storage service owning both collections.
///
/// `RecordStore` is `Send + Sync`; share it behind an `Arc` when several
/// threads issue operations.
#[derive(Debug)]
pub struct RecordStore {
    conn: Mutex<Connection>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl RecordStore {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path).map_err(RepoError::from)?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory store, dropped with the instance.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(RepoError::from)?;
        Self::from_connection(conn)
    }

    /// Wraps an already migrated connection.
    ///
    /// Fails when the schema is missing or at an unexpected version.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        SqliteItemRepository::try_new(&conn)?;
        SqliteUserRepository::try_new(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock: Arc::new(SystemClock::new()),
            ids: Arc::new(UuidV4Generator),
        })
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the identifier source.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Runs a read-only operation while holding the store lock.
    pub(crate) fn read<T>(&self, op: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self.conn.lock();
        op(&conn)
    }

    /// Runs a mutation inside one immediate transaction under the store lock.
    ///
    /// The transaction commits only when `op` succeeds.
    pub(crate) fn write<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Wraps an operation with metadata-only outcome logging.
    pub(crate) fn instrument<T>(
        &self,
        event: &'static str,
        op: impl FnOnce() -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let result = op();
        match &result {
            Ok(_) => info!(
                "event={event} module=store status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event={event} module=store status=error error_code={} duration_ms={} error={err}",
                err.kind().code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}
