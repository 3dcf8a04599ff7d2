//! Core storage layer for reelshare.
//!
//! Holds the item and user collections, the validation rules guarding every
//! write, and the sharing relation between them. Transport layers wrap
//! [`RecordStore`] and map [`StoreError::kind`] to their own responses.

pub mod clock;
pub mod config;
pub mod db;
pub mod id_gen;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use id_gen::{IdGenerator, SequentialIdGenerator, UuidV4Generator};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{Item, ItemId, ItemPayload};
pub use model::user::{User, UserId, UserPayload};
pub use model::validation::{EntityKind, ValidationError};
pub use model::Timestamp;
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::store::{
    ConflictError, ErrorKind, RecordStore, ShareConfirmation, StoreError, StoreResult,
};

/// Minimal health-check API for host wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
