//! Domain model for shareable items and the users they are shared with.
//!
//! # Responsibility
//! - Define the canonical records stored by the two collections.
//! - Own the payload validation rules guarding every write.
//!
//! # Invariants
//! - Every record is identified by a string id assigned at creation.
//! - Required text fields are never empty on a stored record.

pub mod item;
pub mod user;
pub mod validation;

/// Logical timestamp used for `createdAt`/`updatedAt` stamps.
///
/// Values only need to be non-decreasing; `SystemClock` uses epoch nanos.
pub type Timestamp = i64;
