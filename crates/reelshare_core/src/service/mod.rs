//! Store service: the single entry point for every collection operation.
//!
//! # Responsibility
//! - Own storage handles instead of process-wide collections.
//! - Orchestrate repositories into create/read/update/delete/share use-cases.

pub mod items;
pub mod sharing;
pub mod store;
pub mod users;
