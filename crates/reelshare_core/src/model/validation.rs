//! Shared validation primitives for item and user payloads.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The two record kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Item,
    User,
}

impl EntityKind {
    /// Lowercase label used in messages and log events.
    pub fn label(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::User => "user",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload or record validation failure.
///
/// Always caller-correctable; the store never retries on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field was empty.
    EmptyField {
        entity: EntityKind,
        field: &'static str,
    },
    /// `updatedAt` precedes `createdAt`.
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
    /// A user's shared list names the same item more than once.
    DuplicateSharedItem { item_id: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity} field `{field}` is required and cannot be empty")
            }
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updatedAt ({updated_at}) must be >= createdAt ({created_at})"
            ),
            Self::DuplicateSharedItem { item_id } => {
                write!(f, "sharedItemIds lists item id={item_id} more than once")
            }
        }
    }
}

impl Error for ValidationError {}

/// Rejects an empty required field.
///
/// Only the empty string is rejected; whitespace is accepted as content.
pub(crate) fn require_non_empty(
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
