//! Item domain model.
//!
//! # Responsibility
//! - Define the content record users create and share.
//! - Apply create/update payloads with all-or-nothing validation.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `updated_at` is `None` until the first update and is never earlier
//!   than `created_at`.
//! - `title` and `description` are never empty.

use super::validation::{require_non_empty, EntityKind, ValidationError};
use super::Timestamp;
use serde::{Deserialize, Serialize};

/// Stable string identifier of an item.
pub type ItemId = String;

/// Caller-supplied fields for item create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub title: String,
    pub description: String,
}

impl ItemPayload {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Checks that both required fields are non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::Item, "title", &self.title)?;
        require_non_empty(EntityKind::Item, "description", &self.description)
    }
}

/// Canonical stored item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawItem")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    /// Absent until the first successful update.
    pub updated_at: Option<Timestamp>,
}

impl Item {
    /// Builds a fresh item from a validated payload.
    ///
    /// # Invariants
    /// - `updated_at` starts as `None`.
    pub fn create(
        id: impl Into<ItemId>,
        payload: ItemPayload,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        payload.validate()?;
        Ok(Self {
            id: id.into(),
            title: payload.title,
            description: payload.description,
            created_at,
            updated_at: None,
        })
    }

    /// Replaces title/description and refreshes `updated_at`.
    ///
    /// The payload is validated before anything is touched, so a failed
    /// call leaves `self` unchanged. A clock reading earlier than
    /// `created_at` is clamped up to it.
    pub fn apply_update(
        &mut self,
        payload: ItemPayload,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        payload.validate()?;
        self.title = payload.title;
        self.description = payload.description;
        // Why: records may carry a caller-supplied `created_at` ahead of the
        // store clock; `updated_at >= created_at` must still hold.
        self.updated_at = Some(now.max(self.created_at));
        Ok(())
    }

    /// Returns whether this item has been updated at least once.
    pub fn is_updated(&self) -> bool {
        self.updated_at.is_some()
    }

    /// Verifies record-level invariants (used on reads of persisted rows).
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::Item, "id", &self.id)?;
        require_non_empty(EntityKind::Item, "title", &self.title)?;
        require_non_empty(EntityKind::Item, "description", &self.description)?;
        if let Some(updated_at) = self.updated_at {
            if updated_at < self.created_at {
                return Err(ValidationError::UpdatedBeforeCreated {
                    created_at: self.created_at,
                    updated_at,
                });
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: ItemId,
    title: String,
    description: String,
    created_at: Timestamp,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl TryFrom<RawItem> for Item {
    type Error = ValidationError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let item = Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        };
        item.validate()?;
        Ok(item)
    }
}
