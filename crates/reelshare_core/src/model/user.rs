//! User domain model.
//!
//! # Responsibility
//! - Define the account record items are shared with.
//! - Own the ordered, duplicate-free shared item list.
//!
//! # Invariants
//! - `username` and `email` are never empty.
//! - `shared_item_ids` is `None` until the first share, keeps insertion
//!   order, and never holds the same item id twice.

use super::item::ItemId;
use super::validation::{require_non_empty, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable string identifier of a user.
pub type UserId = String;

/// Caller-supplied fields for user creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub username: String,
    pub email: String,
}

impl UserPayload {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }

    /// Checks that both required fields are non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::User, "username", &self.username)?;
        require_non_empty(EntityKind::User, "email", &self.email)
    }
}

/// Canonical stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawUser")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Items shared with this user, oldest share first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_item_ids: Option<Vec<ItemId>>,
}

impl User {
    /// Builds a fresh user from a validated payload with no shares.
    pub fn create(id: impl Into<UserId>, payload: UserPayload) -> Result<Self, ValidationError> {
        payload.validate()?;
        Ok(Self {
            id: id.into(),
            username: payload.username,
            email: payload.email,
            shared_item_ids: None,
        })
    }

    /// Returns whether `item_id` is already shared with this user.
    pub fn has_shared(&self, item_id: &str) -> bool {
        self.shared_items().iter().any(|shared| shared == item_id)
    }

    /// Shared item ids as a slice; empty when nothing was shared yet.
    pub fn shared_items(&self) -> &[ItemId] {
        self.shared_item_ids.as_deref().unwrap_or(&[])
    }

    /// Appends `item_id` to the shared list.
    ///
    /// Returns `false` without mutating when the id is already present.
    pub fn push_shared(&mut self, item_id: impl Into<ItemId>) -> bool {
        let item_id = item_id.into();
        if self.has_shared(&item_id) {
            return false;
        }
        self.shared_item_ids
            .get_or_insert_with(Vec::new)
            .push(item_id);
        true
    }

    /// Verifies record-level invariants (used on reads of persisted rows).
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::User, "id", &self.id)?;
        require_non_empty(EntityKind::User, "username", &self.username)?;
        require_non_empty(EntityKind::User, "email", &self.email)?;

        let mut seen = HashSet::new();
        for item_id in self.shared_items() {
            if !seen.insert(item_id.as_str()) {
                return Err(ValidationError::DuplicateSharedItem {
                    item_id: item_id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    id: UserId,
    username: String,
    email: String,
    #[serde(default)]
    shared_item_ids: Option<Vec<ItemId>>,
}

impl TryFrom<RawUser> for User {
    type Error = ValidationError;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let user = Self {
            id: raw.id,
            username: raw.username,
            email: raw.email,
            shared_item_ids: raw.shared_item_ids,
        };
        user.validate()?;
        Ok(user)
    }
}
