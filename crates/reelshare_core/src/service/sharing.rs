//! Sharing relation between items and users.
//!
//! # Invariants
//! - A share is only recorded when both the item and the user exist.
//! - A user's shared list never holds the same item twice.
//! - Lookups, the duplicate check and the append run in one transaction.

use super::store::{ConflictError, RecordStore, ShareConfirmation, StoreError, StoreResult};
use crate::model::validation::EntityKind;
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};

impl RecordStore {
    /// Shares an item with a user by appending it to the user's list.
    ///
    /// # Errors
    /// - `NotFound` for a missing item (checked first) or user.
    /// - `Conflict(AlreadyShared)` when the pair already exists.
    pub fn share_item(&self, item_id: &str, user_id: &str) -> StoreResult<ShareConfirmation> {
        self.instrument("item_share", || {
            self.write(|tx| {
                let items = SqliteItemRepository::new(tx);
                let users = SqliteUserRepository::new(tx);

                if items.get_item(item_id)?.is_none() {
                    return Err(StoreError::not_found(EntityKind::Item, item_id));
                }
                let mut user = users
                    .get_user(user_id)?
                    .ok_or_else(|| StoreError::not_found(EntityKind::User, user_id))?;

                if !user.push_shared(item_id) {
                    return Err(StoreError::Conflict(ConflictError::AlreadyShared {
                        item_id: item_id.to_string(),
                        user_id: user_id.to_string(),
                    }));
                }

                let shared_count = users.append_shared_item(user_id, item_id)?;
                Ok(ShareConfirmation {
                    item_id: item_id.to_string(),
                    user_id: user_id.to_string(),
                    shared_count,
                })
            })
        })
    }
}
