//! Item collection operations.
//!
//! # Invariants
//! - Payload validation runs before any lookup, so an invalid update on a
//!   missing id reports the validation failure.
//! - `update_item` never changes `id` or `created_at`.

use super::store::{RecordStore, StoreError, StoreResult};
use crate::model::item::{Item, ItemPayload};
use crate::model::validation::EntityKind;
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use log::debug;

impl RecordStore {
    /// Creates an item with a fresh id and `created_at = now`.
    pub fn create_item(&self, payload: ItemPayload) -> StoreResult<Item> {
        self.instrument("item_create", || {
            payload.validate()?;
            let item = Item::create(self.ids.next_id(), payload, self.clock.now())?;
            self.write(|tx| {
                SqliteItemRepository::new(tx).insert_item(&item)?;
                Ok(())
            })?;
            debug!("event=item_create module=store id={}", item.id);
            Ok(item)
        })
    }

    /// Returns one item by id.
    pub fn get_item(&self, id: &str) -> StoreResult<Item> {
        self.read(|conn| {
            SqliteItemRepository::new(conn)
                .get_item(id)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Item, id))
        })
    }

    /// Returns a snapshot of every stored item.
    pub fn list_items(&self) -> StoreResult<Vec<Item>> {
        self.read(|conn| Ok(SqliteItemRepository::new(conn).list_items()?))
    }

    /// Replaces title and description and stamps `updated_at`.
    pub fn update_item(&self, id: &str, payload: ItemPayload) -> StoreResult<Item> {
        self.instrument("item_update", || {
            payload.validate()?;
            self.write(|tx| {
                let repo = SqliteItemRepository::new(tx);
                let mut item = repo
                    .get_item(id)?
                    .ok_or_else(|| StoreError::not_found(EntityKind::Item, id))?;

                item.apply_update(payload, self.clock.now())?;
                if !repo.update_item(&item)? {
                    return Err(StoreError::not_found(EntityKind::Item, id));
                }
                Ok(item)
            })
        })
    }

    /// Removes an item and returns the removed record.
    ///
    /// Share entries pointing at the item are left untouched.
    pub fn delete_item(&self, id: &str) -> StoreResult<Item> {
        self.instrument("item_delete", || {
            self.write(|tx| {
                SqliteItemRepository::new(tx)
                    .delete_item(id)?
                    .ok_or_else(|| StoreError::not_found(EntityKind::Item, id))
            })
        })
    }
}
