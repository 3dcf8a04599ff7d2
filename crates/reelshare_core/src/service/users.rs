//! User collection operations.

use super::store::{RecordStore, StoreError, StoreResult};
use crate::model::user::{User, UserPayload};
use crate::model::validation::EntityKind;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use log::debug;

impl RecordStore {
    /// Creates a user with a fresh id and no shared items.
    pub fn add_user(&self, payload: UserPayload) -> StoreResult<User> {
        self.instrument("user_add", || {
            payload.validate()?;
            let user = User::create(self.ids.next_id(), payload)?;
            self.write(|tx| {
                SqliteUserRepository::new(tx).insert_user(&user)?;
                Ok(())
            })?;
            debug!("event=user_add module=store id={}", user.id);
            Ok(user)
        })
    }

    pub fn get_user(&self, id: &str) -> StoreResult<User> {
        self.read(|conn| {
            SqliteUserRepository::new(conn)
                .get_user(id)?
                .ok_or_else(|| StoreError::not_found(EntityKind::User, id))
        })
    }

    /// Returns a snapshot of every stored user with their share lists.
    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        self.read(|conn| Ok(SqliteUserRepository::new(conn).list_users()?))
    }

    /// Removes a user, including its shared item list.
    pub fn delete_user(&self, id: &str) -> StoreResult<User> {
        self.instrument("user_delete", || {
            self.write(|tx| {
                SqliteUserRepository::new(tx)
                    .delete_user(id)?
                    .ok_or_else(|| StoreError::not_found(EntityKind::User, id))
            })
        })
    }
}
