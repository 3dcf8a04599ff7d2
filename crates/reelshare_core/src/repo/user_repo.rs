//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist user records together with their ordered shared item list.
//!
//! # Invariants
//! - Shared item ids are returned in the order they were appended.
//! - A user with no share rows reads back with `shared_item_ids = None`.
//! - Deleting a user removes its share rows (ON DELETE CASCADE).

use super::{ensure_table_ready, RepoError, RepoResult};
use crate::model::item::ItemId;
use crate::model::user::{User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email
FROM users";

/// Repository interface for the user collection and its share lists.
pub trait UserRepository {
    /// Stores a new user, including any pre-populated share list.
    fn insert_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: &str) -> RepoResult<Option<User>>;
    /// Snapshot of every stored user ordered by id.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Removes a user with its share list and returns the removed record.
    fn delete_user(&self, id: &str) -> RepoResult<Option<User>>;
    /// Appends `item_id` to the end of the user's share list.
    ///
    /// Returns the resulting number of shared items. Callers must check for
    /// duplicates first; a repeated pair fails with a constraint error.
    fn append_shared_item(&self, user_id: &str, item_id: &str) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "users", &["id", "username", "email"])?;
        ensure_table_ready(
            conn,
            "user_shared_items",
            &["user_id", "item_id", "position"],
        )?;
        Ok(Self { conn })
    }

    /// Wraps a connection already checked by `try_new`.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_shared_item_ids(&self, user_id: &str) -> RepoResult<Option<Vec<ItemId>>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id
             FROM user_shared_items
             WHERE user_id = ?1
             ORDER BY position ASC;",
        )?;
        let ids = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(if ids.is_empty() { None } else { Some(ids) })
    }

    fn load_all_shared_item_ids(&self) -> RepoResult<HashMap<UserId, Vec<ItemId>>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, item_id
             FROM user_shared_items
             ORDER BY user_id ASC, position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut shares: HashMap<UserId, Vec<ItemId>> = HashMap::new();

        while let Some(row) = rows.next()? {
            let user_id: String = row.get(0)?;
            let item_id: String = row.get(1)?;
            shares.entry(user_id).or_default().push(item_id);
        }

        Ok(shares)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (id, username, email) VALUES (?1, ?2, ?3);",
            params![user.id.as_str(), user.username.as_str(), user.email.as_str()],
        )?;

        for item_id in user.shared_items() {
            self.append_shared_item(&user.id, item_id)?;
        }

        Ok(())
    }

    fn get_user(&self, id: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_user_row,
            )
            .optional()?;

        let Some(mut user) = row else {
            return Ok(None);
        };
        user.shared_item_ids = self.load_shared_item_ids(&user.id)?;
        finish_user(user).map(Some)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut shares = self.load_all_shared_item_ids()?;
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            let mut user = read_user_row(row)?;
            user.shared_item_ids = shares.remove(&user.id);
            users.push(finish_user(user)?);
        }

        Ok(users)
    }

    fn delete_user(&self, id: &str) -> RepoResult<Option<User>> {
        let Some(existing) = self.get_user(id)? else {
            return Ok(None);
        };

        self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        Ok(Some(existing))
    }

    fn append_shared_item(&self, user_id: &str, item_id: &str) -> RepoResult<usize> {
        // Why: positions are computed in the same statement so the append
        // sees the latest tail inside the caller's transaction.
        self.conn.execute(
            "INSERT INTO user_shared_items (user_id, item_id, position)
             SELECT ?1, ?2, COALESCE(MAX(position), 0) + 1
             FROM user_shared_items
             WHERE user_id = ?1;",
            params![user_id, item_id],
        )?;

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM user_shared_items WHERE user_id = ?1;",
            [user_id],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative share count `{count}`")))
    }
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        shared_item_ids: None,
    })
}

fn finish_user(user: User) -> RepoResult<User> {
    user.validate().map_err(|err| {
        RepoError::InvalidData(format!("users row `{}` failed validation: {err}", user.id))
    })?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::{SqliteUserRepository, UserRepository};
    use crate::db::open_db_in_memory;
    use crate::model::user::{User, UserPayload};

    #[test]
    fn append_keeps_insertion_order() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteUserRepository::try_new(&conn).unwrap();
        let user = User::create("u-1", UserPayload::new("ana", "ana@example.com")).unwrap();
        repo.insert_user(&user).unwrap();

        assert_eq!(repo.append_shared_item("u-1", "zeta").unwrap(), 1);
        assert_eq!(repo.append_shared_item("u-1", "alpha").unwrap(), 2);

        let loaded = repo.get_user("u-1").unwrap().unwrap();
        assert_eq!(
            loaded.shared_item_ids,
            Some(vec!["zeta".to_string(), "alpha".to_string()])
        );
    }

    #[test]
    fn duplicate_append_is_rejected_by_schema() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteUserRepository::try_new(&conn).unwrap();
        let user = User::create("u-1", UserPayload::new("ana", "ana@example.com")).unwrap();
        repo.insert_user(&user).unwrap();

        repo.append_shared_item("u-1", "item").unwrap();
        assert!(repo.append_shared_item("u-1", "item").is_err());
    }

    #[test]
    fn delete_cascades_share_rows() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteUserRepository::try_new(&conn).unwrap();
        let user = User::create("u-1", UserPayload::new("ana", "ana@example.com")).unwrap();
        repo.insert_user(&user).unwrap();
        repo.append_shared_item("u-1", "item").unwrap();

        let removed = repo.delete_user("u-1").unwrap().unwrap();
        assert_eq!(removed.shared_item_ids, Some(vec!["item".to_string()]));

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_shared_items;", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
