//! Item repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every write calls `Item::validate()` before touching SQL.
//! - `updated_at` is persisted as NULL until the first update.

use super::{ensure_table_ready, RepoError, RepoResult};
use crate::model::item::Item;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    created_at,
    updated_at
FROM items";

const ITEM_COLUMNS: &[&str] = &["id", "title", "description", "created_at", "updated_at"];

/// Repository interface for the item collection.
pub trait ItemRepository {
    /// Stores a new item. Fails on an id collision.
    fn insert_item(&self, item: &Item) -> RepoResult<()>;
    /// Replaces the mutable fields of an existing item.
    ///
    /// Returns `false` when no row with `item.id` exists.
    fn update_item(&self, item: &Item) -> RepoResult<bool>;
    fn get_item(&self, id: &str) -> RepoResult<Option<Item>>;
    /// Snapshot of every stored item ordered by id.
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    /// Removes an item and returns the removed record, if any.
    fn delete_item(&self, id: &str) -> RepoResult<Option<Item>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "items", ITEM_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Wraps a connection already checked by `try_new`.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert_item(&self, item: &Item) -> RepoResult<()> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO items (
                id,
                title,
                description,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                item.id.as_str(),
                item.title.as_str(),
                item.description.as_str(),
                item.created_at,
                item.updated_at,
            ],
        )?;

        Ok(())
    }

    fn update_item(&self, item: &Item) -> RepoResult<bool> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE items
             SET
                title = ?1,
                description = ?2,
                updated_at = ?3
             WHERE id = ?4;",
            params![
                item.title.as_str(),
                item.description.as_str(),
                item.updated_at,
                item.id.as_str(),
            ],
        )?;

        Ok(changed > 0)
    }

    fn get_item(&self, id: &str) -> RepoResult<Option<Item>> {
        let row = self
            .conn
            .query_row(
                &format!("{ITEM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_item_row,
            )
            .optional()?;

        row.map(finish_item).transpose()
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(finish_item(read_item_row(row)?)?);
        }

        Ok(items)
    }

    fn delete_item(&self, id: &str) -> RepoResult<Option<Item>> {
        let Some(existing) = self.get_item(id)? else {
            return Ok(None);
        };

        self.conn.execute("DELETE FROM items WHERE id = ?1;", [id])?;
        Ok(Some(existing))
    }
}

fn read_item_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn finish_item(item: Item) -> RepoResult<Item> {
    item.validate().map_err(|err| {
        RepoError::InvalidData(format!("items row `{}` failed validation: {err}", item.id))
    })?;
    Ok(item)
}
