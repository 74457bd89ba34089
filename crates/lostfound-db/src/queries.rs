use lostfound_types::{Account, ItemStatus, ItemUpdate, ItemWithPoster, NewItem, Role};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::credentials;
use crate::error::{DbError, Result, is_foreign_key_violation, is_unique_violation};
use crate::models::{ItemRow, UserRow};
use crate::Database;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(Account),
    UsernameTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Returned,
    AlreadyReturned,
}

const ITEM_COLUMNS: &str =
    "i.id, i.name, i.description, i.status, i.contact, i.image_path, i.owner_id, u.username";

impl Database {
    // -- Accounts --

    /// Create an account. A taken username is an outcome, not an error.
    pub fn register(&self, username: &str, password: &str, role: Role) -> Result<RegisterOutcome> {
        let password_hash = self.scheme().hash(password)?;

        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
                (username, &password_hash, role.as_str()),
            );

            match inserted {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    info!("Registered account {} ({}) as {}", id, username, role);
                    Ok(RegisterOutcome::Created(Account {
                        id,
                        username: username.to_string(),
                        role,
                    }))
                }
                Err(e) if is_unique_violation(&e) => {
                    info!("Registration rejected, username taken: {}", username);
                    Ok(RegisterOutcome::UsernameTaken)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Look up the account matching both username and password.
    /// Unknown user and wrong password are indistinguishable. Stored
    /// credentials verify in whichever format they were written, so changing
    /// the scheme never locks out existing accounts.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Account>> {
        let row = self
            .with_conn(|conn| query_user_by_username(conn, username))?
            .filter(|row| credentials::verify(password, &row.password_hash));

        match row {
            Some(row) => {
                let account = row.into_account()?;
                debug!("Authenticated {} ({})", account.username, account.id);
                Ok(Some(account))
            }
            None => {
                debug!("Authentication failed for {}", username);
                Ok(None)
            }
        }
    }

    // -- Items --

    /// Insert a report and return its id.
    pub fn create_item(&self, item: &NewItem) -> Result<i64> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO items (name, description, status, contact, image_path, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    item.name,
                    item.description,
                    item.status.as_str(),
                    item.contact,
                    item.image_path,
                    item.owner_id,
                ],
            );

            match inserted {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    debug!(
                        "Created item {} ({}) for account {}",
                        id, item.status, item.owner_id
                    );
                    Ok(id)
                }
                Err(e) if is_foreign_key_violation(&e) => {
                    Err(DbError::AccountNotFound(item.owner_id))
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Every item with its poster's username. No ordering is imposed.
    pub fn list_items(&self) -> Result<Vec<ItemWithPoster>> {
        let rows = self.with_conn(query_items)?;
        rows.into_iter().map(ItemRow::into_item).collect()
    }

    pub fn get_item(&self, id: i64) -> Result<Option<ItemWithPoster>> {
        self.with_conn(|conn| query_item(conn, id))?
            .map(ItemRow::into_item)
            .transpose()
    }

    /// Overwrite every mutable field of an item. `id` and `owner_id` are kept.
    pub fn update_item(&self, actor: &Account, id: i64, update: &ItemUpdate) -> Result<()> {
        self.with_conn(|conn| {
            authorize(conn, actor, id)?;

            conn.execute(
                "UPDATE items
                 SET name = ?1, description = ?2, status = ?3, contact = ?4, image_path = ?5
                 WHERE id = ?6",
                rusqlite::params![
                    update.name,
                    update.description,
                    update.status.as_str(),
                    update.contact,
                    update.image_path,
                    id,
                ],
            )?;

            debug!("Account {} updated item {}", actor.id, id);
            Ok(())
        })
    }

    /// Close a report by moving it to `Returned`.
    pub fn mark_returned(&self, actor: &Account, id: i64) -> Result<ResolveOutcome> {
        self.with_conn(|conn| {
            let status = authorize(conn, actor, id)?;
            if status == ItemStatus::Returned.as_str() {
                return Ok(ResolveOutcome::AlreadyReturned);
            }

            conn.execute(
                "UPDATE items SET status = ?1 WHERE id = ?2",
                rusqlite::params![ItemStatus::Returned.as_str(), id],
            )?;

            info!("Account {} marked item {} as returned", actor.id, id);
            Ok(ResolveOutcome::Returned)
        })
    }

    pub fn delete_item(&self, actor: &Account, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            authorize(conn, actor, id)?;
            conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
            info!("Account {} deleted item {}", actor.id, id);
            Ok(())
        })
    }
}

/// Check that `actor` may change item `id`; returns the item's current status.
/// Rows with no owner can only be touched by admins.
fn authorize(conn: &Connection, actor: &Account, id: i64) -> Result<String> {
    let (owner_id, status): (Option<i64>, String) = conn
        .query_row(
            "SELECT owner_id, status FROM items WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or(DbError::ItemNotFound(id))?;

    let permitted = match owner_id {
        Some(owner) => actor.can_modify(owner),
        None => actor.is_admin(),
    };

    if !permitted {
        warn!("Account {} denied modification of item {}", actor.id, id);
        return Err(DbError::Forbidden {
            actor: actor.id,
            item: id,
        });
    }

    Ok(status)
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: row.get(3)?,
    })
}

fn map_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        contact: row.get(4)?,
        image_path: row.get(5)?,
        owner_id: row.get(6)?,
        poster: row.get(7)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn
        .prepare("SELECT id, username, password_hash, role FROM users WHERE username = ?1")?;

    let row = stmt.query_row([username], map_user).optional()?;
    Ok(row)
}

fn query_items(conn: &Connection) -> Result<Vec<ItemRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM items i JOIN users u ON i.owner_id = u.id",
        ITEM_COLUMNS
    ))?;

    let rows = stmt
        .query_map([], map_item)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_item(conn: &Connection, id: i64) -> Result<Option<ItemRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM items i JOIN users u ON i.owner_id = u.id WHERE i.id = ?1",
        ITEM_COLUMNS
    ))?;

    let row = stmt.query_row([id], map_item).optional()?;
    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
