//! Database row types — these map directly to SQLite rows.
//! Enum columns stay as text here and are checked when converted into
//! lostfound-types models, so the DB layer never panics on odd data.

use lostfound_types::{Account, ItemStatus, ItemWithPoster, Role};

use crate::error::{DbError, Result};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl UserRow {
    pub fn into_account(self) -> Result<Account> {
        let role = Role::from_stored(&self.role)
            .map_err(|e| DbError::CorruptRow(format!("user {}: {}", self.id, e)))?;

        Ok(Account {
            id: self.id,
            username: self.username,
            role,
        })
    }
}

pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub contact: String,
    pub image_path: Option<String>,
    pub owner_id: i64,
    pub poster: String,
}

impl ItemRow {
    pub fn into_item(self) -> Result<ItemWithPoster> {
        let status = ItemStatus::from_stored(&self.status)
            .map_err(|e| DbError::CorruptRow(format!("item {}: {}", self.id, e)))?;

        Ok(ItemWithPoster {
            id: self.id,
            name: self.name,
            description: self.description,
            status,
            contact: self.contact,
            // Earlier releases stored "" when no photo was picked.
            image_path: self.image_path.filter(|p| !p.is_empty()),
            owner_id: self.owner_id,
            poster: self.poster,
        })
    }
}
