use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::ImagePreview;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown role: {0}")]
    Role(String),
    #[error("unknown item status: {0}")]
    Status(String),
}

// -- Accounts --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// The exact text stored in `users.role`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }

    /// Parse the exact text written to `users.role`. Unlike `FromStr`, which
    /// accepts user input in any case, anything but `User`/`Admin` is rejected.
    pub fn from_stored(s: &str) -> Result<Self, ParseError> {
        match s {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            _ => Err(ParseError::Role(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(ParseError::Role(s.to_string())),
        }
    }
}

/// Identity returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may modify any item; everyone else only their own.
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

// -- Items --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Lost,
    Found,
    Returned,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Lost => "Lost",
            ItemStatus::Found => "Found",
            ItemStatus::Returned => "Returned",
        }
    }

    /// Statuses a new report may be posted with. `Returned` is only reached
    /// through the resolve action.
    pub fn is_postable(&self) -> bool {
        matches!(self, ItemStatus::Lost | ItemStatus::Found)
    }

    /// Parse the exact text written to `items.status`.
    pub fn from_stored(s: &str) -> Result<Self, ParseError> {
        match s {
            "Lost" => Ok(ItemStatus::Lost),
            "Found" => Ok(ItemStatus::Found),
            "Returned" => Ok(ItemStatus::Returned),
            _ => Err(ParseError::Status(s.to_string())),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lost" => Ok(ItemStatus::Lost),
            "found" => Ok(ItemStatus::Found),
            "returned" => Ok(ItemStatus::Returned),
            _ => Err(ParseError::Status(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub status: ItemStatus,
    pub contact: String,
    pub image_path: Option<String>,
    pub owner_id: i64,
}

/// Every mutable field of an item. Applied as a full overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub description: String,
    pub status: ItemStatus,
    pub contact: String,
    pub image_path: Option<String>,
}

/// An item joined with the username of the account that posted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWithPoster {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: ItemStatus,
    pub contact: String,
    pub image_path: Option<String>,
    pub owner_id: i64,
    pub poster: String,
}

impl ItemWithPoster {
    pub fn image_preview(&self) -> ImagePreview {
        ImagePreview::resolve(self.image_path.as_deref())
    }

    /// The current fields as an update, for edits that change only some of them.
    pub fn to_update(&self) -> ItemUpdate {
        ItemUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            contact: self.contact.clone(),
            image_path: self.image_path.clone(),
        }
    }
}
