use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    #[error("Account {actor} may not modify item {item}")]
    Forbidden { actor: i64, item: i64 },

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("Credential hashing failed: {0}")]
    Credential(String),

    #[error("DB lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    /// Engine-level failures with no recovery path. Everything else is an
    /// outcome the caller can report and move on from.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            DbError::CorruptRow(_)
                | DbError::Credential(_)
                | DbError::LockPoisoned
                | DbError::Sqlite(_)
        )
    }
}

/// Extended result code of a failed statement, if SQLite reported one.
pub(crate) fn extended_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => Some(e.extended_code),
        _ => None,
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    extended_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    extended_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}
