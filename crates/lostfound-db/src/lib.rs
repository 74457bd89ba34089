pub mod config;
pub mod credentials;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use config::DbConfig;
pub use credentials::CredentialScheme;
pub use error::{DbError, Result};
pub use queries::{RegisterOutcome, ResolveOutcome};

/// Handle to the lost-and-found database. Owns the only connection.
pub struct Database {
    conn: Mutex<Connection>,
    scheme: CredentialScheme,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            scheme: CredentialScheme::default(),
        }
    }

    /// Use `scheme` for credentials created from now on.
    pub fn with_scheme(mut self, scheme: CredentialScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn scheme(&self) -> CredentialScheme {
        self.scheme
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }

    /// Close the connection, surfacing any error SQLite reports while doing so.
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().map_err(|_| DbError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| DbError::Sqlite(e))?;
        info!("Database closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lostfound_types::Role;

    #[test]
    fn reopening_a_file_keeps_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lost_and_found.db");

        let db = Database::open(&path).unwrap();
        assert!(matches!(
            db.register("alice", "pw1", Role::User).unwrap(),
            RegisterOutcome::Created(_)
        ));
        db.close().unwrap();

        let db = Database::open(&path).unwrap();
        let alice = db.authenticate("alice", "pw1").unwrap().unwrap();
        assert_eq!(alice.username, "alice");
        assert_eq!(
            db.with_conn(|conn| migrations::current_version(conn)).unwrap(),
            migrations::LATEST_VERSION
        );
    }

    #[test]
    fn default_scheme_is_sha256() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.scheme(), CredentialScheme::Sha256);

        let db = db.with_scheme(CredentialScheme::Argon2);
        assert_eq!(db.scheme(), CredentialScheme::Argon2);
    }
}
