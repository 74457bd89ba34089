use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::credentials::CredentialScheme;
use crate::Database;

pub const DEFAULT_DB_PATH: &str = "lost_and_found.db";

/// Storage settings, read from `LOSTFOUND_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub path: PathBuf,
    pub scheme: CredentialScheme,
}

impl DbConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("LOSTFOUND_DB_PATH")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.into())
            .into();

        let scheme = match lookup("LOSTFOUND_CREDENTIAL_SCHEME") {
            Some(v) if !v.is_empty() => v
                .parse::<CredentialScheme>()
                .context("LOSTFOUND_CREDENTIAL_SCHEME must be sha256 or argon2")?,
            _ => CredentialScheme::default(),
        };

        Ok(Self { path, scheme })
    }

    pub fn open(&self) -> Result<Database> {
        let db = Database::open(&self.path)
            .with_context(|| format!("Failed to open database at {}", self.path.display()))?;
        Ok(db.with_scheme(self.scheme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = DbConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.path, PathBuf::from("lost_and_found.db"));
        assert_eq!(config.scheme, CredentialScheme::Sha256);
    }

    #[test]
    fn reads_overrides() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("LOSTFOUND_DB_PATH", "/tmp/board.db"),
            ("LOSTFOUND_CREDENTIAL_SCHEME", "argon2"),
        ]))
        .unwrap();
        assert_eq!(config.path, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.scheme, CredentialScheme::Argon2);
    }

    #[test]
    fn rejects_unknown_scheme() {
        let result =
            DbConfig::from_lookup(lookup_from(&[("LOSTFOUND_CREDENTIAL_SCHEME", "plaintext")]));
        assert!(result.is_err());
    }

    #[test]
    fn open_applies_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig {
            path: dir.path().join("board.db"),
            scheme: CredentialScheme::Argon2,
        };
        let db = config.open().unwrap();
        assert_eq!(db.scheme(), CredentialScheme::Argon2);
    }
}
