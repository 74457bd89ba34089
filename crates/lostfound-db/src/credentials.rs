use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};

use crate::error::{DbError, Result};

/// How new passwords are turned into stored credentials.
///
/// `Sha256` is one unsalted round, hex encoded. It is weak, but it is the
/// format every existing credential store uses, so it stays the default.
/// `Argon2` writes salted Argon2id PHC strings and still accepts the legacy
/// hex digests at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialScheme {
    #[default]
    Sha256,
    Argon2,
}

impl CredentialScheme {
    pub fn hash(&self, password: &str) -> Result<String> {
        match self {
            CredentialScheme::Sha256 => Ok(sha256_hex(password)),
            CredentialScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| DbError::Credential(e.to_string()))
            }
        }
    }
}

impl fmt::Display for CredentialScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialScheme::Sha256 => f.write_str("sha256"),
            CredentialScheme::Argon2 => f.write_str("argon2"),
        }
    }
}

impl FromStr for CredentialScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(CredentialScheme::Sha256),
            "argon2" | "argon2id" => Ok(CredentialScheme::Argon2),
            other => Err(anyhow!("Unknown credential scheme: {}", other)),
        }
    }
}

/// Lowercase hex SHA-256 of the raw password bytes.
pub fn sha256_hex(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored credential in either format.
pub fn verify(password: &str, stored: &str) -> bool {
    if stored.starts_with("$argon2") {
        PasswordHash::new(stored)
            .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
            .is_ok()
    } else {
        sha256_hex(password) == stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_matches_known_digest() {
        assert_eq!(
            sha256_hex("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_scheme_is_deterministic() {
        let scheme = CredentialScheme::Sha256;
        assert_eq!(scheme.hash("pw1").unwrap(), scheme.hash("pw1").unwrap());
        assert_ne!(scheme.hash("pw1").unwrap(), scheme.hash("pw2").unwrap());
    }

    #[test]
    fn argon2_hashes_are_salted_and_verify() {
        let scheme = CredentialScheme::Argon2;
        let a = scheme.hash("hunter2").unwrap();
        let b = scheme.hash("hunter2").unwrap();

        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(verify("hunter2", &a));
        assert!(!verify("hunter3", &a));
    }

    #[test]
    fn verify_accepts_legacy_hex() {
        let stored = sha256_hex("pw1");
        assert!(verify("pw1", &stored));
        assert!(!verify("pw2", &stored));
    }

    #[test]
    fn parses_scheme_names() {
        assert_eq!("sha256".parse::<CredentialScheme>().unwrap(), CredentialScheme::Sha256);
        assert_eq!(" Argon2 ".parse::<CredentialScheme>().unwrap(), CredentialScheme::Argon2);
        assert!("md5".parse::<CredentialScheme>().is_err());
    }
}
