use chrono::{DateTime, Utc};
use serde::Serialize;

/// One key as reported by the engine's key listing.
///
/// The crate never parses key material; every field here is copied
/// from the engine's machine-readable listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyListing {
    pub fingerprint: String,
    pub key_id: String,
    /// User identities in the order the engine lists them.
    pub uids: Vec<String>,
    /// True when the entry came from the secret-key listing.
    pub secret: bool,
    pub algorithm: Option<u32>,
    pub length: Option<u32>,
    pub validity: Option<char>,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
}

impl KeyListing {
    /// The first user identity, which is what encryption targets by name.
    pub fn primary_uid(&self) -> Option<&str> {
        self.uids.first().map(|s| s.as_str())
    }

    /// Whether `fingerprint` names this key. Case-insensitive, and a
    /// trailing key-id suffix also matches.
    pub fn matches_fingerprint(&self, fingerprint: &str) -> bool {
        if self.fingerprint.is_empty() || fingerprint.is_empty() {
            return false;
        }
        let ours = self.fingerprint.to_ascii_uppercase();
        let theirs = fingerprint.to_ascii_uppercase();
        ours == theirs || ours.ends_with(&theirs)
    }
}

impl std::fmt::Display for KeyListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.primary_uid() {
            Some(uid) => write!(f, "{} {}", self.fingerprint, uid),
            None => write!(f, "{}", self.fingerprint),
        }
    }
}
