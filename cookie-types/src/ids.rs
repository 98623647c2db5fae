//! Identity types for Cookie Cloud.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one (peer, domain) record on the remote store.
///
/// `hex(SHA-256(public_key + ":" + domain + ":" + peer_name))`. The store
/// only ever sees this digest, never the domain itself.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    /// Derive the id for a peer's record of `domain`.
    pub fn calculate(public_key: &str, domain: &str, peer_name: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(public_key.as_bytes());
        hasher.update(b":");
        hasher.update(domain.as_bytes());
        hasher.update(b":");
        hasher.update(peer_name.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an id string received from the store.
    pub fn from_hex(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The lowercase hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.0.get(..12).unwrap_or(&self.0);
        write!(f, "RemoteId({})", short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_id_matches_known_digest() {
        let id = RemoteId::calculate("02abc", "www.qq.com", "alice");
        assert_eq!(
            id.as_str(),
            "10479f81cc6aa19981cfab247acd8a337f2ec6e968ee5e1c0176cb7f888061fc"
        );
    }

    #[test]
    fn remote_id_is_64_hex_chars() {
        let id = RemoteId::calculate("02ff", ".qq.com", "bob");
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn remote_id_deterministic() {
        let a = RemoteId::calculate("02ff", "x.com", "bob");
        let b = RemoteId::calculate("02ff", "x.com", "bob");
        assert_eq!(a, b);
    }

    #[test]
    fn remote_id_differs_per_domain_and_peer() {
        let base = RemoteId::calculate("02ff", "x.com", "bob");
        assert_ne!(base, RemoteId::calculate("02ff", ".x.com", "bob"));
        assert_ne!(base, RemoteId::calculate("02ff", "x.com", "alice"));
        assert_ne!(base, RemoteId::calculate("03ff", "x.com", "bob"));
    }

    #[test]
    fn remote_id_serializes_as_plain_string() {
        let id = RemoteId::from_hex("abcd");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abcd\"");
    }
}
