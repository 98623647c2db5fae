//! Envelope - the wire format wrapper for every stored payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::WireError;

/// An encrypted, signed payload as stored on the remote store.
///
/// The store only ever holds envelopes. The ciphertext is opaque to it, and
/// `share_keys` is indexed by digests that reveal nothing about the
/// recipients without a candidate public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sender's ephemeral public key (compressed secp256k1, hex)
    #[serde(rename = "ephPubKey")]
    pub eph_pub_key: String,
    /// AES-CBC ciphertext (base64)
    pub data: String,
    /// Wrapped content keys, `md5hex(eph_pub_key + recipient_pub_key)` → base64.
    /// Present only for multi-recipient envelopes.
    #[serde(
        rename = "shareKeys",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub share_keys: Option<BTreeMap<String, String>>,
    /// DER ECDSA signature over [`SignedFields`] (base64)
    pub signature: String,
}

/// The exact fields covered by an envelope signature.
///
/// Serialized with fixed key order and no whitespace:
/// `{"ephPubKey":"…","data":"…"}`.
#[derive(Debug, Serialize)]
pub struct SignedFields<'a> {
    /// Ephemeral public key
    #[serde(rename = "ephPubKey")]
    pub eph_pub_key: &'a str,
    /// Ciphertext
    pub data: &'a str,
}

impl SignedFields<'_> {
    /// Canonical JSON bytes to sign or verify.
    pub fn to_canonical_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }
}

impl Envelope {
    /// The fields covered by this envelope's signature.
    pub fn signed_fields(&self) -> SignedFields<'_> {
        SignedFields {
            eph_pub_key: &self.eph_pub_key,
            data: &self.data,
        }
    }

    /// Whether this envelope carries per-recipient wrapped keys.
    pub fn is_multi_recipient(&self) -> bool {
        self.share_keys.is_some()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        serde_json::from_str(json).map_err(WireError::Deserialization)
    }
}
