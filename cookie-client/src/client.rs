//! RemoteSyncClient - the store round trip.
//!
//! This module provides [`RemoteSyncClient`], which turns a peer alias and
//! a list of domain scopes into decrypted payloads.
//!
//! # Architecture
//!
//! ```text
//! DomainCache → RemoteSyncClient → Transport → Store
//!                      ↓
//!               crypto (open envelopes)
//! ```
//!
//! One call is one batched request: every scope becomes a [`RemoteId`], and
//! each returned record is opened as a multi-recipient envelope signed by
//! the peer. Records that fail to open are skipped, so one bad record
//! never hides the others.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use cookie_types::{DecryptedPayload, GetRequest, RemoteId};

use crate::config::{Peer, SettingsHandle};
use crate::crypto::{self, CryptoError, LocalKey, PeerKey};
use crate::transport::{Transport, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Crypto error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The store reported an application-level failure.
    #[error("remote error {code}: {message}")]
    Remote {
        /// Store status code
        code: i64,
        /// Store message
        message: String,
    },

    /// No configured peer has this alias.
    #[error("peer not found: {0}")]
    PeerNotFound(String),

    /// No store endpoint is configured.
    #[error("endpoint not configured")]
    EndpointNotConfigured,

    /// No local private key is configured.
    #[error("local private key not configured")]
    LocalKeyNotConfigured,
}

impl ClientError {
    /// Whether this error needs operator attention (settings are wrong or
    /// missing) rather than being a transient fetch failure.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::PeerNotFound(_)
                | ClientError::EndpointNotConfigured
                | ClientError::LocalKeyNotConfigured
                | ClientError::Crypto(CryptoError::InvalidKeyFormat(_))
        )
    }
}

/// Fetches and opens a peer's records from the store.
#[derive(Debug)]
pub struct RemoteSyncClient<T: Transport> {
    settings: SettingsHandle,
    transport: T,
}

impl<T: Transport> RemoteSyncClient<T> {
    /// Create a client reading `settings` on every call.
    pub fn new(settings: SettingsHandle, transport: T) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// The settings this client reads.
    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    /// Get the transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The remote id of `peer`'s record for `domain`.
    pub fn calculate_id(peer: &Peer, domain: &str) -> RemoteId {
        let key = peer.public_key.as_str();
        let public_key = key
            .strip_prefix("0x")
            .or_else(|| key.strip_prefix("0X"))
            .unwrap_or(key);
        RemoteId::calculate(public_key, domain, &peer.peer_name)
    }

    /// Fetch and open `peer_alias`'s records for `domains`.
    ///
    /// An empty alias selects the default peer. The result holds one entry
    /// per domain the store had a readable record for.
    pub async fn fetch(
        &self,
        peer_alias: &str,
        domains: &[String],
    ) -> Result<HashMap<String, DecryptedPayload>, ClientError> {
        let (peer, endpoint, local_key) = self.settings.read(|s| {
            (
                s.resolve_peer(peer_alias).cloned(),
                s.endpoint.trim().to_string(),
                s.local_key(),
            )
        });

        let peer = peer.ok_or_else(|| ClientError::PeerNotFound(peer_alias.to_string()))?;
        if endpoint.is_empty() {
            return Err(ClientError::EndpointNotConfigured);
        }
        let local_key = local_key?.ok_or(ClientError::LocalKeyNotConfigured)?;
        let sender = PeerKey::from_hex(&peer.public_key)?;

        // id → domain, first occurrence wins
        let mut by_id: HashMap<RemoteId, &str> = HashMap::new();
        let mut ids = Vec::new();
        for domain in domains {
            let id = Self::calculate_id(&peer, domain);
            if !by_id.contains_key(&id) {
                by_id.insert(id.clone(), domain);
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!("Fetching {} scopes for peer {}", ids.len(), peer.name);
        let response = self.transport.get(&endpoint, &GetRequest::new(ids)).await?;
        if !response.is_success() {
            return Err(ClientError::Remote {
                code: response.code,
                message: response.message().to_string(),
            });
        }

        let mut payloads = HashMap::new();
        for (id, record) in response.into_records() {
            let Some(domain) = by_id.get(&RemoteId::from_hex(id.as_str())) else {
                debug!("Ignoring unrequested id {}", id);
                continue;
            };
            match open_record(&record.data, &local_key, &sender) {
                Ok(payload) => {
                    payloads.insert(domain.to_string(), payload);
                }
                Err(e) => warn!("Skipping record for {} from {}: {}", domain, peer.name, e),
            }
        }

        debug!("Opened {} of {} scopes", payloads.len(), by_id.len());
        Ok(payloads)
    }
}

fn open_record(
    data: &str,
    local_key: &LocalKey,
    sender: &PeerKey,
) -> Result<DecryptedPayload, CryptoError> {
    let plaintext = crypto::open_shared_json(data, local_key, sender)?;
    DecryptedPayload::from_json_bytes(&plaintext)
        .map_err(|e| CryptoError::MalformedEnvelope(e.to_string()))
}
