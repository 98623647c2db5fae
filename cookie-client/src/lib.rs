//! # cookie-client
//!
//! Client library for Cookie Cloud end-to-end encrypted cookie and header
//! sync.
//!
//! A browser peer exports the cookies and headers it sees per domain,
//! encrypts them for a set of recipients and uploads them to a store. This
//! crate is the receiving side: it fetches those records, opens them, caches
//! them per domain scope, and splices them into outgoing requests through
//! `!{..}` / `${..}` placeholders.
//!
//! ## Features
//!
//! - **E2E Encryption**: secp256k1 ECDH, AES-256-CBC, ECDSA signatures
//! - **Multi-Recipient Envelopes**: one ciphertext, one wrapped key per peer
//! - **Domain-Scoped Cache**: TTL-bounded, all-or-nothing refresh per domain
//! - **Transport Abstraction**: Pluggable transport layer (HTTP, mock)
//!
//! ## Example
//!
//! ```ignore
//! use cookie_client::{
//!     DomainCache, HttpTransport, PatternResolver, RemoteSyncClient, Settings, SettingsHandle,
//! };
//! use std::sync::Arc;
//!
//! let settings = SettingsHandle::new(Settings::from_json(&config_json)?);
//! let client = Arc::new(RemoteSyncClient::new(settings, HttpTransport::new()?));
//! let cache = Arc::new(DomainCache::new(client));
//! let resolver = PatternResolver::new(cache);
//!
//! let headers = vec![("Cookie".to_string(), "sid=${alice}".to_string())];
//! if let Some(rewritten) = resolver.rewrite_request("https://www.qq.com/", &headers).await? {
//!     // send `rewritten` instead of `headers`
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod client;
pub mod config;
pub mod crypto;
pub mod resolver;
pub mod transport;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::{DomainCache, ScopeKey};
pub use client::{ClientError, RemoteSyncClient};
pub use config::{ConfigError, Peer, Settings, SettingsHandle};
pub use crypto::{
    derive_shared_secret, generate_key_pair, open, open_shared, open_shared_json, recipient_hash,
    seal, seal_for_recipients, sign, verify, CryptoError, KeyPair, LocalKey, PeerKey, IV_SIZE,
    KEY_SIZE,
};
pub use resolver::{Header, PatternResolver, ResolveError};
pub use transport::{HttpTransport, MockTransport, Transport, TransportError, DEFAULT_TIMEOUT};
