//! Settings read by the client on every call.
//!
//! The JSON layout is the one the cookie-cloud config file uses
//! (`cookie-cloud.json`), so files written by other tools load unchanged.
//! Loading and saving the file is left to the caller.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;

use crate::crypto::{CryptoError, LocalKey};

/// Settings errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A peer with this alias already exists.
    #[error("peer already exists: {0}")]
    DuplicatePeer(String),

    /// No peer matched.
    #[error("peer not found: {0}")]
    PeerNotFound(String),
}

/// A peer whose records we read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    /// Local alias, unique within the settings (used in placeholders)
    pub name: String,
    /// The name the peer publishes records under
    pub peer_name: String,
    /// The peer's public key, hex without `0x`
    pub public_key: String,
}

impl Peer {
    /// Create a peer. A `0x` prefix on the key is stripped.
    pub fn new(name: &str, peer_name: &str, public_key: &str) -> Self {
        Self {
            name: name.to_string(),
            peer_name: peer_name.to_string(),
            public_key: strip_0x(public_key).to_string(),
        }
    }
}

/// Client settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Whether request rewriting is active
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the remote store
    #[serde(default)]
    pub endpoint: String,
    /// Our private key, hex without `0x`
    #[serde(default)]
    pub local_private_key: String,
    /// Cache lifetime in minutes; 0 or less disables caching
    #[serde(default = "default_cache_time", alias = "cacheTimeMinutes")]
    pub cache_time: i64,
    /// Configured peers
    #[serde(default)]
    pub peers: Vec<Peer>,
    /// Alias used when a placeholder names no peer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_peer: Option<String>,
}

fn default_cache_time() -> i64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            local_private_key: String::new(),
            cache_time: default_cache_time(),
            peers: Vec::new(),
            default_peer: None,
        }
    }
}

// Don't leak the private key in debug output
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("local_private_key", &"[REDACTED]")
            .field("cache_time", &self.cache_time)
            .field("peers", &self.peers)
            .field("default_peer", &self.default_peer)
            .finish()
    }
}

impl Settings {
    /// Parse settings JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pretty-printed settings JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Cache lifetime, or `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        u64::try_from(self.cache_time)
            .ok()
            .filter(|&m| m > 0)
            .map(|m| Duration::from_secs(m.saturating_mul(60)))
    }

    /// Set the cache lifetime in minutes. Negative values become 0.
    pub fn set_cache_time(&mut self, minutes: i64) {
        self.cache_time = minutes.max(0);
    }

    /// Set our private key. A `0x` prefix is stripped.
    pub fn set_local_private_key(&mut self, private_key: &str) {
        self.local_private_key = strip_0x(private_key.trim()).to_string();
    }

    /// Parse the configured private key, `None` if unset.
    pub fn local_key(&self) -> Result<Option<LocalKey>, CryptoError> {
        if self.local_private_key.trim().is_empty() {
            return Ok(None);
        }
        LocalKey::from_hex(&self.local_private_key).map(Some)
    }

    /// Public key of the configured private key.
    pub fn local_public_key(&self) -> Result<Option<String>, CryptoError> {
        Ok(self.local_key()?.map(|k| k.public_key_hex()))
    }

    /// Find a peer by alias.
    pub fn peer(&self, name: &str) -> Option<&Peer> {
        self.peers.iter().find(|p| p.name == name)
    }

    /// Find a peer by alias, where an empty alias selects the default peer:
    /// `defaultPeer` if set, else the first configured peer.
    pub fn resolve_peer(&self, name: &str) -> Option<&Peer> {
        if !name.is_empty() {
            return self.peer(name);
        }
        match &self.default_peer {
            Some(default) => self.peer(default),
            None => self.peers.first(),
        }
    }

    /// Add a peer. Aliases must be unique.
    pub fn add_peer(&mut self, peer: Peer) -> Result<(), ConfigError> {
        if self.peer(&peer.name).is_some() {
            return Err(ConfigError::DuplicatePeer(peer.name));
        }
        self.peers.push(peer);
        Ok(())
    }

    /// Remove a peer by alias.
    pub fn remove_peer(&mut self, name: &str) -> Result<Peer, ConfigError> {
        let index = self
            .peers
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::PeerNotFound(name.to_string()))?;
        if self.default_peer.as_deref() == Some(name) {
            self.default_peer = None;
        }
        Ok(self.peers.remove(index))
    }

    /// Remove the peer at `index`, if any.
    pub fn remove_peer_at(&mut self, index: usize) -> Option<Peer> {
        (index < self.peers.len()).then(|| self.peers.remove(index))
    }

    /// Replace the peer with alias `name`.
    pub fn update_peer(&mut self, name: &str, peer: Peer) -> Result<(), ConfigError> {
        self.replace_peer(|p| p.name == name, name, peer)
    }

    /// Replace the peer publishing under `peer_name`.
    pub fn update_peer_by_peer_name(
        &mut self,
        peer_name: &str,
        peer: Peer,
    ) -> Result<(), ConfigError> {
        self.replace_peer(|p| p.peer_name == peer_name, peer_name, peer)
    }

    /// Replace the peer with public key `public_key`.
    pub fn update_peer_by_public_key(
        &mut self,
        public_key: &str,
        peer: Peer,
    ) -> Result<(), ConfigError> {
        let key = strip_0x(public_key);
        self.replace_peer(|p| p.public_key.eq_ignore_ascii_case(key), public_key, peer)
    }

    /// Remove every peer.
    pub fn clear_peers(&mut self) {
        self.peers.clear();
        self.default_peer = None;
    }

    fn replace_peer<F>(&mut self, matches: F, label: &str, peer: Peer) -> Result<(), ConfigError>
    where
        F: Fn(&Peer) -> bool,
    {
        let index = self
            .peers
            .iter()
            .position(matches)
            .ok_or_else(|| ConfigError::PeerNotFound(label.to_string()))?;

        let clashes = self
            .peers
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.name == peer.name);
        if clashes {
            return Err(ConfigError::DuplicatePeer(peer.name));
        }

        self.peers[index] = peer;
        Ok(())
    }
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Shared, live view of [`Settings`].
///
/// Clones share the same settings, and edits are seen by every holder on
/// its next read.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsHandle {
    /// Wrap `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Read through a closure.
    pub fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    /// Edit through a closure.
    pub fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }

    /// A copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.read(Settings::clone)
    }

    /// Whether request rewriting is active.
    pub fn enabled(&self) -> bool {
        self.read(|s| s.enabled)
    }

    /// Current cache lifetime, `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.read(Settings::cache_ttl)
    }
}
