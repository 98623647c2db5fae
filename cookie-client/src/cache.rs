//! DomainCache - TTL-bounded store of decrypted payloads per domain scope.
//!
//! A lookup for a request domain covers every cookie scope that can see it
//! (see [`cookie_core::cookie_scopes`]). The lookup is all-or-nothing:
//!
//! 1. With caching allowed and enabled, if every scope has a fresh entry the
//!    result comes from cache with no network call.
//! 2. Otherwise one fetch is made for the whole scope set. Every returned
//!    scope's entry is replaced, and the result is built from the fresh
//!    data only.
//!
//! A cache time of 0 or less turns caching off entirely: existing entries
//! are purged and nothing is written.
//!
//! Fetch failures never reach the caller. They are logged and the lookup
//! yields nothing; stale entries are not served in their place.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use cookie_core::{cookie_scopes, format_cookie_header};
use cookie_types::DecryptedPayload;

use crate::client::RemoteSyncClient;
use crate::config::SettingsHandle;
use crate::transport::Transport;

/// Cache key: a resolved peer alias and a scope string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    /// Peer alias
    pub peer: String,
    /// Scope, e.g. `.qq.com`
    pub scope: String,
}

impl ScopeKey {
    /// Create a key.
    pub fn new(peer: &str, scope: &str) -> Self {
        Self {
            peer: peer.to_string(),
            scope: scope.to_string(),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.peer, self.scope)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Arc<DecryptedPayload>,
    created: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created) >= ttl
    }
}

/// Scope-keyed payload cache in front of a [`RemoteSyncClient`].
pub struct DomainCache<T: Transport> {
    client: Arc<RemoteSyncClient<T>>,
    entries: DashMap<ScopeKey, CacheEntry>,
}

impl<T: Transport> DomainCache<T> {
    /// Create an empty cache.
    pub fn new(client: Arc<RemoteSyncClient<T>>) -> Self {
        Self {
            client,
            entries: DashMap::new(),
        }
    }

    /// The settings the underlying client reads.
    pub fn settings(&self) -> &SettingsHandle {
        self.client.settings()
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<RemoteSyncClient<T>> {
        &self.client
    }

    /// `Cookie` header value for `domain` and `path`: `n=v; n2=v2`.
    ///
    /// Cookies are ordered by scope (most specific first), then as the peer
    /// captured them. Empty when nothing matches or the fetch failed.
    pub async fn get_http_cookie(
        &self,
        peer: &str,
        domain: &str,
        path: &str,
        use_cache: bool,
    ) -> String {
        let payloads = self.scope_payloads(peer, domain, use_cache).await;
        format_cookie_header(payloads.iter().flat_map(|p| p.cookies.iter()), path)
    }

    /// Value of header `header_key` for `domain`.
    ///
    /// Scopes are searched most specific first. Within a scope an exact
    /// name match wins over a case-insensitive one.
    pub async fn get_http_header(
        &self,
        peer: &str,
        domain: &str,
        header_key: &str,
        use_cache: bool,
    ) -> Option<String> {
        let payloads = self.scope_payloads(peer, domain, use_cache).await;
        payloads
            .iter()
            .find_map(|p| p.header(header_key))
            .map(str::to_string)
    }

    /// Payloads for every scope of `domain` that has data, most specific
    /// first.
    pub async fn scope_payloads(
        &self,
        peer: &str,
        domain: &str,
        use_cache: bool,
    ) -> Vec<Arc<DecryptedPayload>> {
        let scopes = cookie_scopes(domain);
        if scopes.is_empty() {
            return Vec::new();
        }

        let alias = self
            .settings()
            .read(|s| s.resolve_peer(peer).map(|p| p.name.clone()))
            .unwrap_or_else(|| peer.to_string());
        let ttl = self.settings().cache_ttl();

        match ttl {
            None => {
                if !self.entries.is_empty() {
                    debug!("Caching disabled, purging {} entries", self.entries.len());
                    self.entries.clear();
                }
            }
            Some(ttl) if use_cache => {
                if let Some(cached) = self.cached(&alias, &scopes, ttl) {
                    debug!("Cache hit for {} ({} scopes)", domain, scopes.len());
                    return cached;
                }
            }
            Some(_) => {}
        }

        let mut fresh = match self.client.fetch(&alias, &scopes).await {
            Ok(fresh) => fresh,
            Err(e) if e.is_config_error() => {
                error!("Fetch for {} via peer '{}' failed: {}", domain, alias, e);
                return Vec::new();
            }
            Err(e) => {
                warn!("Fetch for {} via peer '{}' failed: {}", domain, alias, e);
                return Vec::new();
            }
        };

        let created = Instant::now();
        let mut payloads = Vec::new();
        for scope in &scopes {
            let Some(payload) = fresh.remove(scope) else {
                continue;
            };
            let payload = Arc::new(payload);
            if ttl.is_some() {
                self.entries.insert(
                    ScopeKey::new(&alias, scope),
                    CacheEntry {
                        payload: Arc::clone(&payload),
                        created,
                    },
                );
            }
            payloads.push(payload);
        }
        payloads
    }

    /// All scopes fresh, or `None`. Expired entries seen on the way are
    /// removed.
    fn cached(
        &self,
        alias: &str,
        scopes: &[String],
        ttl: Duration,
    ) -> Option<Vec<Arc<DecryptedPayload>>> {
        let now = Instant::now();
        let mut payloads = Vec::with_capacity(scopes.len());
        for scope in scopes {
            let key = ScopeKey::new(alias, scope);
            let entry = self.entries.get(&key).map(|e| e.value().clone())?;
            if entry.is_expired(now, ttl) {
                // Only drop it if no fresher entry replaced it meanwhile
                self.entries.remove_if(&key, |_, e| e.is_expired(now, ttl));
                return None;
            }
            payloads.push(entry.payload);
        }
        Some(payloads)
    }

    /// Remove one entry.
    pub fn clear_cache(&self, peer: &str, scope: &str) {
        self.entries.remove(&ScopeKey::new(peer, scope));
    }

    /// Remove every entry.
    pub fn clear_all_cache(&self) {
        self.entries.clear();
    }

    /// Keys of all entries as `peer:scope`, sorted.
    pub fn list_cached_scopes(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().to_string()).collect();
        keys.sort();
        keys
    }

    /// Number of entries, expired ones included until they are observed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Transport> fmt::Debug for DomainCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
