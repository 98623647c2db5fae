//! Read synced records from the store.

use anyhow::{Context, Result};
use cookie_client::{DomainCache, RemoteSyncClient, Settings, SettingsHandle, Transport};
use cookie_core::cookie_scopes;
use serde_json::json;
use std::sync::Arc;
use url::Url;

/// Fetch every scope of `domain` and render the decrypted payloads as JSON,
/// most specific scope first.
pub async fn fetch<T: Transport>(
    settings: Settings,
    transport: T,
    peer: &str,
    domain: &str,
) -> Result<String> {
    let scopes = cookie_scopes(domain);
    if scopes.is_empty() {
        anyhow::bail!("Empty domain");
    }

    let client = RemoteSyncClient::new(SettingsHandle::new(settings), transport);
    let mut records = client
        .fetch(peer, &scopes)
        .await
        .with_context(|| format!("Fetch for {} failed", domain))?;

    let found: Vec<_> = scopes
        .iter()
        .filter_map(|scope| {
            records
                .remove(scope)
                .map(|payload| json!({ "scope": scope, "payload": payload }))
        })
        .collect();
    Ok(serde_json::to_string_pretty(&found)?)
}

/// The `Cookie` header value the peer's records produce for `url`.
pub async fn cookie<T: Transport>(
    settings: Settings,
    transport: T,
    peer: &str,
    url: &str,
    force: bool,
) -> Result<String> {
    let parsed = Url::parse(url).context("Invalid URL")?;
    let domain = parsed.host_str().context("URL has no host")?;

    let client = RemoteSyncClient::new(SettingsHandle::new(settings), transport);
    let cache = DomainCache::new(Arc::new(client));
    Ok(cache
        .get_http_cookie(peer, domain, parsed.path(), !force)
        .await)
}
