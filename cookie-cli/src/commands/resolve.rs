//! Resolve placeholders in a set of request headers.

use anyhow::{Context, Result};
use cookie_client::{
    DomainCache, Header, PatternResolver, RemoteSyncClient, Settings, SettingsHandle, Transport,
};
use std::sync::Arc;

/// Parse `Name: value`. The value may be empty.
pub fn parse_header(raw: &str) -> Result<Header> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header '{}' is not in 'Name: value' form", raw))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Header '{}' has no name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Rewrite `headers` for a request to `url`. Unchanged headers come back
/// as given.
pub async fn resolve<T: Transport>(
    settings: Settings,
    transport: T,
    url: &str,
    headers: Vec<Header>,
) -> Result<Vec<Header>> {
    if !settings.enabled {
        anyhow::bail!("Sync is disabled. Run 'cookie-cloud enable' first.");
    }

    let client = RemoteSyncClient::new(SettingsHandle::new(settings), transport);
    let resolver = PatternResolver::new(Arc::new(DomainCache::new(Arc::new(client))));
    let rewritten = resolver.rewrite_request(url, &headers).await?;
    Ok(rewritten.unwrap_or(headers))
}

/// Run the resolve command.
pub async fn run<T: Transport>(
    settings: Settings,
    transport: T,
    url: &str,
    raw_headers: &[String],
) -> Result<()> {
    let headers = raw_headers
        .iter()
        .map(|h| parse_header(h))
        .collect::<Result<Vec<_>>>()?;
    for (name, value) in resolve(settings, transport, url, headers).await? {
        println!("{}: {}", name, value);
    }
    Ok(())
}
