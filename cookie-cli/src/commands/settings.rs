//! Endpoint, cache time and on/off switches.

use anyhow::{Context, Result};
use std::path::Path;
use url::Url;

use crate::config;

/// Set the cache lifetime in minutes. 0 disables caching.
pub async fn cache_time(config_path: &Path, minutes: i64) -> Result<()> {
    let stored = config::edit(config_path, |settings| {
        settings.set_cache_time(minutes);
        Ok(settings.cache_time)
    })
    .await?;

    if stored == 0 {
        println!("Caching disabled");
    } else {
        println!("Cache time: {} minutes", stored);
    }
    Ok(())
}

/// Set the store endpoint.
pub async fn endpoint(config_path: &Path, endpoint: &str) -> Result<()> {
    let parsed = Url::parse(endpoint).context("Invalid endpoint URL")?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Endpoint must be an http(s) URL");
    }

    config::edit(config_path, |settings| {
        settings.endpoint = endpoint.to_string();
        Ok(())
    })
    .await?;
    println!("Endpoint: {}", endpoint);
    Ok(())
}

/// Turn request rewriting on or off.
pub async fn set_enabled(config_path: &Path, enabled: bool) -> Result<()> {
    config::edit(config_path, |settings| {
        settings.enabled = enabled;
        Ok(())
    })
    .await?;
    println!("Sync {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
