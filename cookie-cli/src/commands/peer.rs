//! Peer management.

use anyhow::{Context, Result};
use cookie_client::{Peer, PeerKey};
use std::path::Path;

use crate::config;

/// Add a peer, optionally making it the default.
pub async fn add(
    config_path: &Path,
    name: &str,
    peer_name: &str,
    public_key: &str,
    make_default: bool,
) -> Result<()> {
    PeerKey::from_hex(public_key).context("Invalid peer public key")?;
    let peer = Peer::new(name, peer_name, public_key);

    config::edit(config_path, |settings| {
        settings.add_peer(peer)?;
        if make_default {
            settings.default_peer = Some(name.to_string());
        }
        Ok(())
    })
    .await?;

    println!("Added peer '{}' ({})", name, peer_name);
    Ok(())
}

/// Remove a peer by alias.
pub async fn remove(config_path: &Path, name: &str) -> Result<()> {
    let removed = config::edit(config_path, |settings| Ok(settings.remove_peer(name)?)).await?;
    println!("Removed peer '{}' ({})", removed.name, removed.peer_name);
    Ok(())
}

/// Make an existing peer the default for placeholders without a peer.
pub async fn set_default(config_path: &Path, name: &str) -> Result<()> {
    config::edit(config_path, |settings| {
        if settings.peer(name).is_none() {
            anyhow::bail!("No peer named '{}'", name);
        }
        settings.default_peer = Some(name.to_string());
        Ok(())
    })
    .await?;
    println!("Default peer: {}", name);
    Ok(())
}

/// List configured peers.
pub async fn list(config_path: &Path) -> Result<()> {
    let settings = config::load(config_path).await?;
    if settings.peers.is_empty() {
        println!("No peers configured.");
        println!();
        println!("Run 'cookie-cloud peer add <alias> <peer-name> <public-key>'");
        return Ok(());
    }

    let default = settings.resolve_peer("").map(|p| p.name.as_str());
    for peer in &settings.peers {
        let marker = if Some(peer.name.as_str()) == default { "*" } else { " " };
        println!("{} {:<12} {:<20} {}", marker, peer.name, peer.peer_name, peer.public_key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookie_client::LocalKey;
    use tempfile::tempdir;

    fn key() -> String {
        LocalKey::generate().unwrap().public_key_hex()
    }

    #[tokio::test]
    async fn add_list_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");

        add(&path, "a", "alice", &key(), false).await.unwrap();
        add(&path, "b", "bob", &format!("0x{}", key()), true).await.unwrap();
        list(&path).await.unwrap();

        let settings = config::load(&path).await.unwrap();
        assert_eq!(settings.peers.len(), 2);
        assert!(!settings.peers[1].public_key.starts_with("0x"));
        assert_eq!(settings.default_peer.as_deref(), Some("b"));

        remove(&path, "b").await.unwrap();
        let settings = config::load(&path).await.unwrap();
        assert_eq!(settings.peers.len(), 1);
        assert_eq!(settings.default_peer, None);
    }

    #[tokio::test]
    async fn duplicate_alias_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        add(&path, "a", "alice", &key(), false).await.unwrap();
        assert!(add(&path, "a", "other", &key(), false).await.is_err());
    }

    #[tokio::test]
    async fn invalid_key_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        assert!(add(&path, "a", "alice", "zz", false).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn set_default_requires_known_peer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        add(&path, "a", "alice", &key(), false).await.unwrap();

        assert!(set_default(&path, "nobody").await.is_err());
        set_default(&path, "a").await.unwrap();
        assert_eq!(
            config::load(&path).await.unwrap().default_peer.as_deref(),
            Some("a")
        );
    }

    #[tokio::test]
    async fn remove_unknown_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        assert!(remove(&path, "ghost").await.is_err());
    }
}
