//! Local key management.

use anyhow::{Context, Result};
use cookie_client::generate_key_pair;
use std::path::Path;

use crate::config;

/// Run the keygen command.
pub async fn keygen(config_path: &Path, save: bool, force: bool) -> Result<()> {
    let pair = generate_key_pair()?;

    if !save {
        println!("Private key: {}", pair.private_key.as_str());
        println!("Public key:  {}", pair.public_key);
        return Ok(());
    }

    config::edit(config_path, |settings| {
        if !settings.local_private_key.is_empty() && !force {
            anyhow::bail!(
                "A local key is already configured in {}. Use --force to replace it.",
                config_path.display()
            );
        }
        settings.set_local_private_key(&pair.private_key);
        Ok(())
    })
    .await?;

    println!("Local key saved to {}", config_path.display());
    println!();
    println!("  Public key: {}", pair.public_key);
    println!();
    println!("Share the public key with the peers that publish for you.");
    Ok(())
}

/// Run the pubkey command.
pub async fn pubkey(config_path: &Path) -> Result<()> {
    let settings = config::load_existing(config_path).await?;
    let public_key = settings
        .local_public_key()
        .context("Configured local key is invalid")?
        .context("No local key configured. Run 'cookie-cloud keygen --save'.")?;
    println!("{}", public_key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn keygen_without_save_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        keygen(&path, false, false).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn keygen_save_stores_usable_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        keygen(&path, true, false).await.unwrap();

        let settings = config::load(&path).await.unwrap();
        assert_eq!(settings.local_private_key.len(), 64);
        assert!(settings.local_key().unwrap().is_some());
        pubkey(&path).await.unwrap();
    }

    #[tokio::test]
    async fn keygen_save_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        keygen(&path, true, false).await.unwrap();
        let first = config::load(&path).await.unwrap().local_private_key;

        assert!(keygen(&path, true, false).await.is_err());
        assert_eq!(config::load(&path).await.unwrap().local_private_key, first);

        keygen(&path, true, true).await.unwrap();
        assert_ne!(config::load(&path).await.unwrap().local_private_key, first);
    }

    #[tokio::test]
    async fn pubkey_without_key_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        assert!(pubkey(&path).await.is_err());

        config::save(&cookie_client::Settings::default(), &path).await.unwrap();
        assert!(pubkey(&path).await.is_err());
    }
}
