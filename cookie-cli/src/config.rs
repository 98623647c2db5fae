//! Configuration file management for cookie-cloud.

use anyhow::{Context, Result};
use cookie_client::Settings;
use std::path::Path;

/// Load settings from `path`. A missing file yields defaults.
pub async fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Settings::from_json(&contents).context("Invalid configuration file")
}

/// Load settings, failing if the file does not exist.
pub async fn load_existing(path: &Path) -> Result<Settings> {
    if !path.exists() {
        anyhow::bail!(
            "No configuration at {}. Run 'cookie-cloud keygen --save' first.",
            path.display()
        );
    }
    load(path).await
}

/// Save settings to `path`, creating parent directories.
pub async fn save(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .context("Failed to create config directory")?;
    }
    let contents = settings.to_json_pretty()?;
    tokio::fs::write(path, contents)
        .await
        .context("Failed to save configuration")?;
    set_file_permissions_0600(path).await?;
    Ok(())
}

/// Load, apply `f`, save.
pub async fn edit<R>(path: &Path, f: impl FnOnce(&mut Settings) -> Result<R>) -> Result<R> {
    let mut settings = load(path).await?;
    let result = f(&mut settings)?;
    save(&settings, path).await?;
    Ok(result)
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookie_client::Peer;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let settings = load(&dir.path().join("none.json")).await.unwrap();
        assert_eq!(settings.cache_time, 10);
        assert!(settings.peers.is_empty());
        assert!(load_existing(&dir.path().join("none.json")).await.is_err());
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cookie-cloud.json");

        let mut settings = Settings::default();
        settings.endpoint = "https://store.example".into();
        settings.add_peer(Peer::new("a", "alice", "02aa")).unwrap();
        save(&settings, &path).await.unwrap();

        let loaded = load(&path).await.unwrap();
        assert_eq!(loaded.endpoint, "https://store.example");
        assert_eq!(loaded.peers, settings.peers);
    }

    #[tokio::test]
    async fn edit_persists_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        edit(&path, |s| {
            s.set_cache_time(3);
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(load(&path).await.unwrap().cache_time, 3);
    }

    #[tokio::test]
    async fn invalid_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        assert!(load(&path).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn config_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        save(&Settings::default(), &path).await.unwrap();

        let perms = tokio::fs::metadata(&path).await.unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600, "file should be 0600");
    }
}
