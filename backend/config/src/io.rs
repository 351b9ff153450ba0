//! Config file location and loading.

use crate::schema::WisemonkConfig;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "WISEMONK_CONFIG";

/// `~/.wisemonk/`, or `.wisemonk` when there is no home directory.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".wisemonk"))
        .unwrap_or_else(|| PathBuf::from(".wisemonk"))
}

/// Resolve the config file: explicit flag, then `WISEMONK_CONFIG`, then
/// `~/.wisemonk/config.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => config_dir().join(CONFIG_FILE_NAME),
    }
}

/// Read the config file into an untyped tree. YAML and JSON are both accepted.
pub async fn read_config_value(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config at: {}", path.display()))?;
    if !value.is_object() {
        bail!("Config at {} must be a mapping", path.display());
    }
    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Read and deserialize the config file as written, without env substitution.
pub async fn load_config(path: &Path) -> Result<WisemonkConfig> {
    let value = read_config_value(path).await?;
    serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure at: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"token": "xoxb-1", "channels": {"C1": {"interval": "5m", "maxmsg": 2}}}"#,
        )
        .unwrap();

        let cfg = load_config(&path).await.unwrap();
        assert_eq!(cfg.token, "xoxb-1");
        assert_eq!(cfg.channels["C1"].maxmsg, 2);
    }

    #[tokio::test]
    async fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn scalar_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "just a string").unwrap();
        assert!(read_config_value(&path).await.is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_file_path(Some(Path::new("/etc/wisemonk.yaml")));
        assert_eq!(path, PathBuf::from("/etc/wisemonk.yaml"));
    }
}
