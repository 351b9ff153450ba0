//! `wisemonk-config`: runtime configuration for the wisemonk monitor.
//!
//! Provides:
//! - Typed config schema (Slack, Discourse, channels, server, logging)
//! - YAML/JSON loading and config path resolution
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::{apply_all_defaults, DEFAULT_PORT};
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, read_config_value, CONFIG_ENV_VAR};
pub use redact::redact;
pub use schema::{ChannelConfig, LoggingConfig, ServerConfig, WisemonkConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute env vars, apply defaults and validate.
///
/// This is the main entry point for loading a config at runtime. Validation
/// errors abort the load; warnings are logged.
pub async fn load_and_prepare(path: &Path) -> Result<WisemonkConfig> {
    let value = read_config_value(path).await?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    prepare(value)
}

/// [`load_and_prepare`] with an explicit environment.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<WisemonkConfig> {
    let value = read_config_value(path).await?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    prepare(value)
}

fn prepare(value: Value) -> Result<WisemonkConfig> {
    let config: WisemonkConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{first} ({} error(s) in total)", report.errors.len());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn prepares_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "
token: ${SLACK_TOKEN}
signing_secret: s3cret
discourseprefix: https://discuss.example.com
discoursekey: ${DISCOURSE_KEY}
channels:
  C0GBJCH9Z:
    interval: 5m
    maxmsg: 20
    search_over: [Users]
    create_topic_in: Slack
",
        );
        let env: HashMap<String, String> = [
            ("SLACK_TOKEN".to_string(), "xoxb-9".to_string()),
            ("DISCOURSE_KEY".to_string(), "k".to_string()),
        ]
        .into();

        let cfg = load_and_prepare_with(&path, &env).await.unwrap();
        assert_eq!(cfg.token, "xoxb-9");
        assert_eq!(cfg.discoursekey, "k");
        assert_eq!(cfg.discourse_user(), "wisemonk");
        assert_eq!(cfg.bind_address(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn validation_errors_abort() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "channels:\n  C1:\n    interval: 5m\n    maxmsg: 2\n");
        let err = load_and_prepare_with(&path, &HashMap::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[tokio::test]
    async fn missing_env_var_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "token: ${NOT_SET_ANYWHERE}\n");
        assert!(load_and_prepare_with(&path, &HashMap::new()).await.is_err());
    }
}
