//! Process configuration
//!
//! Built once in `main` and handed to the constructors that need it.
//! Sources, later ones winning: built-in defaults, the TOML file named by
//! `CLIENTSTORE_CONFIG` (default `clientstore.toml`, optional), then
//! individual `CLIENTSTORE_*` environment variables.

use crate::aof::{AofConfig, SyncPolicy};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_VAR: &str = "CLIENTSTORE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "clientstore.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: AofConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address
    pub addr: String,
    /// Upper bound on each store call made by a request handler
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: "127.0.0.1:8080".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    /// Load from the config file and the process environment
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `CLIENTSTORE_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("CLIENTSTORE_ADDR") {
            self.server.addr = addr;
        }
        if let Some(ms) = lookup("CLIENTSTORE_REQUEST_TIMEOUT_MS") {
            self.server.request_timeout_ms = ms
                .parse()
                .context("CLIENTSTORE_REQUEST_TIMEOUT_MS must be a whole number of milliseconds")?;
        }
        if let Some(path) = lookup("CLIENTSTORE_AOF_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(policy) = lookup("CLIENTSTORE_SYNC_POLICY") {
            self.storage.sync_policy = policy
                .parse::<SyncPolicy>()
                .map_err(|e| anyhow!("CLIENTSTORE_SYNC_POLICY: {}", e))?;
        }
        if let Some(enabled) = lookup("CLIENTSTORE_PERSISTENCE") {
            self.storage.enabled = parse_flag(&enabled)
                .ok_or_else(|| anyhow!("CLIENTSTORE_PERSISTENCE must be on/off, got '{}'", enabled))?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(5));
        assert!(config.storage.enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [server]
            addr = "0.0.0.0:9000"

            [storage]
            path = "/var/lib/clients.aof"
            sync_policy = "every_second"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.addr, "0.0.0.0:9000");
        assert_eq!(config.server.request_timeout_ms, 5_000);
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/clients.aof"));
        assert_eq!(config.storage.sync_policy, SyncPolicy::EverySecond);
        assert!(config.storage.enabled);
    }

    #[test]
    fn test_unknown_sync_policy_rejected() {
        assert!(Config::from_toml_str("[storage]\nsync_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CLIENTSTORE_ADDR", "0.0.0.0:80"),
            ("CLIENTSTORE_REQUEST_TIMEOUT_MS", "250"),
            ("CLIENTSTORE_SYNC_POLICY", "no"),
            ("CLIENTSTORE_PERSISTENCE", "off"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.addr, "0.0.0.0:80");
        assert_eq!(config.server.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.storage.sync_policy, SyncPolicy::No);
        assert!(!config.storage.enabled);
    }

    #[test]
    fn test_bad_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "CLIENTSTORE_REQUEST_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clientstore.toml");
        std::fs::write(&path, "[server]\nrequest_timeout_ms = 100\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.request_timeout_ms, 100);
    }
}
