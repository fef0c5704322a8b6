//! Configuration management
//!
//! Defaults, overlaid by an optional TOML config file, overlaid by CLI/env
//! flags. All file fields are optional; a missing or unparseable file
//! degrades to defaults with a warning.

use std::path::PathBuf;

use serde::Deserialize;

use crate::gateway;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Gateway model identifier
    pub model: String,

    /// Translation credential seeded at startup; clients may still supply
    /// or replace one over the wire
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model: gateway::DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Merge defaults ← config file ← explicit CLI/env overrides.
    #[must_use]
    pub fn resolve(
        file: &ConfigFile,
        port: Option<u16>,
        model: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            port: port.or(file.server.port).unwrap_or(DEFAULT_PORT),
            model: model
                .or_else(|| file.gateway.model.clone())
                .unwrap_or_else(|| gateway::DEFAULT_MODEL.to_string()),
            api_key: api_key.or_else(|| file.gateway.api_key.clone()),
        }
    }
}

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Translation gateway configuration
    #[serde(default)]
    pub gateway: GatewayFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Listen port
    pub port: Option<u16>,
}

/// Translation gateway configuration
#[derive(Debug, Default, Deserialize)]
pub struct GatewayFileConfig {
    /// Model identifier
    pub model: Option<String>,

    /// Credential for the translation engine
    pub api_key: Option<String>,
}

/// Load the TOML config file from the standard path.
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be
/// parsed.
#[must_use]
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/babel-relay/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("babel-relay").join("config.toml"))
}
