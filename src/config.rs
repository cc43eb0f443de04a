//! Configuration loading.
//!
//! Sources (highest priority first):
//! 1. Environment variables (DEPVIZ_TOKEN, DEPVIZ_RSVG_CONVERT,
//!    DEPVIZ_RSVG_TIMEOUT, DEPVIZ_UDPIPE, DEPVIZ_UDPIPE_MODEL)
//! 2. Config file (~/.depviz/config.yaml)
//! 3. Defaults
//!
//! The config is built once at startup and passed into components
//! explicitly; nothing in the core reads it ambiently.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub telegram: Option<TelegramSection>,
    #[serde(default)]
    pub converter: Option<ConverterSection>,
    #[serde(default)]
    pub engine: Option<EngineSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSection {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterSection {
    pub binary: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    pub binary: Option<String>,
    pub model: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token; required for `serve`, optional elsewhere
    pub token: Option<String>,

    /// rsvg-convert binary
    pub converter_binary: String,

    /// Bound on one conversion attempt
    pub converter_timeout: Duration,

    /// udpipe binary
    pub engine_binary: String,

    /// Path to the UDPipe model; required for anything that parses
    pub engine_model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            converter_binary: "rsvg-convert".to_string(),
            converter_timeout: Duration::from_secs(30),
            engine_binary: "udpipe".to_string(),
            engine_model: None,
        }
    }
}

impl Config {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        let file = default_config_path()
            .filter(|p| p.exists())
            .map(|p| load_config_file(&p))
            .transpose()?
            .unwrap_or_default();

        Ok(Self::from_sources(file, |key| std::env::var(key).ok()))
    }

    /// Resolve from a parsed file and an env lookup (injected for tests)
    pub fn from_sources(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let token = env("DEPVIZ_TOKEN").or(file.telegram.and_then(|t| t.token));

        let (file_conv_binary, file_conv_timeout) = file
            .converter
            .map(|c| (c.binary, c.timeout_seconds))
            .unwrap_or((None, None));

        let converter_binary = env("DEPVIZ_RSVG_CONVERT")
            .or(file_conv_binary)
            .unwrap_or(defaults.converter_binary);

        let converter_timeout = env("DEPVIZ_RSVG_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .or(file_conv_timeout)
            .map(Duration::from_secs)
            .unwrap_or(defaults.converter_timeout);

        let (file_engine_binary, file_engine_model) = file
            .engine
            .map(|e| (e.binary, e.model))
            .unwrap_or((None, None));

        let engine_binary = env("DEPVIZ_UDPIPE")
            .or(file_engine_binary)
            .unwrap_or(defaults.engine_binary);

        let engine_model = env("DEPVIZ_UDPIPE_MODEL").or(file_engine_model);

        Self {
            token,
            converter_binary,
            converter_timeout,
            engine_binary,
            engine_model,
        }
    }

    /// The token, or a clear startup error
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .context("Telegram bot token is missing: set DEPVIZ_TOKEN or telegram.token in the config file")
    }

    /// The model path, or a clear startup error
    pub fn require_model(&self) -> Result<&str> {
        self.engine_model
            .as_deref()
            .context("UDPipe model is missing: set DEPVIZ_UDPIPE_MODEL or engine.model in the config file")
    }
}

/// Default config file location (~/.depviz/config.yaml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".depviz").join("config.yaml"))
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = Config::from_sources(ConfigFile::default(), no_env);
        assert!(config.token.is_none());
        assert_eq!(config.converter_binary, "rsvg-convert");
        assert_eq!(config.converter_timeout, Duration::from_secs(30));
        assert_eq!(config.engine_binary, "udpipe");
        assert!(config.require_token().is_err());
        assert!(config.require_model().is_err());
    }

    #[test]
    fn test_file_values_apply() {
        let file: ConfigFile = serde_yaml::from_str(
            r#"
telegram:
  token: "123:abc"
converter:
  binary: /opt/bin/rsvg-convert
  timeout_seconds: 10
engine:
  model: /models/russian.udpipe
"#,
        )
        .unwrap();

        let config = Config::from_sources(file, no_env);
        assert_eq!(config.require_token().unwrap(), "123:abc");
        assert_eq!(config.converter_binary, "/opt/bin/rsvg-convert");
        assert_eq!(config.converter_timeout, Duration::from_secs(10));
        assert_eq!(config.require_model().unwrap(), "/models/russian.udpipe");
    }

    #[test]
    fn test_env_overrides_file() {
        let file: ConfigFile = serde_yaml::from_str(
            r#"
telegram:
  token: from-file
engine:
  binary: /file/udpipe
"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("DEPVIZ_TOKEN", "from-env"),
            ("DEPVIZ_UDPIPE", "/env/udpipe"),
            ("DEPVIZ_RSVG_TIMEOUT", "7"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::from_sources(file, |key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.token.as_deref(), Some("from-env"));
        assert_eq!(config.engine_binary, "/env/udpipe");
        assert_eq!(config.converter_timeout, Duration::from_secs(7));
    }
}
