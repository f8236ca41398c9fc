//! Configuration management
//!
//! Values come from an optional YAML file and are then overridden by the
//! environment. `DISCORD_TOKEN` and `DISCORD_CLIENT_ID` must end up set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::services::BotSettings;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub discord: DiscordConfig,
    pub database: DatabaseConfig,
    pub apis: ApisConfig,
    pub environment: Environment,
    pub log_level: LogLevel,
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DiscordConfig {
    pub token: String,
    pub client_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ApisConfig {
    pub unsplash_access_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CommandsConfig {
    /// Fail command handlers that run longer than this; unset means no limit
    pub handler_timeout_secs: Option<u64>,
    /// How often expired cooldowns are purged; 0 disables the sweeper
    pub cooldown_sweep_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(ConfigError::InvalidValue(format!("LOG_LEVEL={}", other))),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidValue(format!("BOT_ENV={}", other))),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            client_id: String::new(),
            api_base: "https://discord.com/api/v10".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("pingu.db"),
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            handler_timeout_secs: None,
            cooldown_sweep_secs: 300,
        }
    }
}

impl Config {
    /// Read a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Defaults overridden by the environment, then validated
    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Optional file at `path`, then the environment, then validation
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Config::load(path)?
        } else {
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from `lookup`; empty values count as unset
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("DISCORD_TOKEN") {
            self.discord.token = token;
        }
        if let Some(client_id) = get("DISCORD_CLIENT_ID") {
            self.discord.client_id = client_id;
        }
        if let Some(api_base) = get("DISCORD_API_BASE") {
            self.discord.api_base = api_base;
        }
        if let Some(path) = get("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(key) = get("UNSPLASH_ACCESS_KEY") {
            self.apis.unsplash_access_key = key;
        }
        // NODE_ENV is accepted when BOT_ENV is unset
        if let Some(env) = get("BOT_ENV").or_else(|| get("NODE_ENV")) {
            self.environment = env.parse()?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = level.parse()?;
        }
        if let Some(secs) = get("COMMAND_TIMEOUT_SECS") {
            let secs = secs
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue(format!("COMMAND_TIMEOUT_SECS={}", secs)))?;
            self.commands.handler_timeout_secs = (secs > 0).then_some(secs);
        }

        Ok(())
    }

    /// Report every missing required value at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.discord.token.is_empty() {
            missing.push("DISCORD_TOKEN");
        }
        if self.discord.client_id.is_empty() {
            missing.push("DISCORD_CLIENT_ID");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingField(missing.join(", ")))
        }
    }

    pub fn handler_timeout(&self) -> Option<Duration> {
        self.commands.handler_timeout_secs.map(Duration::from_secs)
    }

    pub fn cooldown_sweep(&self) -> Option<Duration> {
        (self.commands.cooldown_sweep_secs > 0)
            .then(|| Duration::from_secs(self.commands.cooldown_sweep_secs))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn bot_settings(&self) -> BotSettings {
        BotSettings::new(self.discord.token.clone())
            .with_handler_timeout(self.handler_timeout())
            .with_cooldown_sweep(self.cooldown_sweep())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("data").join("pingu.db"));
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.handler_timeout(), None);
        assert_eq!(config.cooldown_sweep(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_missing_required_values_reported_together() {
        let err = Config::default().validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: DISCORD_TOKEN, DISCORD_CLIENT_ID"
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[
                ("DISCORD_TOKEN", "tok"),
                ("DISCORD_CLIENT_ID", "123"),
                ("DATABASE_PATH", "/tmp/p.db"),
                ("BOT_ENV", "production"),
                ("LOG_LEVEL", "DEBUG"),
                ("COMMAND_TIMEOUT_SECS", "30"),
                ("UNSPLASH_ACCESS_KEY", ""),
            ]))
            .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.database.path, PathBuf::from("/tmp/p.db"));
        assert!(config.is_production());
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.handler_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.apis.unsplash_access_key, "");

        let settings = config.bot_settings();
        assert_eq!(settings.token, "tok");
        assert_eq!(settings.handler_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_node_env_is_a_fallback_for_bot_env() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[("NODE_ENV", "production")]))
            .unwrap();
        assert!(config.is_production());

        let mut config = Config::default();
        config
            .apply_env(lookup(&[("NODE_ENV", "production"), ("BOT_ENV", "development")]))
            .unwrap();
        assert!(!config.is_production());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        assert!(config.apply_env(lookup(&[("LOG_LEVEL", "loud")])).is_err());
        assert!(config
            .apply_env(lookup(&[("COMMAND_TIMEOUT_SECS", "soon")]))
            .is_err());
    }

    #[test]
    fn test_zero_timeout_means_unlimited() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[("COMMAND_TIMEOUT_SECS", "0")]))
            .unwrap();
        assert_eq!(config.handler_timeout(), None);
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "discord:\n  token: file-token\n  client-id: \"42\"\nlog-level: warn\ncommands:\n  handler-timeout-secs: 5\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.discord.token, "file-token");
        assert_eq!(config.discord.client_id, "42");
        assert_eq!(config.discord.api_base, "https://discord.com/api/v10");
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.handler_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.commands.cooldown_sweep_secs, 300);
    }
}
