use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::clock::DEFAULT_CLOCK_SECONDS;

pub const BIND_ENV: &str = "CHECKERS_BIND";
pub const STATS_ENV: &str = "CHECKERS_STATS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Starting time on each side's clock
    pub clock_seconds: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            clock_seconds: DEFAULT_CLOCK_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Where win counts are kept; in memory when unset
    pub stats_path: Option<PathBuf>,
    /// How often the clocks are advanced
    pub tick_millis: u64,
    /// Pixel size of one board square, for pointer mapping
    pub square_size: u32,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
            stats_path: None,
            tick_millis: 100,
            square_size: 100,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Apply `CHECKERS_BIND` / `CHECKERS_STATS` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var(BIND_ENV) {
            self.bind = bind;
        }
        if let Ok(path) = std::env::var(STATS_ENV) {
            self.stats_path = Some(PathBuf::from(path));
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let clock = self.game.clock_seconds;
        if clock.is_nan() || clock <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "clock_seconds must be positive, got {}",
                self.game.clock_seconds
            )));
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Invalid("tick_millis must be non-zero".to_string()));
        }
        if self.square_size == 0 {
            return Err(ConfigError::Invalid("square_size must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.game.clock_seconds, 300.0);
        assert!(config.stats_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = ServerConfig::from_json(r#"{"game": {"clock_seconds": 90}}"#).unwrap();
        assert_eq!(config.game.clock_seconds, 90.0);
        assert_eq!(config.tick_millis, 100);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_stats_path_from_json() {
        let config = ServerConfig::from_json(r#"{"stats_path": "database/stats.txt"}"#).unwrap();
        assert_eq!(config.stats_path, Some(PathBuf::from("database/stats.txt")));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_json(r#"{"game": {"clock_seconds": 0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::from_json(r#"{"tick_millis": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ServerConfig::from_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
